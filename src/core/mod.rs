pub mod aggregator;
pub mod cache;
pub mod classifier;
pub mod engine;
pub mod links;
pub mod narrator;
pub mod response;
pub mod site;

pub use crate::domain::model::{BlogPost, Document, Project, ProjectMetadata, Release, Repository};
pub use crate::domain::ports::{ConfigProvider, RepositorySource, Storage, TextGenerator};
pub use crate::utils::error::Result;
