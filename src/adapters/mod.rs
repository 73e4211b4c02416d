// Adapters layer: concrete clients for the remote listing and generative-text services.

pub mod github;
pub mod llm;

pub use github::GitHubClient;
pub use llm::ChatClient;
