use crate::domain::model::{BlogPost, Category, Document, Project};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt::Write as _;

pub const INDEX_PATH: &str = "index.html";

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:60rem;margin:2rem auto;padding:0 1rem;color:#222}\
.filters button{margin:0 .25rem .5rem 0}\
.project{border:1px solid #ddd;border-radius:6px;padding:1rem;margin:.75rem 0}\
.tag{display:inline-block;background:#eef;border-radius:3px;padding:0 .4rem;margin-right:.25rem;font-size:.85em}\
.meta{color:#666;font-size:.9em}\
article.post{border-bottom:1px solid #eee;padding:1rem 0}\
footer{color:#888;font-size:.8em;margin-top:2rem}";

const FILTER_SCRIPT: &str = "document.querySelectorAll('.filters button').forEach(function(b){\
b.addEventListener('click',function(){var t=b.dataset.tag;\
document.querySelectorAll('.project').forEach(function(p){\
p.hidden=t!=='all'&&p.dataset.tags.split(' ').indexOf(t)<0;});});});";

/// Renders the whole site. Output depends only on the inputs.
pub fn assemble(projects: &[Project], site_title: &str, generated_at: DateTime<Utc>) -> Vec<Document> {
    let mut documents = Vec::with_capacity(1 + projects.len());
    documents.push(Document {
        path: INDEX_PATH.to_string(),
        content: render_index(projects, site_title, generated_at),
    });

    for project in projects.iter().filter(|p| p.has_updates()) {
        documents.push(Document {
            path: project.updates_path(),
            content: render_updates(project, site_title, generated_at),
        });
    }

    documents
}

/// Distinct tags across all projects, in vocabulary order.
pub fn tag_vocabulary(projects: &[Project]) -> Vec<Category> {
    projects
        .iter()
        .flat_map(|p| p.metadata.display_tags())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn render_index(projects: &[Project], site_title: &str, generated_at: DateTime<Utc>) -> String {
    let mut body = String::new();

    body.push_str("<nav class=\"filters\"><button data-tag=\"all\">All</button>");
    for tag in tag_vocabulary(projects) {
        let _ = write!(
            body,
            "<button data-tag=\"{}\">{}</button>",
            tag.as_str(),
            tag.label()
        );
    }
    body.push_str("</nav>\n<main>\n");

    for project in projects {
        render_card(&mut body, project);
    }
    body.push_str("</main>\n");
    let _ = write!(body, "<script>{}</script>\n", FILTER_SCRIPT);

    page(site_title, site_title, &body, generated_at)
}

fn render_card(out: &mut String, project: &Project) {
    let repo = &project.repository;
    let tags = project.metadata.display_tags();
    let tag_keys: Vec<&str> = tags.iter().map(Category::as_str).collect();

    let _ = write!(
        out,
        "<section class=\"project\" data-tags=\"{}\">\n<h2><a href=\"{}\">{}</a></h2>\n<p>{}</p>\n<div class=\"tags\">",
        tag_keys.join(" "),
        escape_html(&repo.url),
        escape_html(&repo.name),
        escape_html(&project.metadata.description),
    );
    for tag in &tags {
        let _ = write!(out, "<span class=\"tag\">{}</span>", tag.label());
    }
    out.push_str("</div>\n");

    let _ = write!(out, "<p class=\"meta\">★ {}", repo.stars);
    if let Some(language) = repo.language.as_deref() {
        let _ = write!(out, " · {}", escape_html(language));
    }
    if let Some(latest) = &project.latest_release {
        let _ = write!(
            out,
            " · Latest: <a href=\"{}\">{}</a>",
            escape_html(&latest.download_url),
            escape_html(&latest.version)
        );
    }
    out.push_str("</p>\n");

    if project.has_updates() {
        let _ = write!(
            out,
            "<p><a class=\"updates\" href=\"{}\">Release updates</a></p>\n",
            escape_html(&project.updates_path())
        );
    }
    out.push_str("</section>\n");
}

fn render_updates(project: &Project, site_title: &str, generated_at: DateTime<Utc>) -> String {
    let repo = &project.repository;
    let mut body = String::new();

    let _ = write!(
        body,
        "<p><a href=\"../{}\">← {}</a></p>\n<p>{}</p>\n<main>\n",
        INDEX_PATH,
        escape_html(site_title),
        escape_html(&project.metadata.description)
    );
    for post in &project.posts {
        render_post(&mut body, post);
    }
    body.push_str("</main>\n");

    let title = format!("{} updates", repo.name);
    page(&title, site_title, &body, generated_at)
}

fn render_post(out: &mut String, post: &BlogPost) {
    let _ = write!(
        out,
        "<article class=\"post\">\n<h2>{}</h2>\n",
        escape_html(&post.version)
    );
    if let Some(published) = post.published_at {
        let _ = write!(
            out,
            "<time datetime=\"{}\">{}</time>\n",
            published.to_rfc3339(),
            published.format("%Y-%m-%d")
        );
    }
    // 敘述內容本身就是 HTML 片段，不跳脫
    let _ = write!(
        out,
        "<div class=\"post-body\">{}</div>\n<p><a class=\"download\" href=\"{}\">Download {}</a></p>\n</article>\n",
        post.html,
        escape_html(&post.download_url),
        escape_html(&post.version)
    );
}

fn page(title: &str, site_title: &str, body: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n<h1>{}</h1>\n{}\
         <footer>{} · Generated on {}</footer>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        escape_html(title),
        body,
        escape_html(site_title),
        generated_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
