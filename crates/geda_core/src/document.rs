use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_STATUS: &str = "draft";

/// YAML front matter of one localized markdown document. Unknown keys are
/// ignored; every key is optional at decode time, requiredness is enforced
/// afterwards so each missing field gets its own report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub category_slug: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub meta_title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub featured_image: String,
    #[serde(default)]
    pub og_image: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub scheduled_at: String,
    #[serde(default)]
    pub is_featured: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body_markdown: String,
    pub body_html: String,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing YAML front matter (content must begin with ---)")]
    MissingFrontMatter,
    #[error("front matter must open with --- on its own line")]
    MalformedOpeningDelimiter,
    #[error("front matter closing delimiter (---) not found")]
    MissingClosingDelimiter,
    #[error("invalid front matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),
    #[error("front matter field '{0}' is required")]
    MissingField(&'static str),
}

pub fn parse_document_file(path: &Path) -> Result<Document, DocumentError> {
    let content = fs::read_to_string(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content)
}

pub fn parse_document(content: &str) -> Result<Document, DocumentError> {
    let (front_matter_text, body_markdown) = split_front_matter(content)?;
    let front_matter: FrontMatter = if front_matter_text.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(&front_matter_text)?
    };
    let front_matter = validate_front_matter(front_matter)?;
    let body_html = render_markdown(&body_markdown);
    Ok(Document {
        front_matter,
        body_markdown,
        body_html,
    })
}

/// Splits trimmed content into the YAML region between the opening `---`
/// line and the first later line that trims to `---`, and the markdown body
/// after it. Later `---` lines belong to the body.
fn split_front_matter(content: &str) -> Result<(String, String), DocumentError> {
    let content = content.trim();
    if !content.starts_with("---") {
        return Err(DocumentError::MissingFrontMatter);
    }
    let lines: Vec<&str> = content.split('\n').collect();
    if lines[0].trim() != "---" {
        return Err(DocumentError::MalformedOpeningDelimiter);
    }
    let closing = lines[1..]
        .iter()
        .position(|line| line.trim() == "---")
        .ok_or(DocumentError::MissingClosingDelimiter)?;
    let end = closing + 1;
    let front_matter = lines[1..end].join("\n");
    let body = lines[end + 1..].join("\n").trim().to_string();
    Ok((front_matter, body))
}

fn validate_front_matter(mut front_matter: FrontMatter) -> Result<FrontMatter, DocumentError> {
    if front_matter.slug.trim().is_empty() {
        return Err(DocumentError::MissingField("slug"));
    }
    if front_matter.title.trim().is_empty() {
        return Err(DocumentError::MissingField("title"));
    }
    if front_matter.category_slug.trim().is_empty() {
        return Err(DocumentError::MissingField("category_slug"));
    }
    if front_matter.status.trim().is_empty() {
        front_matter.status = DEFAULT_STATUS.to_string();
    }
    Ok(front_matter)
}

fn render_markdown(markdown: &str) -> String {
    let options = comrak::Options::default();
    comrak::markdown_to_html(markdown, &options)
        .trim()
        .to_string()
}
