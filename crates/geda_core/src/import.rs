use serde_json::Value;
use thiserror::Error;

use crate::client::{ClientError, ContentApi, JsonMap};
use crate::document::{DEFAULT_STATUS, Document};
use crate::resolve::{resolve_category_id, resolve_tag_ids};
use crate::resource::{Resource, upsert};

pub const PRIMARY_LOCALE: &str = "vi";
pub const SECONDARY_LOCALE: &str = "en";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("slug mismatch between Vietnamese and English documents ({primary:?} vs {secondary:?})")]
    SlugMismatch { primary: String, secondary: String },
    #[error(
        "category_slug mismatch between Vietnamese and English documents ({primary:?} vs {secondary:?})"
    )]
    CategorySlugMismatch { primary: String, secondary: String },
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Probe by slug and update in place when the post already exists.
    /// When off, the post is created unconditionally.
    pub upsert: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { upsert: true }
    }
}

/// Full pipeline for one bilingual post: resolve the category and tags from
/// the primary document, build the merged payload, then create or update by
/// slug. References are resolved before the payload gates run, so a tag
/// created here stays even when a later step fails.
pub fn import_post<A: ContentApi>(
    api: &mut A,
    primary: &Document,
    secondary: &Document,
    options: &ImportOptions,
) -> Result<JsonMap, ImportError> {
    let category_id = resolve_category_id(api, &primary.front_matter.category_slug)?;
    let tag_ids = resolve_tag_ids(api, &primary.front_matter.tags)?;
    let payload = build_bilingual_payload(primary, secondary, category_id, &tag_ids)?;
    let slug = primary.front_matter.slug.clone();
    let payload = Value::Object(payload);
    let response = if options.upsert {
        upsert(api, Resource::Post, &slug, &payload)?
    } else {
        api.post(&Resource::Post.collection_path(), &payload)?
    };
    Ok(response)
}

/// Merges two localized documents into one request body. Locale-sensitive
/// fields become `{"vi": …, "en": …}` maps; `published_at`, `scheduled_at`
/// and `is_featured` are emitted only when one side carries a value,
/// primary side winning.
pub fn build_bilingual_payload(
    primary: &Document,
    secondary: &Document,
    category_id: i64,
    tag_ids: &[i64],
) -> Result<JsonMap, ImportError> {
    let primary_fm = &primary.front_matter;
    let secondary_fm = &secondary.front_matter;

    if primary_fm.slug != secondary_fm.slug {
        return Err(ImportError::SlugMismatch {
            primary: primary_fm.slug.clone(),
            secondary: secondary_fm.slug.clone(),
        });
    }
    if primary_fm.category_slug != secondary_fm.category_slug {
        return Err(ImportError::CategorySlugMismatch {
            primary: primary_fm.category_slug.clone(),
            secondary: secondary_fm.category_slug.clone(),
        });
    }

    let mut status = primary_fm.status.trim();
    if status.is_empty() {
        status = secondary_fm.status.trim();
    }
    if status.is_empty() {
        status = DEFAULT_STATUS;
    }

    let mut payload = JsonMap::new();
    payload.insert("slug".to_string(), Value::from(primary_fm.slug.as_str()));
    payload.insert("category_id".to_string(), Value::from(category_id));
    payload.insert("tags".to_string(), Value::from(tag_ids.to_vec()));
    payload.insert("status".to_string(), Value::from(status));
    payload.insert(
        "title".to_string(),
        locale_map(&primary_fm.title, &secondary_fm.title),
    );
    payload.insert(
        "excerpt".to_string(),
        locale_map(&primary_fm.excerpt, &secondary_fm.excerpt),
    );
    payload.insert(
        "body".to_string(),
        locale_map(&primary.body_html, &secondary.body_html),
    );
    payload.insert(
        "meta_title".to_string(),
        locale_map(&primary_fm.meta_title, &secondary_fm.meta_title),
    );
    payload.insert(
        "meta_description".to_string(),
        locale_map(&primary_fm.meta_description, &secondary_fm.meta_description),
    );
    payload.insert(
        "featured_image".to_string(),
        Value::from(first_non_blank(
            &primary_fm.featured_image,
            &secondary_fm.featured_image,
        )),
    );
    payload.insert(
        "og_image".to_string(),
        Value::from(first_non_blank(&primary_fm.og_image, &secondary_fm.og_image)),
    );

    let published_at = first_non_blank(&primary_fm.published_at, &secondary_fm.published_at);
    if !published_at.is_empty() {
        payload.insert("published_at".to_string(), Value::from(published_at));
    }
    let scheduled_at = first_non_blank(&primary_fm.scheduled_at, &secondary_fm.scheduled_at);
    if !scheduled_at.is_empty() {
        payload.insert("scheduled_at".to_string(), Value::from(scheduled_at));
    }
    if let Some(is_featured) = primary_fm.is_featured.or(secondary_fm.is_featured) {
        payload.insert("is_featured".to_string(), Value::from(is_featured));
    }

    Ok(payload)
}

fn locale_map(primary: &str, secondary: &str) -> Value {
    let mut map = JsonMap::new();
    map.insert(PRIMARY_LOCALE.to_string(), Value::from(primary));
    map.insert(SECONDARY_LOCALE.to_string(), Value::from(secondary));
    Value::Object(map)
}

/// First argument whose trimmed value is non-empty, returned untrimmed.
fn first_non_blank<'a>(primary: &'a str, secondary: &'a str) -> &'a str {
    if !primary.trim().is_empty() {
        primary
    } else if !secondary.trim().is_empty() {
        secondary
    } else {
        ""
    }
}
