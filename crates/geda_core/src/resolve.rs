use serde_json::{Value, json};

use crate::client::{ClientError, ContentApi, JsonMap};
use crate::resource::Resource;

/// Looks up a category by slug and returns its numeric id. A missing
/// category is an error; categories are never created here.
pub fn resolve_category_id<A: ContentApi>(api: &mut A, slug: &str) -> Result<i64, ClientError> {
    let response = api.get(&Resource::Category.item_path(slug))?;
    extract_id(&response)
}

/// Resolves tag slugs to ids in input order. Blank entries are skipped
/// without a request; duplicates are looked up again. A tag that does not
/// exist (404) is created with a humanized display name. Any other failure
/// aborts the whole resolution; tags created before the failure stay.
pub fn resolve_tag_ids<A: ContentApi>(
    api: &mut A,
    slugs: &[String],
) -> Result<Vec<i64>, ClientError> {
    let mut ids = Vec::new();
    for slug in slugs {
        let slug = slug.trim();
        if slug.is_empty() {
            continue;
        }
        let id = match api.get(&Resource::Tag.item_path(slug)) {
            Ok(response) => extract_id(&response)?,
            Err(ClientError::Api(error)) if error.status == 404 => {
                let payload = json!({"slug": slug, "name": humanize_slug(slug)});
                let created = api.post(&Resource::Tag.collection_path(), &payload)?;
                extract_id(&created)?
            }
            Err(error) => return Err(error),
        };
        ids.push(id);
    }
    Ok(ids)
}

/// `"ai-agents"` becomes `"Ai Agents"`. Empty segments stay empty, so
/// consecutive hyphens produce consecutive spaces.
pub fn humanize_slug(slug: &str) -> String {
    slug.split('-')
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Pulls `data.id` out of a response. Backends serialize ids as JSON
/// floats, integers, or strings depending on the endpoint; all three are
/// accepted, everything else is a malformed response.
fn extract_id(response: &JsonMap) -> Result<i64, ClientError> {
    let data = response
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| ClientError::UnexpectedResponse("response missing data object".to_string()))?;
    match data.get("id") {
        Some(Value::Number(id)) => {
            if let Some(id) = id.as_i64() {
                Ok(id)
            } else if let Some(id) = id.as_f64() {
                Ok(id as i64)
            } else {
                Err(ClientError::UnexpectedResponse(
                    "response missing numeric id".to_string(),
                ))
            }
        }
        Some(Value::String(id)) => id
            .parse::<i64>()
            .map_err(|_| ClientError::UnexpectedResponse(format!("invalid id value {id:?}"))),
        _ => Err(ClientError::UnexpectedResponse(
            "response missing numeric id".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::FakeApi;

    #[test]
    fn category_id_from_integer_response() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/categories/tech", json!({"data": {"id": 3}}));
        assert_eq!(resolve_category_id(&mut api, "tech").expect("id"), 3);
        assert_eq!(api.gets, vec!["/api/v1/categories/tech"]);
    }

    #[test]
    fn category_id_from_float_response() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/categories/tech", json!({"data": {"id": 3.0}}));
        assert_eq!(resolve_category_id(&mut api, "tech").expect("id"), 3);
    }

    #[test]
    fn category_id_from_string_response() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/categories/tech", json!({"data": {"id": "12"}}));
        assert_eq!(resolve_category_id(&mut api, "tech").expect("id"), 12);
    }

    #[test]
    fn missing_category_is_an_error_not_a_create() {
        let mut api = FakeApi::default();
        api.stub_status("GET", "/api/v1/categories/ghost", 404);

        let error = resolve_category_id(&mut api, "ghost").expect_err("missing category");

        assert!(matches!(error, ClientError::Api(api_error) if api_error.status == 404));
        assert!(api.posts.is_empty());
    }

    #[test]
    fn no_tags_means_no_requests() {
        let mut api = FakeApi::default();
        let ids = resolve_tag_ids(&mut api, &[]).expect("ids");
        assert!(ids.is_empty());
        assert!(api.gets.is_empty());
    }

    #[test]
    fn blank_tags_are_skipped_without_requests() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/tags/rust", json!({"data": {"id": 5}}));

        let slugs = vec!["".to_string(), "  ".to_string(), "rust".to_string()];
        let ids = resolve_tag_ids(&mut api, &slugs).expect("ids");

        assert_eq!(ids, vec![5]);
        assert_eq!(api.gets, vec!["/api/v1/tags/rust"]);
    }

    #[test]
    fn missing_tag_is_created_with_humanized_name() {
        let mut api = FakeApi::default();
        api.stub_status("GET", "/api/v1/tags/ai-agents", 404);
        api.stub_ok("POST", "/api/v1/tags", json!({"data": {"id": 9}}));

        let slugs = vec!["ai-agents".to_string()];
        let ids = resolve_tag_ids(&mut api, &slugs).expect("ids");

        assert_eq!(ids, vec![9]);
        assert_eq!(api.posts.len(), 1);
        assert_eq!(api.posts[0].0, "/api/v1/tags");
        assert_eq!(
            api.posts[0].1,
            json!({"slug": "ai-agents", "name": "Ai Agents"})
        );
    }

    #[test]
    fn order_is_preserved_and_duplicates_are_looked_up_again() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/tags/b", json!({"data": {"id": 2}}));
        api.stub_ok("GET", "/api/v1/tags/a", json!({"data": {"id": 1}}));

        let slugs = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let ids = resolve_tag_ids(&mut api, &slugs).expect("ids");

        assert_eq!(ids, vec![2, 1, 2]);
        assert_eq!(api.gets.len(), 3);
    }

    #[test]
    fn non_404_lookup_failure_aborts_without_create() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/tags/ok", json!({"data": {"id": 1}}));
        api.stub_status("GET", "/api/v1/tags/bad", 500);

        let slugs = vec!["ok".to_string(), "bad".to_string()];
        let error = resolve_tag_ids(&mut api, &slugs).expect_err("server error");

        assert!(matches!(error, ClientError::Api(api_error) if api_error.status == 500));
        assert!(api.posts.is_empty());
    }

    #[test]
    fn failed_create_aborts() {
        let mut api = FakeApi::default();
        api.stub_status("GET", "/api/v1/tags/new", 404);
        api.stub_status("POST", "/api/v1/tags", 422);

        let slugs = vec!["new".to_string()];
        let error = resolve_tag_ids(&mut api, &slugs).expect_err("create rejected");

        assert!(matches!(error, ClientError::Api(api_error) if api_error.status == 422));
    }

    #[test]
    fn humanizes_slugs() {
        assert_eq!(humanize_slug("ai-agents"), "Ai Agents");
        assert_eq!(humanize_slug("rust"), "Rust");
        assert_eq!(humanize_slug("a--b"), "A  B");
        assert_eq!(humanize_slug("đảo-xa"), "Đảo Xa");
    }

    #[test]
    fn extract_id_rejects_malformed_responses() {
        let response = serde_json::from_value(json!({"result": "ok"})).expect("map");
        let error = extract_id(&response).expect_err("no data object");
        assert!(matches!(error, ClientError::UnexpectedResponse(_)));

        let response = serde_json::from_value(json!({"data": {"id": true}})).expect("map");
        let error = extract_id(&response).expect_err("boolean id");
        assert!(matches!(error, ClientError::UnexpectedResponse(_)));

        let response = serde_json::from_value(json!({"data": {"id": "twelve"}})).expect("map");
        let error = extract_id(&response).expect_err("non-numeric string");
        assert!(matches!(error, ClientError::UnexpectedResponse(_)));
    }

    #[test]
    fn extract_id_truncates_float_ids() {
        let response = serde_json::from_value(json!({"data": {"id": 7.9}})).expect("map");
        assert_eq!(extract_id(&response).expect("id"), 7);
    }
}
