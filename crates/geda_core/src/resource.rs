use serde_json::Value;

use crate::client::{ClientError, ContentApi, JsonMap};

/// Resource kinds the CMS exposes under `/api/v1`, addressed by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Post,
    Category,
    Tag,
    Page,
    Product,
}

impl Resource {
    pub fn plural(self) -> &'static str {
        match self {
            Resource::Post => "posts",
            Resource::Category => "categories",
            Resource::Tag => "tags",
            Resource::Page => "pages",
            Resource::Product => "products",
        }
    }

    pub fn collection_path(self) -> String {
        format!("/api/v1/{}", self.plural())
    }

    pub fn item_path(self, slug: &str) -> String {
        format!("/api/v1/{}/{}", self.plural(), slug)
    }
}

/// Create-or-update by slug: probe the item endpoint, PUT the payload there
/// when the probe succeeds, POST to the collection when the probe reports
/// 404. Any other probe failure aborts; the probe and the write are two
/// separate requests, so a concurrent delete in between surfaces as the
/// write's own API error.
pub fn upsert<A: ContentApi>(
    api: &mut A,
    resource: Resource,
    slug: &str,
    payload: &Value,
) -> Result<JsonMap, ClientError> {
    match api.get(&resource.item_path(slug)) {
        Ok(_) => api.put(&resource.item_path(slug), payload),
        Err(ClientError::Api(error)) if error.status == 404 => {
            api.post(&resource.collection_path(), payload)
        }
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::fake::FakeApi;

    #[test]
    fn plural_forms() {
        assert_eq!(Resource::Post.plural(), "posts");
        assert_eq!(Resource::Category.plural(), "categories");
        assert_eq!(Resource::Tag.plural(), "tags");
        assert_eq!(Resource::Page.plural(), "pages");
        assert_eq!(Resource::Product.plural(), "products");
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(Resource::Category.collection_path(), "/api/v1/categories");
        assert_eq!(
            Resource::Post.item_path("hello-world"),
            "/api/v1/posts/hello-world"
        );
    }

    #[test]
    fn updates_in_place_when_probe_succeeds() {
        let mut api = FakeApi::default();
        api.stub_ok("GET", "/api/v1/posts/hello", json!({"data": {"id": 1}}));
        api.stub_ok("PUT", "/api/v1/posts/hello", json!({"data": {"id": 1, "updated": true}}));

        let payload = json!({"slug": "hello", "status": "draft"});
        let response = upsert(&mut api, Resource::Post, "hello", &payload).expect("update");

        assert_eq!(api.gets, vec!["/api/v1/posts/hello"]);
        assert_eq!(api.puts.len(), 1);
        assert_eq!(api.puts[0].0, "/api/v1/posts/hello");
        assert_eq!(api.puts[0].1, payload);
        assert!(api.posts.is_empty());
        assert_eq!(response["data"]["updated"], json!(true));
    }

    #[test]
    fn creates_when_probe_reports_not_found() {
        let mut api = FakeApi::default();
        api.stub_status("GET", "/api/v1/posts/fresh", 404);
        api.stub_ok("POST", "/api/v1/posts", json!({"data": {"id": 2}}));

        let payload = json!({"slug": "fresh"});
        let response = upsert(&mut api, Resource::Post, "fresh", &payload).expect("create");

        assert!(api.puts.is_empty());
        assert_eq!(api.posts.len(), 1);
        assert_eq!(api.posts[0].0, "/api/v1/posts");
        assert_eq!(api.posts[0].1, payload);
        assert_eq!(response["data"]["id"], json!(2));
    }

    #[test]
    fn aborts_when_probe_fails_with_server_error() {
        let mut api = FakeApi::default();
        api.stub_status("GET", "/api/v1/pages/about", 500);

        let error = upsert(&mut api, Resource::Page, "about", &json!({"slug": "about"}))
            .expect_err("server error");

        assert!(matches!(error, ClientError::Api(api_error) if api_error.status == 500));
        assert!(api.posts.is_empty());
        assert!(api.puts.is_empty());
    }

    #[test]
    fn aborts_when_probe_fails_without_status() {
        let mut api = FakeApi::default();
        api.stub_broken("GET", "/api/v1/products/widget");

        let error = upsert(
            &mut api,
            Resource::Product,
            "widget",
            &json!({"slug": "widget"}),
        )
        .expect_err("transport failure");

        assert!(matches!(error, ClientError::UnexpectedResponse(_)));
        assert!(api.posts.is_empty());
        assert!(api.puts.is_empty());
    }
}
