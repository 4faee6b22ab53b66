//! Platform adapter tests against mocked HTTP endpoints
//!
//! Each adapter is pointed at a wiremock server through its base URL, so
//! the exact requests it sends can be asserted without real credentials.

use std::time::Duration;

use libblogcast::error::{BlogcastError, PlatformError};
use libblogcast::Document;
use secrecy::SecretString;

const HELLO: &str = "# Hello World\n\nThis is a test post.";

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn timeout() -> Duration {
    Duration::from_secs(5)
}

mod devto_tests {
    use super::*;
    use libblogcast::platforms::devto::DevtoClient;
    use libblogcast::platforms::Platform;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_devto_publishes_full_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .and(header("api-key", "devto-key"))
            .and(body_json(json!({
                "article": {
                    "title": "Hello World",
                    "body_markdown": HELLO,
                    "published": true
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 42,
                "slug": "hello-world-1abc",
                "url": "https://dev.to/me/hello-world-1abc"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DevtoClient::new(&mock_server.uri(), secret("devto-key"), timeout()).unwrap();
        let receipt = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap();

        assert_eq!(receipt.post_id.as_deref(), Some("42"));
        assert_eq!(receipt.slug.as_deref(), Some("hello-world-1abc"));
        assert_eq!(
            receipt.url.as_deref(),
            Some("https://dev.to/me/hello-world-1abc")
        );
    }

    #[tokio::test]
    async fn test_devto_unauthorized_is_authentication_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"unauthorized","status":401}"#),
            )
            .mount(&mock_server)
            .await;

        let client = DevtoClient::new(&mock_server.uri(), secret(""), timeout()).unwrap();
        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        match &err {
            BlogcastError::Platform(PlatformError::Authentication(message)) => {
                assert!(message.contains("unauthorized"), "got: {}", message);
            }
            other => panic!("Expected authentication error, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_devto_server_error_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Title has already been used"))
            .mount(&mock_server)
            .await;

        let client = DevtoClient::new(&mock_server.uri(), secret("k"), timeout()).unwrap();
        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BlogcastError::Platform(PlatformError::Posting(_))
        ));
        assert!(err.to_string().contains("Title has already been used"));
    }

    #[tokio::test]
    async fn test_devto_unreadable_success_body_is_tolerated() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(201).set_body_string("created"))
            .mount(&mock_server)
            .await;

        let client = DevtoClient::new(&mock_server.uri(), secret("k"), timeout()).unwrap();
        let receipt = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap();
        assert!(receipt.url.is_none());
    }
}

mod medium_tests {
    use super::*;
    use libblogcast::platforms::medium::MediumClient;
    use libblogcast::platforms::Platform;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_medium_resolves_user_then_posts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .and(header("Authorization", "Bearer medium-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": "user-123", "username": "writer" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/users/user-123/posts"))
            .and(header("Authorization", "Bearer medium-token"))
            .and(body_json(json!({
                "title": "Hello World",
                "contentFormat": "markdown",
                "content": HELLO,
                "publishStatus": "public"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": { "id": "abc123", "url": "https://medium.com/@writer/hello-world-abc123" }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client =
            MediumClient::new(&mock_server.uri(), secret("medium-token"), timeout()).unwrap();
        let receipt = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap();

        assert_eq!(receipt.post_id.as_deref(), Some("abc123"));
        assert_eq!(
            receipt.url.as_deref(),
            Some("https://medium.com/@writer/hello-world-abc123")
        );
    }

    #[tokio::test]
    async fn test_medium_rejected_token_skips_post() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Token was invalid."))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = MediumClient::new(&mock_server.uri(), secret("bad"), timeout()).unwrap();
        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Token was invalid."));
    }

    #[tokio::test]
    async fn test_medium_malformed_user_lookup() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let client = MediumClient::new(&mock_server.uri(), secret("t"), timeout()).unwrap();
        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BlogcastError::Platform(PlatformError::Posting(_))
        ));
    }
}

mod hashnode_tests {
    use super::*;
    use libblogcast::config::{AuthScheme, HashnodeApi, HashnodeConfig};
    use libblogcast::platforms::hashnode::HashnodeClient;
    use libblogcast::platforms::Platform;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, api: HashnodeApi, auth_scheme: AuthScheme) -> HashnodeConfig {
        HashnodeConfig {
            base_url: server.uri(),
            api,
            auth_scheme,
            ..HashnodeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_publications_api_discovers_then_creates_story() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("Authorization", "hn-token"))
            .and(body_string_contains("publications(first: 10)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publications": { "edges": [
                    { "node": { "id": "pub-1", "title": "My Blog" } },
                    { "node": { "id": "pub-2", "title": "Other" } }
                ] } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("Authorization", "hn-token"))
            .and(body_string_contains("createPublicationStory"))
            .and(body_partial_json(json!({
                "variables": {
                    "title": "Hello World",
                    "contentMarkdown": "\nThis is a test post.",
                    "publicationId": "pub-1",
                    "isPartOfPublication": true
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "createPublicationStory": { "post": { "slug": "hello-world", "title": "Hello World" } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Publications, AuthScheme::Bare),
            secret("hn-token"),
            timeout(),
        )
        .unwrap();

        let receipt = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap();
        assert_eq!(receipt.slug.as_deref(), Some("hello-world"));
    }

    #[tokio::test]
    async fn test_no_publication_aborts_before_mutation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("publications(first: 10)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publications": { "edges": [] } } }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains("createPublicationStory"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Publications, AuthScheme::Bare),
            secret("hn-token"),
            timeout(),
        )
        .unwrap();

        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        match err {
            BlogcastError::Platform(PlatformError::Discovery(message)) => {
                assert!(message.contains("No publication found"));
            }
            other => panic!("Expected discovery error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publication_with_null_id_aborts_before_mutation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("publications(first: 10)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publications": { "edges": [
                    { "node": { "id": null } }
                ] } } }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains("createPublicationStory"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Publications, AuthScheme::Bare),
            secret("hn-token"),
            timeout(),
        )
        .unwrap();

        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BlogcastError::Platform(PlatformError::Discovery(_))
        ));
    }

    #[tokio::test]
    async fn test_legacy_api_with_bearer_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer hn-token"))
            .and(body_string_contains("_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publication": { "_id": "legacy-pub", "title": "Blog" } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer hn-token"))
            .and(body_string_contains("createStory("))
            .and(body_partial_json(json!({
                "variables": { "publicationId": "legacy-pub" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "createStory": { "post": { "slug": "hello-legacy" } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Legacy, AuthScheme::Bearer),
            secret("hn-token"),
            timeout(),
        )
        .unwrap();

        let receipt = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap();
        assert_eq!(receipt.slug.as_deref(), Some("hello-legacy"));
    }

    #[tokio::test]
    async fn test_legacy_null_publication_is_discovery_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publication": null } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Legacy, AuthScheme::Bare),
            secret("hn-token"),
            timeout(),
        )
        .unwrap();

        let err = client.discover_publication().await.unwrap_err();
        assert!(matches!(
            err,
            BlogcastError::Platform(PlatformError::Discovery(_))
        ));
    }

    #[tokio::test]
    async fn test_graphql_errors_are_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "errors": [{
                    "message": "You must be logged in",
                    "extensions": { "code": "UNAUTHENTICATED" }
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Publications, AuthScheme::Bare),
            secret(""),
            timeout(),
        )
        .unwrap();

        let err = client
            .publish(&Document::parse(HELLO).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("You must be logged in"));
    }

    #[tokio::test]
    async fn test_markdown_with_quotes_survives_transport() {
        let mock_server = MockServer::start().await;
        let source = "# Say \"hi\"\n\nCode: \"\"\"block\"\"\" {braces}\n";

        Mock::given(method("POST"))
            .and(body_string_contains("publications(first: 10)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "me": { "publications": { "edges": [ { "node": { "id": "p" } } ] } } }
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains("createPublicationStory"))
            .and(body_partial_json(json!({
                "variables": {
                    "title": "Say \"hi\"",
                    "contentMarkdown": "\nCode: \"\"\"block\"\"\" {braces}\n"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "createPublicationStory": { "post": { "slug": "say-hi" } } }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = HashnodeClient::new(
            &config(&mock_server, HashnodeApi::Publications, AuthScheme::Bare),
            secret("t"),
            timeout(),
        )
        .unwrap();

        let receipt = client
            .publish(&Document::parse(source).unwrap())
            .await
            .unwrap();
        assert_eq!(receipt.slug.as_deref(), Some("say-hi"));
    }
}
