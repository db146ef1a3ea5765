//! Test helpers for the Xelon API

use super::client::{Client, ClientOptions, RetryConfig};

/// Client with a fixed token and fast retries, pointed at a mock server
#[cfg(test)]
pub fn create_test_client(url: &str) -> Client {
    Client::with_options(
        url,
        "test-token",
        ClientOptions {
            client_id: Some("test-client".to_string()),
            retry: RetryConfig {
                max_retries: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
                timeout_seconds: 5,
            },
            ..Default::default()
        },
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::create_test_client;
    use mockito::{Matcher, Server};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 100);
        assert_eq!(config.max_backoff_ms, 10000);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_connection_pool_config() {
        use pool::ConnectionPoolConfig;

        let config = ConnectionPoolConfig::default();
        assert_eq!(config.max_idle_per_host, 10);
        assert_eq!(config.idle_timeout.as_secs(), 90);
        assert_eq!(config.request_timeout.as_secs(), 30);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = create_test_client("https://hq.xelon.ch/api/service");
        assert_eq!(client.base_url().as_str(), "https://hq.xelon.ch/api/service/");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = Client::new("not a url", "token");
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_sends_bearer_token_and_client_id() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/things/1")
            .match_header("authorization", "Bearer test-token")
            .match_header("x-user-id", "test-client")
            .match_header("user-agent", Matcher::Regex("^terraform-provider-xelon/".into()))
            .with_status(200)
            .with_body(r#"{"id": "1"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let thing: Thing = client.get("things/1").await.unwrap();
        assert_eq!(thing.id, "1");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_accepts_data_wrapper() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/things/2")
            .with_status(200)
            .with_body(r#"{"data": {"id": "2"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let thing: Thing = client.get("/things/2").await.unwrap();
        assert_eq!(thing, Thing { id: "2".into() });
    }

    #[tokio::test]
    async fn test_empty_body_is_unit() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/things/3")
            .with_status(204)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(client.delete("things/3").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_accepts_json_message_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("DELETE", "/things/5")
            .with_status(200)
            .with_body(r#"{"message": "Thing deleted"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert!(client.delete("things/5").await.is_ok());
    }

    #[tokio::test]
    async fn test_parse_error_message_has_single_prefix() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/things/6")
            .with_status(200)
            .with_body(r#"{"name": "no id"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.get::<Thing>("things/6").await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Failed to parse response: "), "{}", message);
        assert_eq!(message.matches("Failed to parse response").count(), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_not_retried() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/things/4")
            .with_status(503)
            .with_body(r#"{"message": "Service Unavailable"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.get::<Thing>("things/4").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        assert!(err.is_transient_provisioning());
        assert!(err.to_string().contains("Service Unavailable"));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/things/5")
            .with_status(429)
            .expect(3)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.get::<Thing>("things/5").await.unwrap_err();

        assert!(matches!(err, ApiError::RateLimited));
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/things/6")
            .with_status(401)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client.get::<Thing>("things/6").await.unwrap_err();
        assert!(matches!(err, ApiError::AuthError));
    }

    #[tokio::test]
    async fn test_validation_errors_keep_field_details() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/things")
            .with_status(422)
            .with_body(r#"{"message": "The given data was invalid.", "errors": {"name": ["required"]}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let err = client
            .post::<Thing, _>("things", &serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            ApiError::ApiError {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "The given data was invalid.");
                let details = details.unwrap();
                assert_eq!(details.field_errors.unwrap()["name"], vec!["required"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_reported() {
        let mut server = Server::new_async().await;
        let _ok = server
            .mock("GET", "/things/7")
            .with_status(200)
            .with_body(r#"{"id": "7"}"#)
            .create_async()
            .await;
        let _missing = server
            .mock("GET", "/things/8")
            .with_status(404)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        assert_eq!(
            client.get::<Thing>("things/7").await.unwrap(),
            Thing { id: "7".into() }
        );
        let err = client.get::<Thing>("things/8").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }
}
