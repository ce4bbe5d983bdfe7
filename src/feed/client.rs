use reqwest::{Client, Url};

use super::schema::{ErrorBody, FeedSchema};
use super::FeedError;

/// HTTP side of the feeds: one GET per fetch, no retry, no timeout
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: Client,
    base_url: String,
}

impl FeedClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join an endpoint path onto the base URL
    pub fn url_for(&self, endpoint: &str) -> Result<Url, FeedError> {
        let joined = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| FeedError::Url {
            url: joined,
            reason: e.to_string(),
        })
    }

    /// Fetch one feed and extract its payload from the response envelope
    pub async fn fetch<S: FeedSchema>(&self, endpoint: &str) -> Result<Vec<S::Item>, FeedError> {
        let url = self.url_for(endpoint)?;
        tracing::debug!(feed = %S::KIND, %url, "Fetching feed");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| FeedError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| FeedError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message())
                .unwrap_or_else(|| {
                    let trimmed = body.trim();
                    if trimmed.is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        trimmed.to_string()
                    }
                });
            return Err(FeedError::Status {
                url: url.to_string(),
                status,
                message,
            });
        }

        let envelope: S = serde_json::from_str(&body).map_err(|source| FeedError::Decode {
            url: url.to_string(),
            source,
        })?;
        let payload = envelope.into_payload();
        tracing::debug!(feed = %S::KIND, items = payload.len(), "Feed decoded");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::schema::{DuplicatesResponse, FrequenciesResponse, KeyVal, PeopleResponse};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_url_for_joins_slashes() {
        let client = FeedClient::new("http://localhost:3000/");
        assert_eq!(
            client.url_for("/people").unwrap().as_str(),
            "http://localhost:3000/people"
        );
        let client = FeedClient::new("http://localhost:3000/api");
        assert_eq!(
            client.url_for("people/emails/duplicates").unwrap().as_str(),
            "http://localhost:3000/api/people/emails/duplicates"
        );
    }

    #[test]
    fn test_url_for_rejects_garbage() {
        let client = FeedClient::new("not a url");
        assert!(matches!(client.url_for("/people"), Err(FeedError::Url { .. })));
    }

    #[tokio::test]
    async fn test_fetch_people_returns_field_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"people": [{"name": "Ann"}]})))
            .mount(&server)
            .await;

        let client = FeedClient::new(server.uri());
        let people = client.fetch::<PeopleResponse>("/people").await.unwrap();

        assert_eq!(serde_json::to_value(&people).unwrap(), json!([{"name": "Ann"}]));
    }

    #[tokio::test]
    async fn test_fetch_empty_duplicates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/emails/duplicates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"possibleDuplicates": []})))
            .mount(&server)
            .await;

        let client = FeedClient::new(server.uri());
        let dupes = client
            .fetch::<DuplicatesResponse>("/people/emails/duplicates")
            .await
            .unwrap();
        assert!(dupes.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_frequencies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people/emails/char-frequencies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "frequencies": [{"key": "a", "value": 4}, {"key": "b", "value": 3}]
            })))
            .mount(&server)
            .await;

        let client = FeedClient::new(server.uri());
        let freqs = client
            .fetch::<FrequenciesResponse>("/people/emails/char-frequencies")
            .await
            .unwrap();
        assert_eq!(freqs, vec![KeyVal::new("a", 4), KeyVal::new("b", 3)]);
        assert_eq!(
            serde_json::to_value(&freqs).unwrap(),
            json!([{"key": "a", "value": 4}, {"key": "b", "value": 3}])
        );
    }

    #[tokio::test]
    async fn test_server_error_carries_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "status": "Error listing people from SalesLoft API.",
                "error": "upstream unavailable"
            })))
            .mount(&server)
            .await;

        let client = FeedClient::new(server.uri());
        match client.fetch::<PeopleResponse>("/people").await {
            Err(FeedError::Status { status, message, .. }) => {
                assert_eq!(status.as_u16(), 500);
                assert!(message.contains("upstream unavailable"), "got: {message}");
            }
            other => panic!("Expected Status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_without_body() {
        let server = MockServer::start().await;

        let client = FeedClient::new(server.uri());
        match client.fetch::<PeopleResponse>("/people").await {
            Err(FeedError::Status { status, message, .. }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(message, "Not Found");
            }
            other => panic!("Expected Status error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/people"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = FeedClient::new(server.uri());
        let result = client.fetch::<PeopleResponse>("/people").await;
        assert!(matches!(result, Err(FeedError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Reserve a free port, then close it so the connection is refused
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = FeedClient::new(format!("http://{}", addr));
        let result = client.fetch::<PeopleResponse>("/people").await;
        assert!(matches!(result, Err(FeedError::Transport { .. })));
    }
}
