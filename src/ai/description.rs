use super::client::HttpEndpoint;
use super::DescriptionService;
use crate::error::Endpoint;
use crate::models::GenerationInput;
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

/// Keys the text-generation service has used to wrap its answer.
const WRAPPER_KEYS: [&str; 4] = ["description", "prompt", "text", "output"];

pub struct DescriptionClient {
    http: HttpEndpoint,
}

impl DescriptionClient {
    pub fn new(base_url: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(base_url, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        base_url: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: HttpEndpoint::new_with_client(Endpoint::Description, base_url, timeout, client),
        }
    }

    /// Full request URL for `input`.
    pub fn request_url(&self, input: &GenerationInput) -> String {
        self.http
            .url_with_query(&[("book", &input.book), ("character", &input.character)])
    }
}

#[async_trait]
impl DescriptionService for DescriptionClient {
    async fn describe(&self, input: &GenerationInput) -> Result<String> {
        let url = self.request_url(input);
        let body = self.http.get_text(&url).await?;
        normalize_description(&body)
    }
}

/// Reduce any observed response shape to the bare description text.
///
/// Accepts a JSON string, a JSON object wrapping the string, or an
/// unquoted plain-text body.
pub fn normalize_description(body: &str) -> Result<String> {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(text)) => text,
        Ok(Value::Object(map)) => unwrap_object(&map)?,
        Ok(other) => {
            return Err(Error::remote(
                Endpoint::Description,
                format!("unexpected description payload: {}", other),
            ))
        }
        Err(_) => body.to_string(),
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(Error::remote(
            Endpoint::Description,
            "empty description in response",
        ));
    }
    Ok(text.to_string())
}

fn unwrap_object(map: &Map<String, Value>) -> Result<String> {
    if let Some(text) = WRAPPER_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
    {
        return Ok(text.to_string());
    }

    let mut strings = map.values().filter_map(Value::as_str);
    match (strings.next(), strings.next()) {
        (Some(only), None) => Ok(only.to_string()),
        _ => Err(Error::remote(
            Endpoint::Description,
            "no description field in response object",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> DescriptionClient {
        DescriptionClient::new(format!("{}/describe", server.uri()), None)
    }

    #[test]
    fn test_normalize_json_string() {
        assert_eq!(
            normalize_description(r#""tall, stern, grey eyes""#).unwrap(),
            "tall, stern, grey eyes"
        );
    }

    #[test]
    fn test_normalize_wrapped_object() {
        assert_eq!(
            normalize_description(r#"{"description": "slender, silver hair"}"#).unwrap(),
            "slender, silver hair"
        );
        assert_eq!(
            normalize_description(r#"{"result": "broad shoulders", "tokens": 12}"#).unwrap(),
            "broad shoulders"
        );
    }

    #[test]
    fn test_normalize_plain_text() {
        assert_eq!(
            normalize_description("  young woman, red cloak\n").unwrap(),
            "young woman, red cloak"
        );
    }

    #[test]
    fn test_normalize_rejects_unusable_payloads() {
        assert!(normalize_description(r#""""#).unwrap_err().is_remote());
        assert!(normalize_description("[1, 2]").unwrap_err().is_remote());
        assert!(normalize_description(r#"{"a": "x", "b": "y"}"#)
            .unwrap_err()
            .is_remote());
    }

    #[test]
    fn test_request_url() {
        let client = DescriptionClient::new("https://llm.test".to_string(), None);
        assert_eq!(
            client.request_url(&GenerationInput::new("Dune", "Paul")),
            "https://llm.test?book=Dune&character=Paul"
        );
    }

    #[tokio::test]
    async fn test_describe_sends_query_and_parses_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/describe"))
            .and(query_param("book", "The Remains of the Day"))
            .and(query_param("character", "Stevens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!(
                    "slender, middle-aged man, thinning silver hair"
                )),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let text = client
            .describe(&GenerationInput::new("The Remains of the Day", "Stevens"))
            .await
            .unwrap();
        assert_eq!(text, "slender, middle-aged man, thinning silver hair");
    }

    #[tokio::test]
    async fn test_describe_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/describe"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .describe(&GenerationInput::new("Dune", "Paul"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::RemoteCallFailed {
                endpoint: Endpoint::Description,
                ..
            }
        ));
    }
}
