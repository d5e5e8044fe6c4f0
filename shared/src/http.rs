//! HTTP helpers used by readiness probes
//!
//! Workers expose an HTTP surface once they finish loading. Probes talk to it
//! through [`make_http_client`] and turn response bodies into values with one
//! decode function per expected shape.

use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::errors::{SharedError, SharedResult};

/// Body prefix some workers send instead of a structured error
pub const SERVER_FAULT_PREFIX: &str = "500 Internal Server Error";

/// Upper bound for a single outbound call
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Build the HTTP client shared by probes
pub fn make_http_client() -> SharedResult<Client> {
    let client = Client::builder()
        .user_agent(concat!("selfstart/", env!("CARGO_PKG_VERSION")))
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

fn reject_server_fault(body: &str) -> SharedResult<()> {
    if body.starts_with(SERVER_FAULT_PREFIX) {
        return Err(SharedError::ServerFault {
            body: body.to_string(),
        });
    }
    Ok(())
}

fn decode_error(body: &str, err: serde_json::Error) -> SharedError {
    SharedError::DecodeError {
        body: body.to_string(),
        message: err.to_string(),
    }
}

/// Decode a body that must be a JSON object
pub fn decode_object(body: &str) -> SharedResult<Map<String, Value>> {
    reject_server_fault(body)?;
    serde_json::from_str(body).map_err(|e| decode_error(body, e))
}

/// Decode a body that must be a JSON array
pub fn decode_array(body: &str) -> SharedResult<Vec<Value>> {
    reject_server_fault(body)?;
    serde_json::from_str(body).map_err(|e| decode_error(body, e))
}

/// Accept any body as raw text unless it is a server fault
pub fn decode_text(body: &str) -> SharedResult<String> {
    reject_server_fault(body)?;
    Ok(body.to_string())
}

pub async fn parse_object(response: reqwest::Response) -> SharedResult<Map<String, Value>> {
    let body = response.text().await?;
    decode_object(&body)
}

pub async fn parse_array(response: reqwest::Response) -> SharedResult<Vec<Value>> {
    let body = response.text().await?;
    decode_array(&body)
}

pub async fn parse_text(response: reqwest::Response) -> SharedResult<String> {
    let body = response.text().await?;
    decode_text(&body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_decode_object() {
        let obj = decode_object(r#"{"status": "ok", "port": 7820}"#).unwrap();
        assert_eq!(obj["status"], "ok");
        assert_eq!(obj["port"], 7820);
    }

    #[test]
    fn test_decode_object_rejects_array() {
        let err = decode_object("[1, 2]").unwrap_err();
        assert!(matches!(err, SharedError::DecodeError { .. }));
        assert!(err.to_string().contains("[1, 2]"));
    }

    #[test]
    fn test_decode_array() {
        let arr = decode_array(r#"["a", "b"]"#).unwrap();
        assert_eq!(arr.len(), 2);
    }

    #[test]
    fn test_malformed_json() {
        let err = decode_array("[1, 2").unwrap_err();
        assert!(matches!(err, SharedError::DecodeError { .. }));
    }

    #[test]
    fn test_server_fault_for_every_shape() {
        let body = "500 Internal Server Error: model failed to load";
        assert!(matches!(decode_object(body), Err(SharedError::ServerFault { .. })));
        assert!(matches!(decode_array(body), Err(SharedError::ServerFault { .. })));
        assert!(matches!(decode_text(body), Err(SharedError::ServerFault { .. })));
    }

    #[test]
    fn test_decode_text_passthrough() {
        assert_eq!(decode_text("not json at all").unwrap(), "not json at all");
    }

    #[tokio::test]
    async fn test_parse_responses_from_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/object_info"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ready": true}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("500 Internal Server Error"))
            .mount(&server)
            .await;

        let client = make_http_client().unwrap();

        let response = client
            .get(format!("{}/object_info", server.uri()))
            .send()
            .await
            .unwrap();
        let obj = parse_object(response).await.unwrap();
        assert_eq!(obj["ready"], true);

        let response = client
            .get(format!("{}/broken", server.uri()))
            .send()
            .await
            .unwrap();
        let err = parse_text(response).await.unwrap_err();
        assert!(matches!(err, SharedError::ServerFault { .. }));
    }
}
