use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{from_str, Value};
use url::{ParseError, Url};

use super::backend_interface::{
    BackendGateway, BackendReply, ErrorLayer, GatewayError, Method, Result,
};

/// Header the backend expects the session token in.
pub const TOKEN_HEADER: &str = "token";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest only errors for things that happen below HTTP (connection refused,
/// DNS, timeouts, a body that stops halfway); unhappy status codes are handled
/// separately in `check_status`.
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> GatewayError {
        GatewayError::unavailable(ErrorLayer::TransportLayer, err.to_string())
    }
}

impl From<ParseError> for GatewayError {
    fn from(err: ParseError) -> GatewayError {
        GatewayError::unavailable(ErrorLayer::BadInput, err.to_string())
    }
}

#[derive(Debug)]
struct RemoteBackend {
    base_url: Url,
    client: reqwest::Client,
}

/// Pull a human readable message out of an error body if the backend gave us
/// one.  The backend reports `{"Error": "..."}` but older endpoints used the
/// lowercase key.
fn backend_error_text(body: &str) -> Option<String> {
    let value: Value = from_str(body).ok()?;
    value
        .get("Error")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized);
    }
    if !status.is_success() {
        let message = match backend_error_text(body) {
            Some(text) => format!("Backend status of {}: {}", status, text),
            None => format!("Backend status of {}", status),
        };
        return Err(GatewayError::backend_status(status.as_u16(), message));
    }
    Ok(())
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    from_str(body).map_err(|err| GatewayError::malformed(err.to_string()))
}

#[async_trait]
impl BackendGateway for RemoteBackend {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<BackendReply> {
        let url = self.base_url.join(path)?;
        trace!(%method, %url, "backend request");

        let builder = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        let mut builder = builder.header("Accept", "application/json");
        if let Some(token) = token {
            builder = builder.header(TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body.to_string());
        }

        let res = builder.send().await?;
        let status = res.status();
        let text = res.text().await?;

        if let Err(err) = check_status(status, &text) {
            warn!(%method, path, %status, "backend refused request");
            return Err(err);
        }

        Ok(BackendReply {
            body: parse_body(&text)?,
        })
    }

    fn kind(&self) -> &'static str {
        "remote"
    }
}

/// Build a gateway talking to `protocol://host:port/`.
pub fn make_remote_backend(
    protocol: &str,
    host: &str,
    port: u16,
) -> Result<Box<dyn BackendGateway + Send + Sync>> {
    let base_url = Url::parse(&format!("{}://{}:{}/", protocol, host, port))?;
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(Box::new(RemoteBackend { base_url, client }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            check_status(StatusCode::UNAUTHORIZED, ""),
            Err(GatewayError::Unauthorized)
        );
        assert!(check_status(StatusCode::OK, "").is_ok());
        assert!(check_status(StatusCode::NO_CONTENT, "").is_ok());

        match check_status(StatusCode::NOT_FOUND, "{\"Error\": \"no such deploy\"}") {
            Err(GatewayError::BackendUnavailable(details)) => {
                assert_eq!(details.layer, ErrorLayer::ServerLayer);
                assert_eq!(details.status, Some(404));
                assert_eq!(
                    details.message,
                    "Backend status of 404 Not Found: no such deploy"
                );
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(parse_body("  \n").unwrap(), Value::Null);
        assert!(matches!(
            parse_body("<html>"),
            Err(GatewayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn bad_host_is_bad_input() {
        match make_remote_backend("http", "bad host", 80) {
            Err(GatewayError::BackendUnavailable(details)) => {
                assert_eq!(details.layer, ErrorLayer::BadInput)
            }
            _ => panic!("expected a URL parse failure"),
        }
    }
}
