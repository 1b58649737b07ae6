use std::{fmt, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub type Result<T> = std::result::Result<T, GatewayError>;

// A body that parsed as JSON but not as the record type we asked for is still
// the backend handing us something we can't use.
impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> GatewayError {
        GatewayError::malformed(err.to_string())
    }
}

/// Express whether the error seems to be happening in the transport, the
/// backend service, or the records it returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorLayer {
    /// We could not build a request at all, like a path that can't be joined
    /// onto the configured base URL.
    BadInput,
    /// The connection failed or timed out before the backend answered.
    TransportLayer,
    /// The backend answered with an unhappy status code.
    ServerLayer,
    /// The backend answered, but the body was not what we expected.
    DataLayer,
}

/// Details about what went wrong, kept around so the GUI can show the
/// message to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub layer: ErrorLayer,
    /// Stringified version of the lower level error.
    pub message: String,
    /// HTTP status, when the backend got far enough to answer.
    pub status: Option<u16>,
}

/// Everything that can go wrong talking to the backend.
///
/// The dashboard treats `BackendUnavailable` and `MalformedResponse` the same
/// way (abort and show the message); `Unauthorized` is special because the
/// caller reacts by dropping the session and sending the browser to the login
/// page instead of showing an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Transport failure or a non-2xx (other than 401) status.
    BackendUnavailable(ErrorDetails),
    /// The body was not JSON or did not match the expected shape.
    MalformedResponse(ErrorDetails),
    /// The backend rejected our token.
    Unauthorized,
}

impl GatewayError {
    pub fn unavailable(layer: ErrorLayer, message: impl Into<String>) -> GatewayError {
        GatewayError::BackendUnavailable(ErrorDetails {
            layer,
            message: message.into(),
            status: None,
        })
    }

    /// The backend answered with a non-2xx status other than 401.
    pub fn backend_status(status: u16, message: impl Into<String>) -> GatewayError {
        GatewayError::BackendUnavailable(ErrorDetails {
            layer: ErrorLayer::ServerLayer,
            message: message.into(),
            status: Some(status),
        })
    }

    pub fn malformed(message: impl Into<String>) -> GatewayError {
        GatewayError::MalformedResponse(ErrorDetails {
            layer: ErrorLayer::DataLayer,
            message: message.into(),
            status: None,
        })
    }

    /// Some lookups treat a missing record as "nothing there yet".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatewayError::BackendUnavailable(ErrorDetails {
                status: Some(404),
                ..
            })
        )
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::BackendUnavailable(details) => write!(f, "{}", details.message),
            GatewayError::MalformedResponse(details) => {
                write!(f, "Malformed backend response: {}", details.message)
            }
            GatewayError::Unauthorized => write!(f, "Token is invalid or expired"),
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A successful (2xx) backend answer.  An empty body shows up as `Null`.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendReply {
    pub body: Value,
}

/// Unified exposure for talking to the cluster-management REST API, whether
/// that's the real thing over HTTP(S) or a canned set of fixture responses.
///
/// Implementations are responsible for mapping unhappy statuses into
/// `GatewayError` so that a returned `BackendReply` always means success.
///
/// `token` is the session token; it goes out in the `token` header on every
/// call except sign-in, which is the only caller passing `None`.
#[async_trait]
pub trait BackendGateway {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<BackendReply>;

    /// Short label for logs, e.g. "remote" or "fixture".
    fn kind(&self) -> &'static str;
}

/// Lets a test keep a handle on a gateway it hands to the server.
#[async_trait]
impl<T: BackendGateway + Send + Sync + ?Sized> BackendGateway for Arc<T> {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<BackendReply> {
        (**self).request(method, path, body, token).await
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// GET `path` and deserialize the body into `T`.
pub async fn get_json<T: DeserializeOwned>(
    backend: &(dyn BackendGateway + Send + Sync),
    path: &str,
    token: Option<&str>,
) -> Result<T> {
    let reply = backend.request(Method::Get, path, None, token).await?;
    let parsed = serde_json::from_value(reply.body)?;
    Ok(parsed)
}

pub async fn post_json<B: Serialize>(
    backend: &(dyn BackendGateway + Send + Sync),
    path: &str,
    body: &B,
    token: Option<&str>,
) -> Result<BackendReply> {
    let value = serde_json::to_value(body)?;
    backend.request(Method::Post, path, Some(value), token).await
}

pub async fn put_json<B: Serialize>(
    backend: &(dyn BackendGateway + Send + Sync),
    path: &str,
    body: &B,
    token: Option<&str>,
) -> Result<BackendReply> {
    let value = serde_json::to_value(body)?;
    backend.request(Method::Put, path, Some(value), token).await
}

pub async fn delete(
    backend: &(dyn BackendGateway + Send + Sync),
    path: &str,
    token: Option<&str>,
) -> Result<BackendReply> {
    backend.request(Method::Delete, path, None, token).await
}
