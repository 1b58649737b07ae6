use std::{
    collections::BTreeMap,
    fs,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    backend_interface::{BackendGateway, BackendReply, GatewayError, Method, Result},
    paths,
};

/// On-disk format for `--fixtures`: canned GET bodies keyed by backend path
/// (query string included), plus the token sign-in hands out.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FixtureFile {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub responses: BTreeMap<String, Value>,
}

/// A request the fixture backend saw; lets tests check what the GUI sent.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
}

/// Backend double answering from an in-memory table.
///
/// - Configured replies (or failures) win.
/// - An unconfigured GET is a 404.
/// - An unconfigured write succeeds with an empty body.
/// - Sign-in hands out the configured token; once a token is configured every
///   other call must present it.
#[derive(Debug, Default)]
pub struct FixtureBackend {
    replies: BTreeMap<String, Result<BackendReply>>,
    token: Option<String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn reply_key(method: Method, path: &str) -> String {
    format!("{} {}", method, path)
}

impl FixtureBackend {
    pub fn new() -> Self {
        FixtureBackend::default()
    }

    pub fn from_fixture_file(file: FixtureFile) -> Self {
        let mut backend = FixtureBackend::new();
        backend.token = file.token;
        for (path, body) in file.responses {
            backend = backend.with_json(&path, body);
        }
        backend
    }

    /// Answer GETs of `path` with `body`.
    pub fn with_json(self, path: &str, body: Value) -> Self {
        self.with_reply(Method::Get, path, body)
    }

    pub fn with_reply(mut self, method: Method, path: &str, body: Value) -> Self {
        self.replies
            .insert(reply_key(method, path), Ok(BackendReply { body }));
        self
    }

    pub fn with_failure(mut self, method: Method, path: &str, err: GatewayError) -> Self {
        self.replies.insert(reply_key(method, path), Err(err));
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Everything received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock_requests().clone()
    }

    fn lock_requests(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.requests.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_token(&self, method: Method, path: &str, token: Option<&str>) -> Result<()> {
        let expected = match &self.token {
            Some(t) => t,
            None => return Ok(()),
        };
        if method == Method::Post && path == paths::TOKENS {
            return Ok(());
        }
        match token {
            Some(given) if given == expected => Ok(()),
            _ => Err(GatewayError::Unauthorized),
        }
    }
}

#[async_trait]
impl BackendGateway for FixtureBackend {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Result<BackendReply> {
        self.lock_requests().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
            token: token.map(|t| t.to_string()),
        });

        self.check_token(method, path, token)?;

        if let Some(reply) = self.replies.get(&reply_key(method, path)) {
            return reply.clone();
        }

        match method {
            Method::Post if path == paths::TOKENS => Ok(BackendReply {
                body: json!({ "Token": self.token.clone().unwrap_or_else(|| "fixture".to_string()) }),
            }),
            Method::Get => Err(GatewayError::backend_status(
                404,
                "Backend status of 404 Not Found",
            )),
            _ => Ok(BackendReply { body: Value::Null }),
        }
    }

    fn kind(&self) -> &'static str {
        "fixture"
    }
}

/// Load a `FixtureFile` from a JSON file on disk.
pub fn make_fixture_backend(path: &str) -> std::io::Result<Box<dyn BackendGateway + Send + Sync>> {
    let contents = fs::read_to_string(path)?;
    let file: FixtureFile = serde_json::from_str(&contents)?;
    Ok(Box::new(FixtureBackend::from_fixture_file(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_get_is_not_found() {
        let backend = FixtureBackend::new();
        let err = backend
            .request(Method::Get, paths::DEPLOYS, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Backend status of 404 Not Found");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn token_is_enforced_except_for_sign_in() {
        let backend = FixtureBackend::new()
            .with_token("t0k")
            .with_json(paths::DEPLOYS, json!([]));

        let sign_in = backend
            .request(Method::Post, paths::TOKENS, Some(json!({})), None)
            .await
            .unwrap();
        assert_eq!(sign_in.body, json!({ "Token": "t0k" }));

        assert_eq!(
            backend.request(Method::Get, paths::DEPLOYS, None, Some("nope")).await,
            Err(GatewayError::Unauthorized)
        );
        let ok = backend
            .request(Method::Get, paths::DEPLOYS, None, Some("t0k"))
            .await
            .unwrap();
        assert_eq!(ok.body, json!([]));

        let seen = backend.requests();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].token.as_deref(), Some("t0k"));
    }

    #[tokio::test]
    async fn writes_are_recorded() {
        use crate::backend::{delete, put_json};

        let backend = FixtureBackend::new();
        let reply = put_json(&backend, "/api/v1/notifiers/web", &json!({ "Check": true }), None)
            .await
            .unwrap();
        assert_eq!(reply.body, Value::Null);
        delete(&backend, "/api/v1/notifiers/web", None).await.unwrap();

        let seen = backend.requests();
        assert_eq!(seen[0].method, Method::Put);
        assert_eq!(seen[0].body, Some(json!({ "Check": true })));
        assert_eq!(seen[1].method, Method::Delete);
        assert_eq!(seen[1].body, None);
    }

    #[test]
    fn fixture_file_parses() {
        let file: FixtureFile = serde_json::from_str(
            r#"{ "token": "demo", "responses": { "/api/v1/deploys/": [] } }"#,
        )
        .unwrap();
        assert_eq!(file.token.as_deref(), Some("demo"));
        assert_eq!(file.responses.len(), 1);
    }

    #[tokio::test]
    async fn demo_fixtures_load() {
        let backend =
            make_fixture_backend(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/fixtures.json"))
                .unwrap();
        assert_eq!(backend.kind(), "fixture");
        let services = paths::services_in("default", "127.0.0.1", 8080);
        let reply = backend
            .request(Method::Get, &services, None, Some("demo-token"))
            .await
            .unwrap();
        assert_eq!(reply.body[0]["Name"], json!("web"));
    }
}
