use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{response::found, AppState, LOGIN_PATH};
use crate::session::{session_id_from_cookie_header, Session};

/// Extractor gating every `/gui/*` page: resolves the session cookie to a
/// signed-in session or bounces the browser to the login page.
#[derive(Clone, Debug)]
pub struct SignedIn {
    pub id: Uuid,
    pub session: Session,
}

impl SignedIn {
    pub fn token(&self) -> Option<&str> {
        Some(self.session.token.as_str())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let state = match parts.extensions.get::<Arc<AppState>>() {
            Some(state) => state.clone(),
            None => return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        };

        let id = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(session_id_from_cookie_header);

        let found_session = id.and_then(|id| state.sessions.get(&id).map(|s| (id, s)));
        match found_session {
            Some((id, session)) if !session.username.is_empty() => Ok(SignedIn { id, session }),
            _ => {
                debug!(path = %parts.uri.path(), "no session, redirecting to login");
                Err(found(LOGIN_PATH))
            }
        }
    }
}
