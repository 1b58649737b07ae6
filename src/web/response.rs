use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use liquid::{model::Value as LiquidValue, Object, Template};

use super::{signed_in::SignedIn, AppState, DASHBOARD_PATH, LOGIN_PATH};
use crate::session::{expired_session_cookie, GuiMessage, GuiMessages};

/// Failures that escape a handler.  Backend failures are normally turned into
/// flash messages before they get this far; what's left is our own breakage.
#[derive(Debug)]
pub enum GuiError {
    Template(liquid::Error),
    Serialize(String),
}

impl From<liquid::Error> for GuiError {
    fn from(err: liquid::Error) -> GuiError {
        GuiError::Template(err)
    }
}

impl From<serde_json::Error> for GuiError {
    fn from(err: serde_json::Error) -> GuiError {
        GuiError::Serialize(err.to_string())
    }
}

impl IntoResponse for GuiError {
    fn into_response(self) -> Response {
        let message = match self {
            GuiError::Template(err) => format!("Template error: {}", err),
            GuiError::Serialize(err) => format!("Serialization error: {}", err),
        };
        error!(%message, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
    }
}

/// 302 to `location`, which is what the browser-facing pages have always
/// answered with.
pub fn found(location: &str) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(location) {
        headers.insert(header::LOCATION, value);
    }
    (StatusCode::FOUND, headers).into_response()
}

pub fn found_with_cookie(location: &str, cookie: &str) -> Response {
    let mut response = found(location);
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

pub fn to_dashboard() -> Response {
    found(DASHBOARD_PATH)
}

/// The backend no longer accepts our token: forget the session and start
/// over at the login page.
pub fn sign_out(state: &AppState, signed_in: &SignedIn) -> Response {
    state.sessions.remove(&signed_in.id);
    info!(username = %signed_in.session.username, "token rejected, signing out");
    found_with_cookie(LOGIN_PATH, &expired_session_cookie())
}

/// Queue `messages` for the next page and send the browser to `location`.
pub fn redirect_with_messages(
    state: &AppState,
    signed_in: &SignedIn,
    messages: GuiMessages,
    location: &str,
) -> Response {
    state.sessions.queue_messages(&signed_in.id, messages);
    found(location)
}

fn render_with(
    template: &Template,
    mut globals: Object,
    username: &str,
    namespace: &str,
    messages: Vec<GuiMessage>,
) -> Result<Response, GuiError> {
    globals.insert("username".into(), LiquidValue::scalar(username.to_string()));
    globals.insert("namespace".into(), LiquidValue::scalar(namespace.to_string()));
    globals.insert("guiMessages".into(), liquid::model::to_value(&messages)?);
    let output = template.render(&globals)?;
    Ok(Html(output).into_response())
}

/// Render a signed-in page, showing queued messages and then `messages`.
pub fn render_page(
    state: &AppState,
    signed_in: &SignedIn,
    template: &Template,
    globals: Object,
    messages: GuiMessages,
) -> Result<Response, GuiError> {
    let shown = state.sessions.take_messages(&signed_in.id, messages);
    render_with(
        template,
        globals,
        &signed_in.session.username,
        &signed_in.session.namespace,
        shown,
    )
}

/// Render a page for someone without a session (only the login form).
pub fn render_anonymous(
    template: &Template,
    globals: Object,
    messages: GuiMessages,
) -> Result<Response, GuiError> {
    render_with(template, globals, "", "", messages.into_vec())
}
