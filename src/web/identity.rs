use std::sync::Arc;

use axum::{
    http::{header, HeaderMap},
    response::Response,
    Extension, Form,
};
use axum_macros::debug_handler;
use serde::Deserialize;
use uuid::Uuid;

use super::{
    forms::describe_time_zone,
    response::{found_with_cookie, render_anonymous, GuiError},
    AppState, DASHBOARD_PATH, LOGIN_PATH,
};
use crate::{
    backend::{paths, post_json, GatewayError},
    records::{Credentials, TokenData},
    session::{
        expired_session_cookie, session_cookie, session_id_from_cookie_header, GuiMessages,
        Session,
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default, rename = "timeZoneOffset")]
    time_zone_offset: String,
}

pub async fn handle_login_page(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    render_anonymous(
        &state.templates.login,
        liquid::object!({ "loginUsername": "" }),
        GuiMessages::new(),
    )
}

async fn request_token(state: &AppState, form: &LoginForm) -> Result<String, GatewayError> {
    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password.clone(),
    };
    let reply = post_json(state.backend.as_ref(), paths::TOKENS, &credentials, None).await?;
    let token: TokenData = serde_json::from_value(reply.body)?;
    if token.token.is_empty() {
        return Err(GatewayError::malformed("no token in sign-in reply"));
    }
    Ok(token.token)
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(session_id_from_cookie_header)
}

#[debug_handler]
pub async fn handle_login(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Result<Response, GuiError> {
    let token = match request_token(&state, &form).await {
        Ok(token) => token,
        Err(err) => {
            let mut messages = GuiMessages::new();
            match err {
                GatewayError::Unauthorized => {
                    messages.add_danger("Username or password is incorrect")
                }
                err => messages.add_danger(err.to_string()),
            }
            info!(username = %form.username, "sign-in failed");
            return render_anonymous(
                &state.templates.login,
                liquid::object!({ "loginUsername": form.username }),
                messages,
            );
        }
    };

    let mut messages = GuiMessages::new();
    let time_zone_offset = form.time_zone_offset.trim().parse::<i64>().ok();
    match time_zone_offset {
        Some(offset) => messages.add_success(describe_time_zone(offset)),
        None => messages.add_danger("Fail to get browser time zone offset. Use UTC instead"),
    }
    messages.add_success(format!("User {} login", form.username));

    let id = state.sessions.renew(
        session_id(&headers).as_ref(),
        Session {
            username: form.username.clone(),
            namespace: state.config.namespace.clone(),
            token,
            time_zone_offset,
            messages: Vec::new(),
        },
    );
    state.sessions.queue_messages(&id, messages);
    info!(username = %form.username, "signed in");

    Ok(found_with_cookie(DASHBOARD_PATH, &session_cookie(&id)))
}

pub async fn handle_logout(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(session) = session_id(&headers).and_then(|id| state.sessions.remove(&id)) {
        info!(username = %session.username, "signed out");
    }
    found_with_cookie(LOGIN_PATH, &expired_session_cookie())
}
