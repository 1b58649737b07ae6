use std::sync::Arc;

use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::json;

use super::{
    response::{render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState,
};
use crate::{
    backend::{delete, get_json, paths, GatewayError},
    records::{EmailServerSmtp, ReplicationControllerNotifier},
    session::GuiMessages,
};

pub async fn handle_notifier_list(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let fetched: Result<Vec<ReplicationControllerNotifier>, GatewayError> =
        get_json(state.backend.as_ref(), paths::NOTIFIERS, signed_in.token()).await;
    let notifiers = match fetched {
        Ok(notifiers) => Some(
            notifiers
                .into_iter()
                .sorted_by(|a, b| a.name.cmp(&b.name))
                .collect::<Vec<_>>(),
        ),
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => {
            messages.add_danger(err.to_string());
            None
        }
    };

    render_page(
        &state,
        &signed_in,
        &state.templates.notifier_list,
        liquid::object!({ "replicationControllerNotifierSlice": notifiers }),
        messages,
    )
}

pub async fn handle_email_server_list(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let fetched: Result<Vec<EmailServerSmtp>, GatewayError> =
        get_json(state.backend.as_ref(), paths::EMAIL_SERVERS, signed_in.token()).await;
    let servers = match fetched {
        Ok(servers) => Some(servers),
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => {
            messages.add_danger(err.to_string());
            None
        }
    };

    render_page(
        &state,
        &signed_in,
        &state.templates.emailserver_list,
        liquid::object!({ "emailServerSMTPSlice": servers }),
        messages,
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    name: String,
}

/// Called from the list page's script, so it answers with JSON instead of a
/// redirect.
pub async fn handle_email_server_delete(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<DeleteQuery>,
) -> Response {
    let deleted = delete(
        state.backend.as_ref(),
        &paths::item(paths::EMAIL_SERVERS, &query.name),
        signed_in.token(),
    )
    .await;
    match deleted {
        Ok(_) => {
            info!(name = %query.name, "email server deleted");
            Json(json!({})).into_response()
        }
        Err(GatewayError::Unauthorized) => sign_out(&state, &signed_in),
        Err(err) => {
            warn!(name = %query.name, error = %err, "email server delete failed");
            (StatusCode::NOT_FOUND, Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}
