use std::sync::Arc;

use axum::{response::Response, Extension};

use super::{
    response::{render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState,
};
use crate::{
    backend::{get_json, paths, GatewayError},
    records::DeployInformation,
    session::GuiMessages,
};

/// Deployments of the session's namespace, in backend order.
pub async fn handle_deploy_list(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let fetched: Result<Vec<DeployInformation>, GatewayError> =
        get_json(state.backend.as_ref(), paths::DEPLOYS, signed_in.token()).await;
    let deploys = match fetched {
        Ok(deploys) => Some(
            deploys
                .into_iter()
                .filter(|deploy| deploy.namespace == signed_in.session.namespace)
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
        &state.templates.deploy_list,
        liquid::object!({ "deployInformationSlice": deploys }),
        messages,
    )
}
