use std::sync::Arc;

use axum::{extract::Query, response::Response, Extension, Form};
use axum_macros::debug_handler;
use serde::Deserialize;

use super::{
    response::{redirect_with_messages, render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState, DEPLOY_LIST_PATH,
};
use crate::{
    backend::{get_json, paths, put_json, GatewayError},
    records::DeployBlueGreen,
    session::GuiMessages,
};

const NAMESPACE_LOOKUP_FAILED: &str = "Fail to get deployable namespace";
const NO_DEPLOYABLE_NAMESPACE: &str =
    "No deployed application is detected so there is no namespace to select for blue green deployment";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageQuery {
    image_information: String,
}

/// Form values that depend on whether the image already has a blue-green
/// setup.
fn form_globals(image: &str, existing: Option<DeployBlueGreen>) -> liquid::Object {
    match existing {
        None => liquid::object!({
            "actionButtonValue": "Create",
            "pageHeader": "Create Blue Green Deployment",
            "imageInformation": image,
            "currentNamespace": "",
            "description": "",
            "nodePort": "",
            "checkTagAutoGeneratedNodePort": "checked",
            "hiddenTagNodePort": "hidden"
        }),
        Some(existing) => {
            let (node_port, checked, hidden) = if existing.node_port == 0 {
                (String::new(), "checked", "hidden")
            } else {
                (existing.node_port.to_string(), "", "")
            };
            liquid::object!({
                "actionButtonValue": "Update",
                "pageHeader": "Update Blue Green Deployment",
                "imageInformation": image,
                "currentNamespace": existing.namespace,
                "description": existing.description,
                "nodePort": node_port,
                "checkTagAutoGeneratedNodePort": checked,
                "hiddenTagNodePort": hidden
            })
        }
    }
}

pub async fn handle_select_page(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, GuiError> {
    let backend = state.backend.as_ref();
    let image = query.image_information;

    let fetched: Result<DeployBlueGreen, GatewayError> = get_json(
        backend,
        &paths::item(paths::DEPLOY_BLUE_GREENS, &image),
        signed_in.token(),
    )
    .await;
    let existing = match fetched {
        Ok(existing) => Some(existing),
        Err(err) if err.is_not_found() => None,
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => {
            warn!(image = %image, error = %err, "blue green lookup failed");
            let mut messages = GuiMessages::new();
            messages.add_danger(NAMESPACE_LOOKUP_FAILED);
            return Ok(redirect_with_messages(
                &state,
                &signed_in,
                messages,
                DEPLOY_LIST_PATH,
            ));
        }
    };
    let mut globals = form_globals(&image, existing);

    let deployable = paths::deployable_namespaces(
        &image,
        &state.config.kubeapi_host,
        state.config.kubeapi_port,
    );
    let namespaces: Vec<String> = match get_json(backend, &deployable, signed_in.token()).await {
        Ok(namespaces) => namespaces,
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => {
            warn!(image = %image, error = %err, "deployable namespace lookup failed");
            let mut messages = GuiMessages::new();
            messages.add_danger(NAMESPACE_LOOKUP_FAILED);
            return Ok(redirect_with_messages(
                &state,
                &signed_in,
                messages,
                DEPLOY_LIST_PATH,
            ));
        }
    };
    if namespaces.is_empty() {
        let mut messages = GuiMessages::new();
        messages.add_danger(NO_DEPLOYABLE_NAMESPACE);
        return Ok(redirect_with_messages(
            &state,
            &signed_in,
            messages,
            DEPLOY_LIST_PATH,
        ));
    }

    globals.insert("namespaceSlice".into(), liquid::model::to_value(&namespaces)?);
    globals.insert(
        "buttonUrlCancel".into(),
        liquid::model::Value::scalar(DEPLOY_LIST_PATH),
    );
    render_page(
        &state,
        &signed_in,
        &state.templates.deploybluegreen_select,
        globals,
        GuiMessages::new(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlueGreenForm {
    image_information: String,
    namespace: String,
    node_port: String,
    description: String,
    session_affinity: String,
}

impl BlueGreenForm {
    /// A blank or unparsable node port asks for an auto-generated one.
    fn into_deploy_blue_green(self) -> DeployBlueGreen {
        DeployBlueGreen {
            image_information: self.image_information,
            namespace: self.namespace,
            node_port: self.node_port.trim().parse().unwrap_or(0),
            description: self.description,
            session_affinity: self.session_affinity,
        }
    }
}

#[debug_handler]
pub async fn handle_select(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<BlueGreenForm>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let blue_green = form.into_deploy_blue_green();
    let path = paths::with_kubeapi(
        paths::DEPLOY_BLUE_GREENS,
        &state.config.kubeapi_host,
        state.config.kubeapi_port,
    );
    match put_json(state.backend.as_ref(), &path, &blue_green, signed_in.token()).await {
        Ok(_) => {
            info!(
                image = %blue_green.image_information,
                namespace = %blue_green.namespace,
                "blue green deployment selected"
            );
            messages.add_success(format!(
                "Create blue green deployment {} success",
                blue_green.image_information
            ));
        }
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => messages.add_danger(err.to_string()),
    }

    Ok(redirect_with_messages(
        &state,
        &signed_in,
        messages,
        DEPLOY_LIST_PATH,
    ))
}
