use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::Query, response::Response, Extension, Form};
use axum_macros::debug_handler;
use itertools::Itertools;
use serde::Deserialize;

use super::{
    forms::{is_dns_952_label, json_or_empty_object, DNS_952_MESSAGE},
    response::{redirect_with_messages, render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState, THIRDPARTY_LIST_PATH,
};
use crate::{
    backend::{delete, get_json, paths, post_json, GatewayError},
    records::{Cluster, ThirdPartyApplication},
    session::GuiMessages,
};

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterForm {
    name: String,
    description: String,
    replication_controller_json: String,
    service_json: String,
    environment: String,
    script_type: String,
    script_content: String,
}

pub async fn handle_list(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let fetched: Result<Vec<ThirdPartyApplication>, GatewayError> = get_json(
        state.backend.as_ref(),
        paths::CLUSTER_APPLICATIONS,
        signed_in.token(),
    )
    .await;
    let applications = match fetched {
        Ok(applications) => Some(
            applications
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
        &state.templates.thirdparty_list,
        liquid::object!({ "thirdPartyApplicationSlice": applications }),
        messages,
    )
}

/// Environment maps are edited as indented JSON text.
fn environment_text(environment: &BTreeMap<String, String>) -> Result<String, GuiError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(environment, &mut serializer)?;
    String::from_utf8(out).map_err(|err| GuiError::Serialize(err.to_string()))
}

pub async fn handle_edit_page(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Response, GuiError> {
    if query.name.is_empty() {
        return render_page(
            &state,
            &signed_in,
            &state.templates.thirdparty_edit,
            liquid::object!({
                "actionButtonValue": "Create",
                "pageHeader": "Create third party service",
                "name": "",
                "description": "",
                "replicationControllerJson": "",
                "serviceJson": "",
                "environment": "",
                "scriptType": "none",
                "scriptContent": ""
            }),
            GuiMessages::new(),
        );
    }

    let fetched: Result<Cluster, GatewayError> = get_json(
        state.backend.as_ref(),
        &paths::item(paths::CLUSTER_APPLICATIONS, &query.name),
        signed_in.token(),
    )
    .await;
    let cluster = match fetched {
        Ok(cluster) => cluster,
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => {
            let mut messages = GuiMessages::new();
            messages.add_danger(format!("Fail to get with error {}", err));
            return Ok(redirect_with_messages(
                &state,
                &signed_in,
                messages,
                THIRDPARTY_LIST_PATH,
            ));
        }
    };

    let environment = environment_text(&cluster.environment)?;
    render_page(
        &state,
        &signed_in,
        &state.templates.thirdparty_edit,
        liquid::object!({
            "actionButtonValue": "Update",
            "pageHeader": "Update third party service",
            "name": cluster.name,
            "description": cluster.description,
            "replicationControllerJson": cluster.replication_controller_json,
            "serviceJson": cluster.service_json,
            "environment": environment,
            "scriptType": cluster.script_type,
            "scriptContent": cluster.script_content
        }),
        GuiMessages::new(),
    )
}

#[debug_handler]
pub async fn handle_edit(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<ClusterForm>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    if !is_dns_952_label(&form.name) {
        messages.add_danger(DNS_952_MESSAGE);
        return Ok(redirect_with_messages(
            &state,
            &signed_in,
            messages,
            THIRDPARTY_LIST_PATH,
        ));
    }

    let environment_json = json_or_empty_object(&form.environment);
    let environment: BTreeMap<String, String> = match serde_json::from_str(&environment_json) {
        Ok(environment) => environment,
        Err(err) => {
            messages.add_danger(err.to_string());
            return Ok(redirect_with_messages(
                &state,
                &signed_in,
                messages,
                THIRDPARTY_LIST_PATH,
            ));
        }
    };

    let cluster = Cluster {
        name: form.name,
        description: form.description,
        replication_controller_json: json_or_empty_object(&form.replication_controller_json),
        service_json: json_or_empty_object(&form.service_json),
        environment,
        script_type: form.script_type,
        script_content: form.script_content,
    };

    let posted = post_json(
        state.backend.as_ref(),
        paths::CLUSTER_APPLICATIONS,
        &cluster,
        signed_in.token(),
    )
    .await;
    match posted {
        Ok(_) => {
            info!(name = %cluster.name, "third party application edited");
            messages.add_success(format!("Third party application {} is edited", cluster.name));
        }
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => messages.add_danger(err.to_string()),
    }

    Ok(redirect_with_messages(
        &state,
        &signed_in,
        messages,
        THIRDPARTY_LIST_PATH,
    ))
}

pub async fn handle_delete(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let deleted = delete(
        state.backend.as_ref(),
        &paths::item(paths::CLUSTER_APPLICATIONS, &query.name),
        signed_in.token(),
    )
    .await;
    match deleted {
        Ok(_) => {
            info!(name = %query.name, "third party application deleted");
            messages.add_success(format!("Third party application {} is deleted", query.name));
        }
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => messages.add_danger(err.to_string()),
    }

    Ok(redirect_with_messages(
        &state,
        &signed_in,
        messages,
        THIRDPARTY_LIST_PATH,
    ))
}
