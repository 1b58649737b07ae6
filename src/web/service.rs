use std::{collections::BTreeMap, sync::Arc};

use axum::{extract::Query, response::Response, Extension, Form};
use itertools::Itertools;
use serde::Deserialize;

use super::{
    forms::{is_dns_952_label, DNS_952_MESSAGE},
    response::{redirect_with_messages, render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState, SERVICE_LIST_PATH,
};
use crate::{
    backend::{get_json, paths, post_json, GatewayError},
    records::{Service, ServicePort},
    session::GuiMessages,
};

fn services_path(state: &AppState, signed_in: &SignedIn) -> String {
    paths::services_in(
        &signed_in.session.namespace,
        &state.config.kubeapi_host,
        state.config.kubeapi_port,
    )
}

pub async fn handle_list(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    let path = services_path(&state, &signed_in);
    let fetched: Result<Vec<Service>, GatewayError> =
        get_json(state.backend.as_ref(), &path, signed_in.token()).await;
    let services = match fetched {
        Ok(services) => Some(
            services
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
        &state.templates.service_list,
        liquid::object!({ "serviceSlice": services }),
        messages,
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceQuery {
    #[serde(default)]
    service: String,
}

pub async fn handle_edit_page(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ServiceQuery>,
) -> Result<Response, GuiError> {
    let globals = if query.service.is_empty() {
        liquid::object!({
            "actionButtonValue": "Create",
            "pageHeader": "Create Service",
            "serviceName": ""
        })
    } else {
        liquid::object!({
            "actionButtonValue": "Update",
            "pageHeader": "Update Service",
            "serviceName": query.service
        })
    };

    render_page(
        &state,
        &signed_in,
        &state.templates.service_edit,
        globals,
        GuiMessages::new(),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceForm {
    name: String,
    selector_name: String,
    protocol: String,
    port: String,
    target_port: String,
    node_port: String,
    session_affinity: String,
}

impl ServiceForm {
    /// The selector name doubles as the label and port name.
    fn into_service(self, namespace: &str) -> Service {
        let mut selector = BTreeMap::new();
        selector.insert("name".to_string(), self.selector_name.clone());
        Service {
            name: self.name,
            namespace: namespace.to_string(),
            port_slice: vec![ServicePort {
                name: self.selector_name,
                protocol: self.protocol,
                port: self.port,
                target_port: self.target_port,
                node_port: self.node_port,
            }],
            label_map: selector.clone(),
            selector,
            cluster_ip: String::new(),
            session_affinity: self.session_affinity,
            resource_version: String::new(),
        }
    }
}

pub async fn handle_edit(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<ServiceForm>,
) -> Result<Response, GuiError> {
    let mut messages = GuiMessages::new();

    if !is_dns_952_label(&form.name) {
        messages.add_danger(DNS_952_MESSAGE);
        return Ok(redirect_with_messages(
            &state,
            &signed_in,
            messages,
            SERVICE_LIST_PATH,
        ));
    }

    let service = form.into_service(&signed_in.session.namespace);
    let path = services_path(&state, &signed_in);
    match post_json(state.backend.as_ref(), &path, &service, signed_in.token()).await {
        Ok(_) => {
            info!(name = %service.name, namespace = %service.namespace, "service edited");
            messages.add_success(format!("Service {} is edited", service.name));
        }
        Err(GatewayError::Unauthorized) => return Ok(sign_out(&state, &signed_in)),
        Err(err) => messages.add_danger(err.to_string()),
    }

    Ok(redirect_with_messages(
        &state,
        &signed_in,
        messages,
        SERVICE_LIST_PATH,
    ))
}
