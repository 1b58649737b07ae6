//! The browser-facing tier: one axum router, one shared `AppState`, and a
//! handler module per menu section.

use std::{sync::Arc, time::Duration};

use axum::{
    response::Response,
    routing::{delete, get},
    Extension, Router,
};

use crate::{
    backend::BackendGateway, config::GuiConfig, session::SessionStore,
    templating::builder::GuiTemplates,
};

mod dashboard;
mod deploy;
mod deploybluegreen;
mod forms;
mod identity;
mod notification;
mod response;
mod service;
mod signed_in;
mod thirdparty;

pub use forms::{is_dns_952_label, DNS_952_MESSAGE};
pub use response::GuiError;
pub use signed_in::SignedIn;

pub const LOGIN_PATH: &str = "/gui/login";
pub const DASHBOARD_PATH: &str = "/gui/dashboard/deploy/";
pub const DEPLOY_LIST_PATH: &str = "/gui/deploy/deploy/";
pub const THIRDPARTY_LIST_PATH: &str = "/gui/repository/thirdparty/";
pub const SERVICE_LIST_PATH: &str = "/gui/inventory/service/";

pub struct AppState {
    pub backend: Box<dyn BackendGateway + Send + Sync>,
    pub templates: GuiTemplates,
    pub sessions: SessionStore,
    pub config: GuiConfig,
}

impl AppState {
    pub fn new(backend: Box<dyn BackendGateway + Send + Sync>, config: GuiConfig) -> AppState {
        AppState {
            backend,
            templates: GuiTemplates::build(),
            sessions: SessionStore::with_idle_ttl(Duration::from_secs(config.session_idle_secs)),
            config,
        }
    }
}

async fn handle_root() -> Response {
    response::to_dashboard()
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route(
            LOGIN_PATH,
            get(identity::handle_login_page).post(identity::handle_login),
        )
        .route("/gui/logout", get(identity::handle_logout))
        .route(DASHBOARD_PATH, get(dashboard::handle_dashboard_page))
        .route("/gui/dashboard/deploy/data", get(dashboard::handle_dashboard_data))
        .route(DEPLOY_LIST_PATH, get(deploy::handle_deploy_list))
        .route(
            "/gui/deploy/deploybluegreen/select",
            get(deploybluegreen::handle_select_page).post(deploybluegreen::handle_select),
        )
        .route(THIRDPARTY_LIST_PATH, get(thirdparty::handle_list))
        .route(
            "/gui/repository/thirdparty/edit",
            get(thirdparty::handle_edit_page).post(thirdparty::handle_edit),
        )
        .route("/gui/repository/thirdparty/delete", get(thirdparty::handle_delete))
        .route("/gui/notification/notifier/", get(notification::handle_notifier_list))
        .route(
            "/gui/system/notification/emailserver/",
            get(notification::handle_email_server_list),
        )
        .route(
            "/gui/system/notification/emailserver/delete",
            delete(notification::handle_email_server_delete),
        )
        .route(SERVICE_LIST_PATH, get(service::handle_list))
        .route(
            "/gui/inventory/service/edit",
            get(service::handle_edit_page).post(service::handle_edit),
        )
        .layer(Extension(state))
}
