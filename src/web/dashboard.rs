use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::Query,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_macros::debug_handler;
use serde_json::Value;
use tracing::Instrument;

use super::{
    response::{render_page, sign_out, GuiError},
    signed_in::SignedIn,
    AppState,
};
use crate::{
    logging::{logging_initialized, LoggedSpan},
    session::GuiMessages,
    views::load_dashboard_data,
};

/// Split a `Host` header into host and port, falling back to the scheme's
/// default port.
fn split_host(host: &str, protocol: &str) -> (String, String) {
    let default_port = if protocol == "https" { "443" } else { "80" };
    let split = if host.starts_with('[') {
        host.rfind("]:").map(|i| (&host[..=i], &host[i + 2..]))
    } else {
        host.rsplit_once(':')
    };
    match split {
        Some((name, port)) if !port.is_empty() => (name.to_string(), port.to_string()),
        _ => (host.to_string(), default_port.to_string()),
    }
}

/// A JSON string literal that is also safe inside an inline `<script>`.
fn script_string(s: &str) -> String {
    Value::String(s.to_string())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

pub async fn handle_dashboard_page(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, GuiError> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let protocol = state.config.gui_protocol.as_str();
    let (gui_host, gui_port) = split_host(host, protocol);
    let data_url = script_string(&format!(
        "{}://{}:{}/gui/dashboard/deploy/data",
        protocol, gui_host, gui_port
    ));

    render_page(
        &state,
        &signed_in,
        &state.templates.dashboard_deploy,
        liquid::object!({
            "guiProtocol": protocol,
            "guiHost": gui_host,
            "guiPort": gui_port,
            "dashboardDataUrl": data_url
        }),
        GuiMessages::new(),
    )
}

#[debug_handler]
pub async fn handle_dashboard_data(
    signed_in: SignedIn,
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, GuiError> {
    let logged_span = if params.contains_key("debug") && logging_initialized() {
        Some(LoggedSpan::new_logged_span("dashboard_data"))
    } else {
        None
    };

    let backend = state.backend.as_ref();
    let loaded = match &logged_span {
        Some(lspan) => {
            load_dashboard_data(backend, signed_in.token())
                .instrument(lspan.span.clone())
                .await
        }
        None => load_dashboard_data(backend, signed_in.token()).await,
    };

    // Other failures already come back as `DashboardData::error`.
    let data = match loaded {
        Ok(data) => data,
        Err(_) => return Ok(sign_out(&state, &signed_in)),
    };

    let mut body = serde_json::to_value(&data)?;
    if let Some(lspan) = logged_span {
        let logs = lspan.retrieve_serde_json().await;
        if let Value::Object(map) = &mut body {
            map.insert("logs".to_string(), logs);
        }
    }

    Ok(Json(body).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_header_splitting() {
        assert_eq!(
            split_host("gui.example.com:8443", "https"),
            ("gui.example.com".to_string(), "8443".to_string())
        );
        assert_eq!(
            split_host("gui.example.com", "https"),
            ("gui.example.com".to_string(), "443".to_string())
        );
        assert_eq!(
            split_host("gui.example.com", "http"),
            ("gui.example.com".to_string(), "80".to_string())
        );
        assert_eq!(
            split_host("[::1]:8080", "http"),
            ("[::1]".to_string(), "8080".to_string())
        );
    }

    #[test]
    fn script_strings_cannot_close_the_script() {
        assert_eq!(script_string("http://gui:80/data"), "\"http://gui:80/data\"");
        let hostile = script_string("x\"</script><script>alert(1)//");
        assert!(!hostile.contains("</script>"));
        assert_eq!(hostile, "\"x\\\"\\u003c/script\\u003e\\u003cscript\\u003ealert(1)//\"");
    }
}
