use std::{net::TcpListener, sync::Arc};

use cluster_gui::{
    backend::{paths, FixtureBackend},
    config::GuiConfig,
    logging::init_logging,
    web::{build_router, AppState},
};
use reqwest::{header, redirect, Client};
use serde_json::{json, Value};

/// `?debug` attaches the tracing-forest tree of the request.  This lives in
/// its own test binary because `init_logging` installs a global subscriber.
#[tokio::test(flavor = "multi_thread")]
async fn debug_dashboard_data_carries_logs() {
    init_logging();

    let backend = FixtureBackend::new()
        .with_json(
            paths::DEPLOYS,
            json!([{ "Namespace": "prod", "ImageInformationName": "web", "CurrentVersion": "v1" }]),
        )
        .with_json(paths::DEPLOY_CLUSTER_APPLICATIONS, json!([]));
    let state = Arc::new(AppState::new(Box::new(backend), GuiConfig::default()));
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });

    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap();
    let res = client
        .post(format!("{}/gui/login", base))
        .form(&[("username", "admin"), ("password", "secret"), ("timeZoneOffset", "0")])
        .send()
        .await
        .unwrap();
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let plain: Value = serde_json::from_str(
        &client
            .get(format!("{}/gui/dashboard/deploy/data", base))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap(),
    )
    .unwrap();
    assert!(plain.get("logs").is_none());

    let debug: Value = serde_json::from_str(
        &client
            .get(format!("{}/gui/dashboard/deploy/data?debug", base))
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(debug["applicationViewLeafAmount"], json!(1));
    assert_eq!(debug["logs"]["name"], json!("logged_span"));
    assert!(debug["logs"]["nodes"].as_array().unwrap().len() >= 2);
}
