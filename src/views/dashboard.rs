use serde::Serialize;

use super::{
    application_view::build_application_view, thirdparty_view::build_thirdparty_view, TreeNode,
};
use crate::{
    backend::{get_json, paths, BackendGateway, GatewayError, Result},
    records::{DeployClusterApplication, DeployInformation},
};

/// JSON payload of the deploy dashboard's data endpoint.
///
/// On success each view array holds exactly one root node.  On failure both
/// arrays are empty, `error` is set and the leaf amounts are left out.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub application_view: Vec<TreeNode>,
    pub thirdparty_view: Vec<TreeNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_view_leaf_amount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thirdparty_view_leaf_amount: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DashboardData {
    pub fn from_records(
        deploys: &[DeployInformation],
        applications: &[DeployClusterApplication],
    ) -> DashboardData {
        let application = build_application_view(deploys);
        let thirdparty = build_thirdparty_view(applications);
        DashboardData {
            application_view: vec![application.root],
            thirdparty_view: vec![thirdparty.root],
            application_view_leaf_amount: Some(application.leaf_amount),
            thirdparty_view_leaf_amount: Some(thirdparty.leaf_amount),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> DashboardData {
        DashboardData {
            error: Some(message.into()),
            ..DashboardData::default()
        }
    }
}

/// Fetch deployments, then cluster applications, and build both views.
///
/// Both fetches have to succeed before any tree gets built.  The only error
/// returned is `Unauthorized`, which the caller turns into a trip to the login
/// page; everything else ends up in `DashboardData::error`.
pub async fn load_dashboard_data(
    backend: &(dyn BackendGateway + Send + Sync),
    token: Option<&str>,
) -> Result<DashboardData> {
    match fetch_dashboard_records(backend, token).await {
        Ok((deploys, applications)) => {
            let data = DashboardData::from_records(&deploys, &applications);
            info!(
                application_leaves = ?data.application_view_leaf_amount,
                thirdparty_leaves = ?data.thirdparty_view_leaf_amount,
                "built dashboard views"
            );
            Ok(data)
        }
        Err(GatewayError::Unauthorized) => Err(GatewayError::Unauthorized),
        Err(err) => {
            warn!(backend = backend.kind(), error = %err, "dashboard fetch failed");
            Ok(DashboardData::failed(err.to_string()))
        }
    }
}

async fn fetch_dashboard_records(
    backend: &(dyn BackendGateway + Send + Sync),
    token: Option<&str>,
) -> Result<(Vec<DeployInformation>, Vec<DeployClusterApplication>)> {
    let deploys: Vec<DeployInformation> = get_json(backend, paths::DEPLOYS, token).await?;
    debug!(count = deploys.len(), "fetched deploys");

    let applications: Vec<DeployClusterApplication> =
        get_json(backend, paths::DEPLOY_CLUSTER_APPLICATIONS, token).await?;
    debug!(count = applications.len(), "fetched cluster applications");

    Ok((deploys, applications))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ErrorLayer, FixtureBackend, Method};
    use serde_json::json;

    fn deploys_json() -> serde_json::Value {
        json!([
            { "Namespace": "prod", "ImageInformationName": "web", "CurrentVersion": "v2", "ReplicaAmount": 3 },
            { "Namespace": "dev", "ImageInformationName": "web", "CurrentVersion": "v1", "ReplicaAmount": 1 },
            { "Namespace": "prod", "ImageInformationName": "api", "CurrentVersion": "v1", "ReplicaAmount": 2 }
        ])
    }

    fn applications_json() -> serde_json::Value {
        json!([
            { "Name": "redis", "Namespace": "prod", "Size": 2,
              "ReplicationControllerNameSlice": ["redis-master", "redis-slave"] }
        ])
    }

    #[tokio::test]
    async fn builds_both_views() {
        let backend = FixtureBackend::new()
            .with_json(paths::DEPLOYS, deploys_json())
            .with_json(paths::DEPLOY_CLUSTER_APPLICATIONS, applications_json());

        let data = load_dashboard_data(&backend, Some("tok")).await.unwrap();
        insta::assert_json_snapshot!(data, @r###"
        {
          "applicationView": [
            {
              "name": "App View",
              "children": [
                {
                  "name": "api",
                  "children": [
                    {
                      "name": "prod (2)",
                      "children": [
                        {
                          "name": "v1 ",
                          "children": []
                        }
                      ]
                    }
                  ]
                },
                {
                  "name": "web",
                  "children": [
                    {
                      "name": "dev (1)",
                      "children": [
                        {
                          "name": "v1 ",
                          "children": []
                        }
                      ]
                    },
                    {
                      "name": "prod (3)",
                      "children": [
                        {
                          "name": "v2 ",
                          "children": []
                        }
                      ]
                    }
                  ]
                }
              ]
            }
          ],
          "thirdpartyView": [
            {
              "name": "3rd party View",
              "children": [
                {
                  "name": "redis",
                  "children": [
                    {
                      "name": "prod (2)",
                      "children": [
                        {
                          "name": "redis-master",
                          "children": []
                        },
                        {
                          "name": "redis-slave",
                          "children": []
                        }
                      ]
                    }
                  ]
                }
              ]
            }
          ],
          "applicationViewLeafAmount": 2,
          "thirdpartyViewLeafAmount": 2
        }
        "###);

        let seen = backend.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].path, paths::DEPLOYS);
        assert_eq!(seen[1].path, paths::DEPLOY_CLUSTER_APPLICATIONS);
        assert!(seen.iter().all(|r| r.token.as_deref() == Some("tok")));
    }

    #[tokio::test]
    async fn empty_backend_gives_bare_roots() {
        let backend = FixtureBackend::new()
            .with_json(paths::DEPLOYS, json!([]))
            .with_json(paths::DEPLOY_CLUSTER_APPLICATIONS, json!([]));

        let data = load_dashboard_data(&backend, None).await.unwrap();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "applicationView": [{ "name": "App View", "children": [] }],
                "thirdpartyView": [{ "name": "3rd party View", "children": [] }],
                "applicationViewLeafAmount": 0,
                "thirdpartyViewLeafAmount": 0
            })
        );
    }

    #[tokio::test]
    async fn second_fetch_failing_leaves_no_partial_tree() {
        let backend = FixtureBackend::new()
            .with_json(paths::DEPLOYS, deploys_json())
            .with_failure(
                Method::Get,
                paths::DEPLOY_CLUSTER_APPLICATIONS,
                GatewayError::unavailable(ErrorLayer::TransportLayer, "connection refused"),
            );

        let data = load_dashboard_data(&backend, None).await.unwrap();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "applicationView": [],
                "thirdpartyView": [],
                "error": "connection refused"
            })
        );
    }

    #[tokio::test]
    async fn malformed_records_are_reported() {
        let backend = FixtureBackend::new()
            .with_json(paths::DEPLOYS, json!({ "not": "a list" }))
            .with_json(paths::DEPLOY_CLUSTER_APPLICATIONS, applications_json());

        let data = load_dashboard_data(&backend, None).await.unwrap();
        assert!(data.application_view.is_empty());
        assert!(data.thirdparty_view.is_empty());
        assert!(data.application_view_leaf_amount.is_none());
        assert!(data.error.unwrap().starts_with("Malformed backend response"));
        // The first failure stops us; the second endpoint is never asked.
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn unauthorized_is_passed_up() {
        let backend = FixtureBackend::new()
            .with_token("good")
            .with_json(paths::DEPLOYS, deploys_json());

        let res = load_dashboard_data(&backend, Some("stale")).await;
        assert_eq!(res, Err(GatewayError::Unauthorized));
    }
}
