//! Records as the backend serializes them.  The backend uses PascalCase keys
//! and omits empty fields, so everything has a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One deployed image-group version in one namespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeployInformation {
    pub namespace: String,
    pub image_information_name: String,
    pub current_version: String,
    pub current_version_description: String,
    pub description: String,
    pub replica_amount: i64,
}

/// A launched third-party (cluster) application and the replication
/// controllers backing it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeployClusterApplication {
    pub name: String,
    pub namespace: String,
    pub size: i64,
    pub service_name: String,
    pub replication_controller_name_slice: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ThirdPartyApplication {
    pub name: String,
    pub description: String,
}

/// Full definition of a third-party application template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Cluster {
    pub name: String,
    pub description: String,
    pub replication_controller_json: String,
    pub service_json: String,
    pub environment: BTreeMap<String, String>,
    pub script_type: String,
    pub script_content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ReplicationControllerNotifier {
    pub check: bool,
    /// Nanoseconds.
    pub cool_down_duration: i64,
    /// Nanoseconds.
    pub remaining_cool_down: i64,
    pub kubeapi_host: String,
    pub kubeapi_port: u16,
    pub namespace: String,
    pub kind: String,
    pub name: String,
    pub notifier_slice: Vec<Notifier>,
    pub indicator_slice: Vec<Indicator>,
}

/// `data` is itself JSON whose shape depends on `kind` (email or SMS).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Notifier {
    pub kind: String,
    pub data: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Indicator {
    #[serde(rename = "Type")]
    pub indicator_type: String,
    pub above_all_or_one: bool,
    pub above_percentage_of_data: f64,
    pub above_threshold: i64,
    pub below_all_or_one: bool,
    pub below_percentage_of_data: f64,
    pub below_threshold: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EmailServerSmtp {
    pub name: String,
    pub account: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServicePort {
    pub name: String,
    pub protocol: String,
    pub port: String,
    pub target_port: String,
    pub node_port: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Service {
    pub name: String,
    pub namespace: String,
    pub port_slice: Vec<ServicePort>,
    pub selector: BTreeMap<String, String>,
    #[serde(rename = "ClusterIP")]
    pub cluster_ip: String,
    pub label_map: BTreeMap<String, String>,
    pub session_affinity: String,
    pub resource_version: String,
}

/// Blue-green routing for one image: which namespace's deployment the
/// public node port points at.  A node port of 0 lets the cluster pick one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeployBlueGreen {
    pub image_information: String,
    pub namespace: String,
    pub node_port: i32,
    pub description: String,
    pub session_affinity: String,
}

/// Sign-in request and reply.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TokenData {
    pub token: String,
}
