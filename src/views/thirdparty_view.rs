use super::tree::{build_tree, BuiltView, LeafCounting, TreeShape};
use crate::records::DeployClusterApplication;

pub const THIRDPARTY_VIEW_ROOT: &str = "3rd party View";

/// application -> "namespace (size)" -> replication controller names
pub struct ThirdpartyView;

impl TreeShape for ThirdpartyView {
    type Record = DeployClusterApplication;

    fn root_name(&self) -> &str {
        THIRDPARTY_VIEW_ROOT
    }

    fn sort_key(&self, record: &DeployClusterApplication) -> String {
        format!("{}_{}", record.name, record.namespace)
    }

    fn group_key<'r>(&self, record: &'r DeployClusterApplication) -> &'r str {
        &record.name
    }

    fn branch_label(&self, record: &DeployClusterApplication) -> String {
        format!("{} ({})", record.namespace, record.size)
    }

    fn leaf_labels(&self, record: &DeployClusterApplication) -> Vec<String> {
        record.replication_controller_name_slice.clone()
    }

    fn leaf_counting(&self) -> LeafCounting {
        LeafCounting::PerLeaf
    }
}

pub fn build_thirdparty_view(applications: &[DeployClusterApplication]) -> BuiltView {
    build_tree(&ThirdpartyView, applications)
}
