use super::tree::{build_tree, BuiltView, LeafCounting, TreeShape};
use crate::records::DeployInformation;

pub const APPLICATION_VIEW_ROOT: &str = "App View";

/// image group -> "namespace (replicas)" -> "version description"
pub struct ApplicationView;

impl TreeShape for ApplicationView {
    type Record = DeployInformation;

    fn root_name(&self) -> &str {
        APPLICATION_VIEW_ROOT
    }

    fn sort_key(&self, record: &DeployInformation) -> String {
        format!(
            "{}_{}_{}",
            record.image_information_name, record.namespace, record.current_version
        )
    }

    fn group_key<'r>(&self, record: &'r DeployInformation) -> &'r str {
        &record.image_information_name
    }

    fn branch_label(&self, record: &DeployInformation) -> String {
        format!("{} ({})", record.namespace, record.replica_amount)
    }

    fn leaf_labels(&self, record: &DeployInformation) -> Vec<String> {
        vec![format!(
            "{} {}",
            record.current_version, record.current_version_description
        )]
    }

    fn leaf_counting(&self) -> LeafCounting {
        LeafCounting::PerGroup
    }
}

pub fn build_application_view(deploys: &[DeployInformation]) -> BuiltView {
    build_tree(&ApplicationView, deploys)
}
