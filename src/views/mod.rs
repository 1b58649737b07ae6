//! View-models built from backend records: the dashboard trees.

mod application_view;
mod dashboard;
mod thirdparty_view;
mod tree;

pub use application_view::{build_application_view, ApplicationView, APPLICATION_VIEW_ROOT};
pub use dashboard::{load_dashboard_data, DashboardData};
pub use thirdparty_view::{build_thirdparty_view, ThirdpartyView, THIRDPARTY_VIEW_ROOT};
pub use tree::{build_tree, BuiltView, LeafCounting, TreeNode, TreeShape};
