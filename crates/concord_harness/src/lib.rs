//! Concord test harness.
//!
//! Fabricated session catalogs, a deny-list permission stub, and a scripted
//! navigation double that runs nested dialogs to completion. Integration
//! tests construct everything through here instead of hand-rolling graphs.

mod catalog;
mod navigation;
mod permissions;

pub use catalog::{seed_engineering_model, seed_site_directory, SeededModel, SeededSite};
pub use navigation::{NavigationRecord, NestedScript, ScriptedNavigation};
pub use permissions::StubPermissions;

use tracing_subscriber::EnvFilter;

/// Install an env-filtered subscriber for test runs. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
