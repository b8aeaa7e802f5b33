pub mod apply;
pub mod config;
pub mod filename;
pub mod hunks;
pub mod markdown;
pub mod matcher;
pub mod reconcile;
pub mod similarity;
pub mod strategies;
pub mod types;

pub use apply::{apply_change, ApplyError};
#[cfg(not(target_arch = "wasm32"))]
pub use apply::ChangeApplier;
pub use config::{EditFormat, MatchConfig, ReconcileConfig};
pub use reconcile::{get_fixed_search_replace, Reconciler};
pub use types::{Change, FileSet, FileSnapshot, ReconcileError, Reconciliation, Snippet};
