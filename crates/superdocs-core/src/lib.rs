mod prompts;
pub mod services;
pub mod session;
pub mod shared;

pub use services::anthropic::{AnthropicClient, CompletionClient, ModelConfig};
#[cfg(not(target_arch = "wasm32"))]
pub use services::diff::ChangeApplier;
pub use services::diff::{
    apply_change, get_fixed_search_replace, Change, EditFormat, FileSet, ReconcileConfig,
    ReconcileError, Reconciler, Reconciliation, Snippet,
};
pub use session::{EditRequest, EditSession, InstructionResult};
pub use shared::{Plan, StreamMessage};
