//! Trait definition for dispatch variants.

use async_trait::async_trait;

use super::types::RunSummary;
use super::DispatchError;

/// One pass over one configured source directory: discovery, fan-out,
/// sentinel consumption. Invoked repeatedly by an external scheduler;
/// there is no internal polling loop.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Returns the name of this dispatcher variant.
    fn name(&self) -> &str;

    /// Run one pass. An error aborts this entry only; the pass is
    /// retried from scratch on the next invocation.
    async fn run(&self) -> Result<RunSummary, DispatchError>;
}
