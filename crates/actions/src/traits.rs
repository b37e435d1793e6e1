//! The `Action` trait — the contract every piece of task work must fulfil.

use async_trait::async_trait;

use crate::{ActionError, TaskContext};

/// A single executable step of a task.
///
/// Actions may suspend internally; the engine awaits each one to completion
/// before it moves on, so no two actions ever observe the context at the same
/// time.
#[async_trait]
pub trait Action: Send + Sync {
    async fn execute(&self, ctx: &mut TaskContext) -> Result<(), ActionError>;
}

/// Adapter turning a synchronous closure into an [`Action`].
pub struct FnAction<F>(F);

/// Wrap a synchronous closure as an [`Action`].
pub fn from_fn<F>(f: F) -> FnAction<F>
where
    F: Fn(&mut TaskContext) -> Result<(), ActionError> + Send + Sync,
{
    FnAction(f)
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(&mut TaskContext) -> Result<(), ActionError> + Send + Sync,
{
    async fn execute(&self, ctx: &mut TaskContext) -> Result<(), ActionError> {
        (self.0)(ctx)
    }
}
