//! `actions` crate — the `Action` trait, the shared `TaskContext`, and test doubles.
//!
//! Every unit of work a task performs implements [`Action`]. The engine crate
//! dispatches execution through this trait object and never inspects what an
//! action actually does.

pub mod context;
pub mod error;
pub mod traits;
pub mod mock;

pub use context::TaskContext;
pub use error::ActionError;
pub use traits::{from_fn, Action, FnAction};
