//! The command seam between the store and its context

use async_trait::async_trait;
use serde::Serialize;

/// A store command: the struct's fields are its parameters.
///
/// Commands do all the work; the context only provides access.
#[async_trait]
pub trait Execute<C, E>: Send + Sync {
    type Output: Serialize + Send;

    /// Canonical op string, e.g. "reorder lists"
    fn op(&self) -> &'static str;

    /// Read-only commands are not recorded as activity
    fn is_mutation(&self) -> bool {
        true
    }

    async fn execute(&self, ctx: &C) -> Result<Self::Output, E>;
}
