//! Command port — outbound service calls to the remote store.

use std::future::Future;

use deckhand_domain::error::RemoteCommandError;
use deckhand_domain::service::ServiceCall;

/// Delivers service calls to the remote store.
///
/// Calls are fire-and-forget from the dispatcher's perspective: the session
/// spawns the future and logs failures without blocking further input.
pub trait CommandSink {
    /// Deliver one service call.
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), RemoteCommandError>> + Send;
}

impl<T: CommandSink + Send + Sync> CommandSink for std::sync::Arc<T> {
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), RemoteCommandError>> + Send {
        (**self).call_service(call)
    }
}
