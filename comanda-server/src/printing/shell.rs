//! Dispatch isolation
//!
//! Each dispatch cycle runs behind a panic boundary so one bad event can
//! never stop the worker loop.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

/// Order id used in logs when the payload had none
pub const UNKNOWN_ORDER: &str = "unknown";

/// Run one dispatch cycle, catching panics
///
/// Returns `false` when the cycle panicked. The panic is logged with the
/// order id and swallowed.
pub async fn isolate<F>(order_id: Option<&str>, cycle: F) -> bool
where
    F: Future<Output = ()>,
{
    match AssertUnwindSafe(cycle).catch_unwind().await {
        Ok(()) => true,
        Err(payload) => {
            tracing::error!(
                order_id = order_id.unwrap_or(UNKNOWN_ORDER),
                panic = %panic_message(payload.as_ref()),
                "Dispatch cycle panicked, event dropped"
            );
            false
        }
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
