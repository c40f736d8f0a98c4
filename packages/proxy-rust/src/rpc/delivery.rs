//! Terminal response delivery for unary calls.

use tracing::debug;

use super::sink::UnarySink;
use super::status::{ProxyError, Status};

/// Writes the single terminal response for a unary call.
///
/// A failed operation is translated into the call's response envelope via
/// `envelope(Status::from_error(..))`; a successful one is written as-is.
/// The transport-level call always completes — failure is communicated
/// only through the status field. Runs on whichever task resolved the
/// operation future; the sink is safe to write from any thread, and a
/// write that cannot land (receiver gone, duplicate) is logged inside the
/// sink and swallowed so the worker survives.
pub fn deliver<T>(
    result: Result<T, ProxyError>,
    sink: &UnarySink<T>,
    envelope: impl FnOnce(Status) -> T,
) {
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            debug!(error = %error, "operation failed, answering with status envelope");
            envelope(Status::from_error(&error))
        }
    };
    sink.write(response);
}
