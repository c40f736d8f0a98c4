//! Admission control and dispatch for the proxy's RPC front end.
//!
//! The pipeline, leaf-first:
//!
//! 1. **Context** (`context`): explicit metadata handle -> immutable
//!    per-call [`CallContext`]
//! 2. **Status** (`status`): total translation of failures into the typed
//!    [`Status`] every envelope carries
//! 3. **Bulkheads** (`bulkhead`): five independent bounded pools, one per
//!    [`OperationCategory`], reject-on-full
//! 4. **Tasks** (`task`): operation body paired with its rejection path
//! 5. **Delivery** (`delivery`): one terminal write per unary call
//! 6. **Telemetry** (`telemetry`): the bidirectional stream, multiplexed
//!    onto the client-lifecycle pool
//! 7. **Facade** (`application`): composition root and public surface

pub mod activity;
pub mod application;
pub mod bulkhead;
pub mod config;
pub mod context;
pub mod delivery;
pub mod messages;
pub mod operation;
pub mod sink;
pub mod status;
pub mod task;
pub mod telemetry;

// Re-export key types for convenient access.
pub use activity::{MessagingActivity, TelemetryHandler};
pub use application::MessagingApplication;
pub use bulkhead::BulkheadPool;
pub use config::{PoolConfig, RpcConfig};
pub use context::{CallContext, CallMetadata};
pub use operation::{OperationCategory, RpcKind};
pub use sink::{StreamSink, UnarySink};
pub use status::{ProxyError, Status, StatusCode};
pub use task::RpcTask;
pub use telemetry::TelemetryStream;
