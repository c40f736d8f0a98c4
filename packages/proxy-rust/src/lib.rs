//! Ferry proxy — the RPC front end of a message-broker proxy.
//!
//! Accepts inbound calls, classifies each by operation category, and runs
//! it on a dedicated bounded worker pool so a burst in one category (say,
//! sends) cannot starve another (say, heartbeats). Saturated pools fail
//! fast with a typed "flow limit" response instead of blocking the caller
//! or dropping the connection.

pub mod rpc;

pub use rpc::{
    CallContext, CallMetadata, MessagingActivity, MessagingApplication, PoolConfig, ProxyError,
    RpcConfig, Status, StatusCode, StreamSink, TelemetryHandler, TelemetryStream, UnarySink,
};
