//! Pool sizing configuration for the RPC front end.

/// Sizing for a single bulkhead pool: fixed worker count and bounded
/// queue capacity. Both are treated as given parameters; there is no
/// adaptive sizing.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of worker tasks draining the pool's queue.
    pub workers: usize,
    /// Bounded queue capacity. Submissions beyond this are rejected.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 16,
            queue_capacity: 500,
        }
    }
}

/// Per-category pool sizing for the five bulkhead pools.
///
/// Read once at facade construction; pool configuration is immutable for
/// the process lifetime.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Route and assignment queries.
    pub route: PoolConfig,
    /// Message sends and dead-letter forwards.
    pub produce: PoolConfig,
    /// Receives, acks, and invisible-duration changes.
    pub consume: PoolConfig,
    /// Heartbeats, client termination, and the telemetry stream.
    pub client_lifecycle: PoolConfig,
    /// Transaction resolution.
    pub transaction: PoolConfig,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            route: PoolConfig::default(),
            produce: PoolConfig {
                workers: 64,
                queue_capacity: 10_000,
            },
            consume: PoolConfig {
                workers: 64,
                queue_capacity: 10_000,
            },
            client_lifecycle: PoolConfig::default(),
            transaction: PoolConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.workers, 16);
        assert_eq!(config.queue_capacity, 500);
    }

    #[test]
    fn rpc_config_defaults() {
        let config = RpcConfig::default();
        assert_eq!(config.route.workers, 16);
        assert_eq!(config.produce.workers, 64);
        assert_eq!(config.produce.queue_capacity, 10_000);
        assert_eq!(config.consume.workers, 64);
        assert_eq!(config.client_lifecycle.queue_capacity, 500);
        assert_eq!(config.transaction.workers, 16);
    }
}
