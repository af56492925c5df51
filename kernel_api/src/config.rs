//! Dispatcher configuration

/// Capacity configuration for the dispatcher
///
/// All capacities are fixed at construction and never resized. They bound
/// memory up front, the way a build-time configuration header would on a
/// constrained target.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Highest signal number the allocator will hand out; also the width
    /// of every process's subscription set
    pub max_signals: usize,
    /// Number of pending entries the signal queue can hold
    pub signal_queue_capacity: usize,
    /// Number of slots in the listen-port table
    pub listen_port_slots: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_signals: 32,
            signal_queue_capacity: 32,
            listen_port_slots: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.max_signals, 32);
        assert_eq!(config.signal_queue_capacity, 32);
        assert_eq!(config.listen_port_slots, 10);
    }
}
