//! Configuration types for the transport adapter.

use crate::error::{Result, TransportError};

/// Smallest MTU the protocol accepts.
pub const MTU_MIN: u32 = 576;

/// Largest MTU the protocol accepts.
pub const MTU_MAX: u32 = 1400;

/// Recognized consumer-facing options, builder style.
///
/// Everything here is handed through to the engine untouched except the MTU,
/// which must sit inside the protocol range; the engine rejects or clamps the
/// rest on its own.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port the server binds and the client connects to
    pub port: u16,
    /// Address the client connects to
    pub client_address: String,
    /// Listen on both IPv4 and IPv6
    pub dual_mode: bool,
    /// Maximum transmission unit
    pub mtu: u32,
    /// Enable no-delay mode
    pub no_delay: bool,
    /// Internal update interval in milliseconds
    pub interval: u32,
    /// Fast resend threshold (0 disables fast resend)
    pub fast_resend: u32,
    /// Enable congestion window control
    pub congestion_window: bool,
    /// Idle timeout in milliseconds before a connection is dropped
    pub timeout: u32,
    /// Maximum retransmissions before a connection is declared dead
    pub max_retransmits: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 7777,
            client_address: "127.0.0.1".to_string(),
            dual_mode: true,
            mtu: MTU_MAX,
            no_delay: true,
            interval: 10,
            fast_resend: 2,
            congestion_window: false,
            timeout: 10_000,
            max_retransmits: 20,
        }
    }
}

impl TransportConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the address the client connects to
    pub fn client_address(mut self, address: impl Into<String>) -> Self {
        self.client_address = address.into();
        self
    }

    /// Enable or disable dual-stack listening
    pub fn dual_mode(mut self, enabled: bool) -> Self {
        self.dual_mode = enabled;
        self
    }

    /// Set the MTU
    pub fn mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Enable or disable no-delay mode
    pub fn no_delay(mut self, enabled: bool) -> Self {
        self.no_delay = enabled;
        self
    }

    /// Set the update interval in milliseconds
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Set the fast resend threshold
    pub fn fast_resend(mut self, resend: u32) -> Self {
        self.fast_resend = resend;
        self
    }

    /// Enable or disable the congestion window
    pub fn congestion_window(mut self, enabled: bool) -> Self {
        self.congestion_window = enabled;
        self
    }

    /// Set the idle timeout in milliseconds
    pub fn timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum retransmissions before a connection is declared dead
    pub fn max_retransmits(mut self, retransmits: u32) -> Self {
        self.max_retransmits = retransmits;
        self
    }

    /// Latency-first preset: aggressive resend, short ticks, no congestion
    /// window.
    pub fn low_latency() -> Self {
        Self::default()
            .no_delay(true)
            .interval(5)
            .fast_resend(1)
            .congestion_window(false)
    }

    /// Throughput-first preset: congestion-controlled with relaxed timing.
    pub fn conservative() -> Self {
        Self::default()
            .no_delay(false)
            .interval(40)
            .fast_resend(0)
            .congestion_window(true)
    }

    /// Validate the configuration.
    ///
    /// Only the MTU range is checked here; every other value is the engine's
    /// to reject or clamp.
    pub fn validate(&self) -> Result<()> {
        if self.mtu < MTU_MIN || self.mtu > MTU_MAX {
            return Err(TransportError::config(format!(
                "MTU must be between {MTU_MIN} and {MTU_MAX}"
            )));
        }
        Ok(())
    }
}

/// Immutable snapshot of the protocol parameters handed to engine instances.
///
/// Built once per `initialize` call and reused for every subsequent server or
/// client start on the same adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub dual_mode: bool,
    pub mtu: u32,
    pub no_delay: bool,
    pub interval: u32,
    pub fast_resend: u32,
    pub congestion_window: bool,
    pub timeout: u32,
    pub max_retransmits: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::snapshot(&TransportConfig::default())
    }
}

impl ConnectionConfig {
    /// Snapshot the protocol-relevant options.
    pub fn build(options: &TransportConfig) -> Result<Self> {
        options.validate()?;
        Ok(Self::snapshot(options))
    }

    fn snapshot(options: &TransportConfig) -> Self {
        Self {
            dual_mode: options.dual_mode,
            mtu: options.mtu,
            no_delay: options.no_delay,
            interval: options.interval,
            fast_resend: options.fast_resend,
            congestion_window: options.congestion_window,
            timeout: options.timeout,
            max_retransmits: options.max_retransmits,
        }
    }
}
