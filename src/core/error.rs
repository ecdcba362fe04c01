use std::io;

use thiserror::Error;

/// Rejected request input. The `Display` text is what callers see in the
/// `Error` field of the JSON envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid IP")]
    InvalidIp,
    #[error("Port is not defined")]
    PortNotDefined,
    #[error("Invalid port")]
    InvalidPort,
    #[error("Redirect URL is not defined")]
    RedirectUrlNotDefined,
}

/// Failure to run an ICMP probe at all. A probe that simply gets no reply is
/// not an error, see [`crate::core::types::ProbeReport`].
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("{0}")]
    Transport(#[from] io::Error),
    #[error("icmp error: {0}")]
    Icmp(String),
}

#[derive(Debug, Error)]
pub enum WakeError {
    #[error("invalid hardware address: {0:?}")]
    InvalidHardwareAddress(String),
    #[error("{0}")]
    Transmit(#[from] io::Error),
    #[error("short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
}

/// Startup configuration problems. These are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid listen address {0:?}")]
    ListenAddr(String),
    #[error("invalid broadcast address {0:?}")]
    Broadcast(String),
    #[error("checking interval must be greater than zero")]
    ZeroInterval,
}

pub type ProbeResult<T> = Result<T, ProbeError>;
pub type WakeResult<T> = Result<T, WakeError>;
