use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::time::Instant;

/// A host that answered an ICMP echo.
#[derive(Debug, Clone)]
pub struct ReachabilityRecord {
    pub host: IpAddr,
    /// Monotonic time of the confirming probe; expiry is measured from here.
    pub confirmed_at: Instant,
    /// Wall-clock time of the same probe, for reporting.
    pub confirmed_wall: DateTime<Local>,
    pub round_trip: Duration,
}

impl ReachabilityRecord {
    pub fn new(host: IpAddr, round_trip: Duration) -> Self {
        Self {
            host,
            confirmed_at: Instant::now(),
            confirmed_wall: Local::now(),
            round_trip,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.confirmed_at)
    }

    pub fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) < ttl
    }
}

/// Where a host sits in the reachability lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostState {
    /// No record held.
    Unknown,
    /// Confirmed within the checking interval.
    Confirmed,
    /// Record still held but older than the checking interval.
    Expired,
}

/// Point-in-time view of one cache entry, as served by `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct HostSnapshot {
    pub host: IpAddr,
    pub state: HostState,
    pub confirmed_at: DateTime<Local>,
    #[serde(rename = "round_trip_ms", with = "duration_millis")]
    pub round_trip: Duration,
    pub expires_in_secs: u64,
}

mod duration_millis {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs_f64() * 1000.0).serialize(serializer)
    }
}

/// Outcome of a probe that managed to run. `received == 0` means the host
/// stayed silent, which callers treat as "unreachable", not as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeReport {
    pub transmitted: u16,
    pub received: u16,
    /// Mean round trip of the replies that came back.
    pub round_trip: Option<Duration>,
}

impl ProbeReport {
    pub fn silent(transmitted: u16) -> Self {
        Self {
            transmitted,
            received: 0,
            round_trip: None,
        }
    }

    pub fn from_replies(transmitted: u16, rtts: &[Duration]) -> Self {
        if rtts.is_empty() {
            return Self::silent(transmitted);
        }
        let total: Duration = rtts.iter().sum();
        Self {
            transmitted,
            received: rtts.len() as u16,
            round_trip: Some(total / rtts.len() as u32),
        }
    }
}

/// Timeout profiles used by the handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeProfile {
    /// Quick answer for polling clients.
    Liveness,
    /// Slower but more confident answer before redirecting a workflow.
    Verify,
}

impl ProbeProfile {
    pub const LIVENESS_TIMEOUT: Duration = Duration::from_millis(200);
    pub const VERIFY_TIMEOUT: Duration = Duration::from_millis(1000);
}

/// JSON body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct JsonResponse {
    #[serde(rename = "Success")]
    pub success: bool,
    #[serde(rename = "Error", default)]
    pub error: String,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
