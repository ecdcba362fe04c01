//! ipwake: check whether a LAN host answers ICMP echo, wake it with a
//! magic packet, and bounce a browser back once it is reachable.

pub mod core;
pub mod modules;

pub use crate::core::error::{ConfigError, ProbeError, ValidationError, WakeError};
pub use crate::core::network::{IcmpProber, Prober};
pub use crate::core::state::ReachabilityCache;
pub use crate::core::types::{HostState, JsonResponse, ProbeProfile, ProbeReport, ReachabilityRecord};
pub use crate::core::wol::{UdpWakeSender, WakeSender};
pub use crate::core::{AppConfig, AppState, VerifyMode, WakeMode};
pub use crate::modules::{routes, run_web_server};
