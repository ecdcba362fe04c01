pub mod error;
pub mod handlers;
pub mod network;
pub mod sockparse;
pub mod state;
pub mod types;
pub mod wol;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;

use crate::core::network::{IcmpProber, Prober};
use crate::core::state::ReachabilityCache;
use crate::core::types::ProbeProfile;
use crate::core::wol::{UdpWakeSender, WakeSender};

/// Parameter shape accepted by `/verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum VerifyMode {
    /// `ip`, `address` and `port`.
    #[default]
    Port,
    /// `ip`, `address` and a pre-built `redirectURL`.
    RedirectUrl,
}

/// Where `/wake` sends the magic packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WakeMode {
    /// Caller supplies `ip` and `port`.
    #[default]
    Host,
    /// Configured broadcast address and WoL port.
    Broadcast,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    /// How long a successful probe is trusted.
    pub checking_interval: Duration,
    pub static_dir: PathBuf,
    /// Prefix for redirect locations; relative redirects when unset.
    pub redirect_base: Option<String>,
    pub verify_mode: VerifyMode,
    pub wake_mode: WakeMode,
    pub broadcast: IpAddr,
    pub wol_port: u16,
    pub ping_timeout: Duration,
    pub verify_timeout: Duration,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            checking_interval: Duration::from_secs(60),
            static_dir: PathBuf::from("frontend/build/"),
            redirect_base: None,
            verify_mode: VerifyMode::Port,
            wake_mode: WakeMode::Host,
            broadcast: IpAddr::V4(Ipv4Addr::BROADCAST),
            wol_port: 9,
            ping_timeout: ProbeProfile::LIVENESS_TIMEOUT,
            verify_timeout: ProbeProfile::VERIFY_TIMEOUT,
            verbose: false,
        }
    }
}

impl AppConfig {
    pub fn probe_timeout(&self, profile: ProbeProfile) -> Duration {
        match profile {
            ProbeProfile::Liveness => self.ping_timeout,
            ProbeProfile::Verify => self.verify_timeout,
        }
    }

    pub fn wol_destination(&self) -> SocketAddr {
        SocketAddr::new(self.broadcast, self.wol_port)
    }
}

/// Everything a request handler needs, cheap to clone into each filter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: ReachabilityCache,
    pub prober: Arc<dyn Prober>,
    pub waker: Arc<dyn WakeSender>,
}

impl AppState {
    /// State wired to the real ICMP prober and UDP wake sender.
    pub fn new(config: AppConfig) -> Self {
        Self::with_backends(config, Arc::new(IcmpProber::new()), Arc::new(UdpWakeSender::new()))
    }

    pub fn with_backends(
        config: AppConfig,
        prober: Arc<dyn Prober>,
        waker: Arc<dyn WakeSender>,
    ) -> Self {
        let cache = ReachabilityCache::new(config.checking_interval);
        Self {
            config: Arc::new(config),
            cache,
            prober,
            waker,
        }
    }
}
