//! ICMP reachability probing.
//!
//! Handlers talk to a [`Prober`] so tests can swap in a scripted one; the
//! production implementation is [`IcmpProber`], built on `surge-ping`.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError, ICMP};
use tracing::debug;

use crate::core::error::{ProbeError, ProbeResult};
use crate::core::types::ProbeReport;

const PAYLOAD: [u8; 32] = [0; 32];

#[async_trait]
pub trait Prober: Send + Sync {
    /// Send `count` echo requests to `host`, waiting at most `timeout` for
    /// each reply. The whole call, socket setup included, returns within
    /// `timeout * count`.
    async fn probe(&self, host: IpAddr, timeout: Duration, count: u16) -> ProbeResult<ProbeReport>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct IcmpProber;

impl IcmpProber {
    pub fn new() -> Self {
        Self
    }

    async fn echo_all(host: IpAddr, timeout: Duration, count: u16) -> ProbeResult<ProbeReport> {
        let config = match host {
            IpAddr::V4(_) => Config::default(),
            IpAddr::V6(_) => Config::builder().kind(ICMP::V6).build(),
        };
        let client = Client::new(&config)?;
        let mut pinger = client.pinger(host, PingIdentifier(rand::random())).await;
        pinger.timeout(timeout);

        let mut rtts = Vec::with_capacity(count as usize);
        for seq in 0..count {
            match pinger.ping(PingSequence(seq), &PAYLOAD).await {
                Ok((_, rtt)) => rtts.push(rtt),
                Err(SurgeError::Timeout { .. }) => {}
                Err(SurgeError::IOError(e)) => return Err(ProbeError::Transport(e)),
                Err(e) => return Err(ProbeError::Icmp(e.to_string())),
            }
        }
        Ok(ProbeReport::from_replies(count, &rtts))
    }
}

/// Run `echoes`, giving up after `bound`. Running out of time is a silent
/// result, not an error.
async fn within<F>(bound: Duration, count: u16, echoes: F) -> ProbeResult<ProbeReport>
where
    F: Future<Output = ProbeResult<ProbeReport>>,
{
    match tokio::time::timeout(bound, echoes).await {
        Ok(result) => result,
        Err(_) => Ok(ProbeReport::silent(count)),
    }
}

#[async_trait]
impl Prober for IcmpProber {
    async fn probe(&self, host: IpAddr, timeout: Duration, count: u16) -> ProbeResult<ProbeReport> {
        let count = count.max(1);
        let bound = timeout * u32::from(count);
        let report = within(bound, count, Self::echo_all(host, timeout, count)).await?;
        debug!(
            %host,
            received = report.received,
            transmitted = report.transmitted,
            rtt = ?report.round_trip,
            "probe finished"
        );
        Ok(report)
    }
}
