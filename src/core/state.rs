use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::core::types::{HostSnapshot, HostState, ReachabilityRecord};

/// Hosts recently confirmed reachable.
///
/// Expiry is decided when reading: a record counts as present only while
/// `now - confirmed_at < ttl`. Writes prune whatever has expired, so the map
/// never outgrows the set of hosts confirmed in the last interval.
#[derive(Debug, Clone)]
pub struct ReachabilityCache {
    ttl: Duration,
    records: Arc<Mutex<HashMap<IpAddr, ReachabilityRecord>>>,
}

impl ReachabilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn is_present(&self, host: IpAddr) -> bool {
        let records = self.records.lock().await;
        let now = Instant::now();
        records
            .get(&host)
            .map_or(false, |record| record.is_live(now, self.ttl))
    }

    /// Live record for `host`, if any.
    pub async fn get(&self, host: IpAddr) -> Option<ReachabilityRecord> {
        let records = self.records.lock().await;
        let now = Instant::now();
        records
            .get(&host)
            .filter(|record| record.is_live(now, self.ttl))
            .cloned()
    }

    /// Record a successful probe. Overwrites any previous record for `host`,
    /// which restarts its expiry.
    pub async fn put(&self, host: IpAddr, round_trip: Duration) {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        let ttl = self.ttl;
        records.retain(|_, record| record.is_live(now, ttl));

        let previous = records.insert(host, ReachabilityRecord::new(host, round_trip));
        debug!(
            %host,
            rtt_ms = round_trip.as_secs_f64() * 1000.0,
            refreshed = previous.is_some(),
            "host confirmed reachable"
        );
    }

    /// Drop `host` regardless of age.
    pub async fn evict(&self, host: IpAddr) -> Option<ReachabilityRecord> {
        let removed = self.records.lock().await.remove(&host);
        if removed.is_some() {
            debug!(%host, "host evicted");
        }
        removed
    }

    /// Remove every expired record and return how many went.
    pub async fn prune(&self) -> usize {
        let mut records = self.records.lock().await;
        let now = Instant::now();
        let ttl = self.ttl;
        let before = records.len();
        records.retain(|_, record| record.is_live(now, ttl));
        before - records.len()
    }

    pub async fn state(&self, host: IpAddr) -> HostState {
        let records = self.records.lock().await;
        match records.get(&host) {
            None => HostState::Unknown,
            Some(record) if record.is_live(Instant::now(), self.ttl) => HostState::Confirmed,
            Some(_) => HostState::Expired,
        }
    }

    /// Every held record, most recently confirmed first.
    pub async fn snapshot(&self) -> Vec<HostSnapshot> {
        let records = self.records.lock().await;
        let now = Instant::now();
        let mut hosts: Vec<HostSnapshot> = records
            .values()
            .map(|record| {
                let age = record.age(now);
                HostSnapshot {
                    host: record.host,
                    state: if age < self.ttl {
                        HostState::Confirmed
                    } else {
                        HostState::Expired
                    },
                    confirmed_at: record.confirmed_wall,
                    round_trip: record.round_trip,
                    expires_in_secs: self.ttl.saturating_sub(age).as_secs(),
                }
            })
            .collect();
        hosts.sort_by(|a, b| b.confirmed_at.cmp(&a.confirmed_at));
        hosts
    }

    /// Number of records held, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
