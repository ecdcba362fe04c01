#![allow(dead_code)]

pub mod test_utils {
    use std::io;
    use std::net::{IpAddr, SocketAddr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use ipwake::core::wol::parse_hardware_address;
    use ipwake::{AppConfig, AppState, ProbeError, ProbeReport, Prober, WakeError, WakeSender};

    /// What the stub prober answers with.
    #[derive(Debug, Clone)]
    pub enum ProbeScript {
        Reply(Duration),
        Silent,
        Fail(String),
    }

    /// Prober that counts calls and answers from a script.
    pub struct StubProber {
        script: Mutex<ProbeScript>,
        calls: AtomicUsize,
    }

    impl StubProber {
        pub fn new(script: ProbeScript) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn set(&self, script: ProbeScript) {
            *self.script.lock().unwrap() = script;
        }
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, _host: IpAddr, _timeout: Duration, count: u16) -> Result<ProbeReport, ProbeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self.script.lock().unwrap().clone();
            match script {
                ProbeScript::Reply(rtt) => Ok(ProbeReport::from_replies(count, &[rtt])),
                ProbeScript::Silent => Ok(ProbeReport::silent(count)),
                ProbeScript::Fail(msg) => Err(ProbeError::Transport(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    msg,
                ))),
            }
        }
    }

    /// Wake sender that records requests instead of touching the network.
    /// Hardware addresses are still validated like the real sender does.
    pub struct StubWaker {
        fail_with: Option<String>,
        sent: Mutex<Vec<(String, SocketAddr)>>,
    }

    impl StubWaker {
        pub fn ok() -> Arc<Self> {
            Arc::new(Self {
                fail_with: None,
                sent: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(msg: &str) -> Arc<Self> {
            Arc::new(Self {
                fail_with: Some(msg.to_string()),
                sent: Mutex::new(Vec::new()),
            })
        }

        pub fn sent(&self) -> Vec<(String, SocketAddr)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WakeSender for StubWaker {
        async fn wake(&self, hardware_address: &str, destination: SocketAddr) -> Result<(), WakeError> {
            parse_hardware_address(hardware_address)?;
            if let Some(msg) = &self.fail_with {
                return Err(WakeError::Transmit(io::Error::new(io::ErrorKind::Other, msg.clone())));
            }
            self.sent
                .lock()
                .unwrap()
                .push((hardware_address.to_string(), destination));
            Ok(())
        }
    }

    pub fn state_with(config: AppConfig, prober: Arc<StubProber>, waker: Arc<StubWaker>) -> AppState {
        AppState::with_backends(config, prober, waker)
    }
}
