//! Wake-on-LAN magic packets.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use pnet::util::MacAddr;
use tokio::net::UdpSocket;
use tracing::info;

use crate::core::error::{WakeError, WakeResult};

pub const BROADCAST_MAC: [u8; 6] = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
pub const MAGIC_PACKET_LEN: usize = 102;

#[async_trait]
pub trait WakeSender: Send + Sync {
    /// Build a magic packet for `hardware_address` and send it to
    /// `destination`.
    async fn wake(&self, hardware_address: &str, destination: SocketAddr) -> WakeResult<()>;
}

/// Parse `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`, any case.
pub fn parse_hardware_address(input: &str) -> WakeResult<MacAddr> {
    let normalized = input.trim().replace('-', ":");
    normalized
        .parse::<MacAddr>()
        .map_err(|_| WakeError::InvalidHardwareAddress(input.to_string()))
}

pub fn magic_packet(mac: MacAddr) -> [u8; MAGIC_PACKET_LEN] {
    let octets = [mac.0, mac.1, mac.2, mac.3, mac.4, mac.5];
    let mut packet = [0u8; MAGIC_PACKET_LEN];
    packet[..6].copy_from_slice(&BROADCAST_MAC);
    for chunk in packet[6..].chunks_mut(6) {
        chunk.copy_from_slice(&octets);
    }
    packet
}

/// Sends magic packets over UDP from an ephemeral, broadcast-enabled socket.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpWakeSender;

impl UdpWakeSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WakeSender for UdpWakeSender {
    async fn wake(&self, hardware_address: &str, destination: SocketAddr) -> WakeResult<()> {
        let mac = parse_hardware_address(hardware_address)?;
        let packet = magic_packet(mac);

        let bind: SocketAddr = match destination {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind).await?;
        socket.set_broadcast(true)?;
        let sent = socket.send_to(&packet, destination).await?;
        if sent != packet.len() {
            return Err(WakeError::ShortSend {
                sent,
                expected: packet.len(),
            });
        }

        info!(%mac, %destination, "magic packet sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Target hardware address of a well-formed magic packet.
    fn magic_packet_target(payload: &[u8]) -> Option<MacAddr> {
        if payload.len() < MAGIC_PACKET_LEN || payload[..6] != BROADCAST_MAC {
            return None;
        }
        let blocks: Vec<&[u8]> = payload[6..MAGIC_PACKET_LEN].chunks(6).collect();
        if blocks.len() != 16 || blocks.iter().any(|block| *block != blocks[0]) {
            return None;
        }
        let b = blocks[0];
        Some(MacAddr(b[0], b[1], b[2], b[3], b[4], b[5]))
    }

    #[test]
    fn parses_both_separator_styles() {
        let colon = parse_hardware_address("AA:bb:0c:11:22:33").unwrap();
        let dash = parse_hardware_address("aa-BB-0C-11-22-33").unwrap();
        assert_eq!(colon, dash);
        assert_eq!(colon, MacAddr(0xaa, 0xbb, 0x0c, 0x11, 0x22, 0x33));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "aa:bb:cc", "zz:bb:cc:dd:ee:ff", "not a mac"] {
            assert!(
                matches!(parse_hardware_address(bad), Err(WakeError::InvalidHardwareAddress(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn magic_packet_layout() {
        let mac = MacAddr(0x01, 0x02, 0x03, 0x04, 0x05, 0x06);
        let packet = magic_packet(mac);
        assert_eq!(&packet[..6], &BROADCAST_MAC);
        assert_eq!(&packet[6..12], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&packet[96..], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(magic_packet_target(&packet), Some(mac));
    }

    #[test]
    fn target_rejects_tampered_packet() {
        let mut packet = magic_packet(MacAddr(1, 2, 3, 4, 5, 6));
        packet[50] ^= 0xff;
        assert_eq!(magic_packet_target(&packet), None);
        assert_eq!(magic_packet_target(&packet[..60]), None);
    }

    #[tokio::test]
    async fn sends_packet_over_udp() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let destination = receiver.local_addr().unwrap();

        UdpWakeSender::new()
            .wake("de:ad:be:ef:00:01", destination)
            .await
            .unwrap();

        let mut buf = [0u8; 256];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(n, MAGIC_PACKET_LEN);
        assert_eq!(
            magic_packet_target(&buf[..n]),
            Some(MacAddr(0xde, 0xad, 0xbe, 0xef, 0x00, 0x01))
        );
    }

    #[tokio::test]
    async fn invalid_address_never_touches_the_network() {
        let err = UdpWakeSender::new()
            .wake("bogus", "127.0.0.1:9".parse().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid hardware address: \"bogus\"");
    }
}
