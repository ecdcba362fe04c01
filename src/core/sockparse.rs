/*!
 * SockParse: turns user-supplied strings (flags, query parameters) into
 * socket addresses.
 *
 *   - Listen addresses, including the `:8080` shorthand.
 *   - Broadcast targets given as a plain IP or as a CIDR block.
 *   - Strict IP literals and port numbers from query strings.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ipnetwork::IpNetwork;

use crate::core::error::{ConfigError, ValidationError};

/// Parses a listen address.
/// Supported formats:
/// - Port only: ":8080" (all IPv4 interfaces)
/// - Full socket address: "127.0.0.1:8080", "[::1]:8080"
pub fn parse_listen_addr(input: &str) -> Result<SocketAddr, ConfigError> {
    let input = input.trim();
    if let Some(port) = input.strip_prefix(':') {
        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::ListenAddr(input.to_string()))?;
        return Ok(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }
    input
        .parse()
        .map_err(|_| ConfigError::ListenAddr(input.to_string()))
}

/// Parses a broadcast target.
/// Supported formats:
/// - Single IP: "192.168.1.255"
/// - CIDR block: "192.168.1.0/24", resolved to its broadcast address
pub fn parse_broadcast(input: &str) -> Result<IpAddr, ConfigError> {
    let input = input.trim();
    if input.contains('/') {
        let network: IpNetwork = input
            .parse()
            .map_err(|_| ConfigError::Broadcast(input.to_string()))?;
        return match network {
            IpNetwork::V4(net) => Ok(IpAddr::V4(net.broadcast())),
            // IPv6 has no broadcast address.
            IpNetwork::V6(_) => Err(ConfigError::Broadcast(input.to_string())),
        };
    }
    input
        .parse()
        .map_err(|_| ConfigError::Broadcast(input.to_string()))
}

/// Strict IP literal: no hostnames, no surrounding whitespace.
pub fn parse_ip(input: Option<&str>) -> Result<IpAddr, ValidationError> {
    input
        .and_then(|raw| raw.parse().ok())
        .ok_or(ValidationError::InvalidIp)
}

/// Port from a query string. Missing or non-numeric values are "not
/// defined"; numbers outside 0-65535 are "invalid".
pub fn parse_port(input: Option<&str>) -> Result<u16, ValidationError> {
    let port: i64 = input
        .and_then(|raw| raw.parse().ok())
        .ok_or(ValidationError::PortNotDefined)?;
    u16::try_from(port).map_err(|_| ValidationError::InvalidPort)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_shorthand_binds_all_interfaces() {
        assert_eq!(
            parse_listen_addr(":8080").unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            parse_listen_addr("127.0.0.1:3030").unwrap(),
            "127.0.0.1:3030".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_listen_addr(":http").is_err());
        assert!(parse_listen_addr("localhost").is_err());
    }

    #[test]
    fn broadcast_from_cidr() {
        assert_eq!(
            parse_broadcast("192.168.1.0/24").unwrap(),
            "192.168.1.255".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            parse_broadcast("10.0.0.0/8").unwrap(),
            "10.255.255.255".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            parse_broadcast("255.255.255.255").unwrap(),
            IpAddr::V4(Ipv4Addr::BROADCAST)
        );
        assert!(parse_broadcast("192.168.1.0/33").is_err());
    }

    #[test]
    fn ip_literals_are_strict() {
        for bad in ["not-an-ip", "", "999.1.1.1", " 10.0.0.1", "10.0.0"] {
            assert_eq!(parse_ip(Some(bad)), Err(ValidationError::InvalidIp), "{bad:?}");
        }
        assert_eq!(parse_ip(None), Err(ValidationError::InvalidIp));
        assert!(parse_ip(Some("10.0.0.1")).is_ok());
        assert!(parse_ip(Some("fe80::1")).is_ok());
    }

    #[test]
    fn port_bounds() {
        assert_eq!(parse_port(Some("9")), Ok(9));
        assert_eq!(parse_port(Some("0")), Ok(0));
        assert_eq!(parse_port(Some("65535")), Ok(65535));
        assert_eq!(parse_port(Some("65536")), Err(ValidationError::InvalidPort));
        assert_eq!(parse_port(Some("-1")), Err(ValidationError::InvalidPort));
        assert_eq!(parse_port(Some("abc")), Err(ValidationError::PortNotDefined));
        assert_eq!(parse_port(None), Err(ValidationError::PortNotDefined));
    }
}
