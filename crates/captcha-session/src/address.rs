//! Client IP extraction from a connection's remote address.
//!
//! Accepts `ipv4:port`, `[ipv6]:port` (including zone ids) and `hostname:port`.
//! An address without a separable port is rejected.

use std::net::SocketAddr;

use captcha_common::CaptchaError;

/// Strip the port from `remote_addr`, returning the bare host
pub fn client_ip(remote_addr: &str) -> Result<String, CaptchaError> {
    if let Ok(addr) = remote_addr.parse::<SocketAddr>() {
        return Ok(addr.ip().to_string());
    }

    split_host_port(remote_addr)
        .map(|(host, _)| host.to_string())
        .ok_or_else(|| CaptchaError::InvalidAddress(remote_addr.to_string()))
}

/// Split `host:port` or `[host]:port`; both parts must be non-empty
fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let (host, port) = match addr.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']')?;
            (host, after.strip_prefix(':')?)
        }
        None => {
            let (host, port) = addr.rsplit_once(':')?;
            if host.contains(':') {
                // bare IPv6 without brackets: the port is not separable
                return None;
            }
            (host, port)
        }
    };

    if host.is_empty() || port.is_empty() {
        return None;
    }
    if host.contains(['[', ']']) || port.contains(['[', ']', ':']) {
        return None;
    }

    Some((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use captcha_common::ErrorKind;

    #[test]
    fn test_ipv4_with_port() {
        assert_eq!(client_ip("203.0.113.5:54321").unwrap(), "203.0.113.5");
        assert_eq!(client_ip("127.0.0.1:45435").unwrap(), "127.0.0.1");
    }

    #[test]
    fn test_ipv6_with_port() {
        assert_eq!(client_ip("[2001:db8::1]:443").unwrap(), "2001:db8::1");
        assert_eq!(client_ip("[::1]:8080").unwrap(), "::1");
        assert_eq!(client_ip("[fe80::1%eth0]:80").unwrap(), "fe80::1%eth0");
    }

    #[test]
    fn test_hostname_with_port() {
        assert_eq!(client_ip("localhost:8080").unwrap(), "localhost");
    }

    #[test]
    fn test_missing_port_is_invalid() {
        for addr in [
            "203.0.113.5",
            "2001:db8::1",
            "[2001:db8::1]",
            "203.0.113.5:",
            ":8080",
            "[::1]8080",
            "[::1]:80:90",
            "",
        ] {
            let err = client_ip(addr).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidAddress, "address {addr:?}");
        }
    }
}
