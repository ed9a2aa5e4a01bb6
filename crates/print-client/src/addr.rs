//! Network target resolution.
//!
//! Net targets are `host:port`, with the port optional. Accepted forms:
//! `IP`, `IP:PORT`, `[IPv6]:PORT`, `hostname`, `hostname:PORT`.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use crate::PrintError;

/// Default raw printing port.
pub const DEFAULT_PORT: u16 = 9100;

/// Resolve a Net target to a socket address.
///
/// A `:port` suffix that is not a valid `u16` fails with
/// [`PrintError::InvalidAddress`]; a well-formed target that does not
/// resolve fails with [`PrintError::NotFound`]. Hostnames that resolve to
/// several addresses use the first one.
pub fn resolve_printer_addr(input: &str) -> Result<SocketAddr, PrintError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PrintError::InvalidAddress("empty target".into()));
    }

    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    let (host, port) = split_host_port(input)?;
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(PrintError::InvalidAddress(input.to_string()));
    }

    if let Ok(mut addrs) = (host, port).to_socket_addrs()
        && let Some(addr) = addrs.next()
    {
        return Ok(addr);
    }

    Err(PrintError::NotFound {
        target: input.to_string(),
    })
}

/// Split `host[:port]`, defaulting the port.
fn split_host_port(input: &str) -> Result<(&str, u16), PrintError> {
    match input.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => {
            let port = port
                .parse::<u16>()
                .map_err(|_| PrintError::InvalidAddress(format!("bad port in {input:?}")))?;
            Ok((host, port))
        }
        Some(_) => Err(PrintError::InvalidAddress(input.to_string())),
        None => Ok((input, DEFAULT_PORT)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_with_port() {
        let addr = resolve_printer_addr("192.168.1.55:9100").unwrap();
        assert_eq!(addr.ip().to_string(), "192.168.1.55");
        assert_eq!(addr.port(), 9100);
    }

    #[test]
    fn ip_with_custom_port() {
        let addr = resolve_printer_addr("10.0.0.1:6101").unwrap();
        assert_eq!(addr.port(), 6101);
    }

    #[test]
    fn ip_without_port_defaults_to_9100() {
        let addr = resolve_printer_addr("192.168.1.55").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn ipv6_forms() {
        let addr = resolve_printer_addr("[::1]:9100").unwrap();
        assert!(addr.ip().is_loopback());
        let addr = resolve_printer_addr("::1").unwrap();
        assert_eq!(addr.port(), DEFAULT_PORT);
    }

    #[test]
    fn localhost_with_and_without_port() {
        assert_eq!(resolve_printer_addr("localhost:9200").unwrap().port(), 9200);
        assert_eq!(resolve_printer_addr("localhost").unwrap().port(), DEFAULT_PORT);
    }

    #[test]
    fn bad_port_is_invalid_address() {
        for input in ["localhost:abc", "localhost:70000", "localhost:"] {
            match resolve_printer_addr(input) {
                Err(PrintError::InvalidAddress(_)) => {}
                other => panic!("{input}: expected InvalidAddress, got {other:?}"),
            }
        }
    }

    #[test]
    fn garbage_is_invalid_address() {
        assert!(matches!(
            resolve_printer_addr("not a valid address"),
            Err(PrintError::InvalidAddress(_))
        ));
        assert!(matches!(resolve_printer_addr(""), Err(PrintError::InvalidAddress(_))));
    }

    #[test]
    fn unresolvable_hostname_is_not_found() {
        match resolve_printer_addr("no-such-host.invalid") {
            Err(PrintError::NotFound { target }) => assert_eq!(target, "no-such-host.invalid"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
