//! Raw TCP transport (port 9100).

use std::io;
use std::net::TcpStream;
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tracing::debug;

use super::{Link, LinkCloser, LinkReader, LinkWriter};
use crate::addr::resolve_printer_addr;
use crate::{PrintError, SessionConfig};

/// Resolve `target`, connect, and split the stream into reader, writer and
/// closer clones.
pub(crate) fn open(target: &str, config: &SessionConfig) -> Result<Link, PrintError> {
    let addr = resolve_printer_addr(target)?;
    debug!(%addr, "opening tcp connection");

    let stream = TcpStream::connect_timeout(&addr, config.timeouts.connect)
        .map_err(|e| connect_error(target, e))?;
    configure_stream(&stream, config).map_err(|e| connect_error(target, e))?;

    let reader = stream.try_clone().map_err(|e| connect_error(target, e))?;
    reader
        .set_read_timeout(Some(config.poll_interval))
        .map_err(|e| connect_error(target, e))?;
    let closer = stream.try_clone().map_err(|e| connect_error(target, e))?;

    Ok(Link {
        reader: LinkReader::Net(reader),
        writer: LinkWriter::Net(stream),
        closer: LinkCloser::Net(closer),
    })
}

fn connect_error(target: &str, e: io::Error) -> PrintError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => PrintError::PermissionDenied {
            target: target.to_string(),
        },
        _ => PrintError::ConnectFailed {
            target: target.to_string(),
            source: e,
        },
    }
}

/// Configure TCP_NODELAY, keepalive, and the write timeout.
fn configure_stream(stream: &TcpStream, config: &SessionConfig) -> io::Result<()> {
    stream.set_nodelay(true)?;
    configure_keepalive(stream, Duration::from_secs(60))?;
    stream.set_write_timeout(Some(config.timeouts.write))?;
    Ok(())
}

/// Configure TCP keepalive on a `TcpStream` via `socket2`.
fn configure_keepalive(stream: &TcpStream, interval: Duration) -> io::Result<()> {
    let keepalive = TcpKeepalive::new().with_time(interval);

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    let keepalive = keepalive.with_interval(interval);

    SockRef::from(stream).set_tcp_keepalive(&keepalive)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn refused_connection_is_connect_failed() {
        // Bind then drop to get a port with nothing listening.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut config = SessionConfig::default();
        config.timeouts.connect = Duration::from_secs(1);
        match open(&format!("127.0.0.1:{port}"), &config) {
            Err(PrintError::ConnectFailed { target, .. }) => {
                assert_eq!(target, format!("127.0.0.1:{port}"));
            }
            Err(other) => panic!("expected ConnectFailed, got {other:?}"),
            Ok(_) => panic!("expected ConnectFailed, got a link"),
        }
    }

    #[test]
    fn unresolvable_host_is_not_found() {
        assert!(matches!(
            open("no-such-host.invalid:9100", &SessionConfig::default()),
            Err(PrintError::NotFound { .. })
        ));
    }
}
