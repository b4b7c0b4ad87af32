//! Socket abstraction for testability

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use super::error::ConnectError;

/// A connected byte stream a tile request can run over.
pub trait TileStream: Read + Write {
    /// Read and throw away bytes that have already arrived, without
    /// blocking.
    ///
    /// Returns the number of bytes discarded. A peer that has closed the
    /// stream is reported as an error so the caller reconnects.
    fn discard_pending(&mut self) -> io::Result<usize>;
}

/// Trait for establishing connections.
///
/// This abstraction allows the connection manager to run against an
/// in-memory transport in tests.
pub trait Connector {
    type Stream: TileStream;

    /// Resolve `host:port` to one socket address.
    fn resolve(&self, host: &str, port: u16) -> Result<SocketAddr, ConnectError>;

    /// Open a stream to `addr`, giving up after `timeout`.
    fn connect(&self, addr: SocketAddr, timeout: Duration) -> Result<Self::Stream, ConnectError>;
}

/// Real TCP connector.
///
/// Disables Nagle's algorithm on every stream, requests are a single small
/// write each.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn resolve(&self, host: &str, port: u16) -> Result<SocketAddr, ConnectError> {
        let dns = || ConnectError::Dns {
            host: host.to_string(),
        };
        (host, port)
            .to_socket_addrs()
            .map_err(|_| dns())?
            .next()
            .ok_or_else(dns)
    }

    fn connect(&self, addr: SocketAddr, timeout: Duration) -> Result<TcpStream, ConnectError> {
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| ConnectError::from_connect(e, addr, timeout))?;
        stream.set_nodelay(true).map_err(ConnectError::from_io)?;
        Ok(stream)
    }
}

impl TileStream for TcpStream {
    fn discard_pending(&mut self) -> io::Result<usize> {
        self.set_nonblocking(true)?;

        let mut scratch = [0u8; 1024];
        let mut total = 0;
        let result = loop {
            match self.read(&mut scratch) {
                Ok(0) => {
                    break Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by server",
                    ))
                }
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(total),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        self.set_nonblocking(false)?;
        result
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::net::TcpListener;
    use std::rc::Rc;

    /// In-memory stream that releases one canned response per request
    /// written.
    pub struct MockStream {
        pending: VecDeque<Vec<u8>>,
        readable: VecDeque<u8>,
        written: Rc<RefCell<Vec<u8>>>,
        failing_writes: Rc<Cell<u32>>,
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.readable.len());
            for (slot, byte) in buf.iter_mut().zip(self.readable.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failing_writes.get() > 0 {
                self.failing_writes.set(self.failing_writes.get() - 1);
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write failure"));
            }
            self.written.borrow_mut().extend_from_slice(buf);
            if let Some(response) = self.pending.pop_front() {
                self.readable.extend(response);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl TileStream for MockStream {
        fn discard_pending(&mut self) -> io::Result<usize> {
            Ok(0)
        }
    }

    /// Mock connector for testing.
    ///
    /// Every connection answers the i-th write with `responses[i]`. Requests
    /// from all connections are appended to `written`.
    #[derive(Default)]
    pub struct MockConnector {
        pub responses: Vec<Vec<u8>>,
        pub connects: Rc<Cell<usize>>,
        pub written: Rc<RefCell<Vec<u8>>>,
        pub failing_writes: Rc<Cell<u32>>,
    }

    impl MockConnector {
        pub fn replaying(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses,
                ..Self::default()
            }
        }
    }

    impl Connector for MockConnector {
        type Stream = MockStream;

        fn resolve(&self, _host: &str, port: u16) -> Result<SocketAddr, ConnectError> {
            Ok(SocketAddr::from(([127, 0, 0, 1], port)))
        }

        fn connect(&self, _addr: SocketAddr, _timeout: Duration) -> Result<MockStream, ConnectError> {
            self.connects.set(self.connects.get() + 1);
            Ok(MockStream {
                pending: self.responses.iter().cloned().collect(),
                readable: VecDeque::new(),
                written: Rc::clone(&self.written),
                failing_writes: Rc::clone(&self.failing_writes),
            })
        }
    }

    #[test]
    fn test_mock_connector_answers_each_write() {
        let connector = MockConnector::replaying(vec![b"one".to_vec(), b"two".to_vec()]);
        let addr = connector.resolve("anything", 80).unwrap();

        let mut stream = connector.connect(addr, Duration::from_secs(1)).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);

        stream.write_all(b"GET").unwrap();
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"one");

        connector.connect(addr, Duration::from_secs(1)).unwrap();
        assert_eq!(connector.connects.get(), 2);
        assert_eq!(&*connector.written.borrow(), b"GET");
    }

    #[test]
    fn test_resolve_localhost() {
        let addr = TcpConnector.resolve("127.0.0.1", 8080).unwrap();
        assert_eq!(addr, "127.0.0.1:8080".parse().unwrap());
    }

    #[test]
    fn test_resolve_failure_is_dns_error() {
        let err = TcpConnector
            .resolve("no-such-host.invalid", 80)
            .unwrap_err();
        assert!(matches!(err, ConnectError::Dns { .. }));
    }

    #[test]
    fn test_connect_and_discard_pending() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpConnector
            .connect(addr, Duration::from_secs(5))
            .unwrap();
        assert!(client.nodelay().unwrap());

        let (mut server, _) = listener.accept().unwrap();

        // Nothing has arrived yet
        assert_eq!(client.discard_pending().unwrap(), 0);

        server.write_all(b"stale bytes").unwrap();
        server.flush().unwrap();

        // Wait until the bytes are visible to the client
        let mut peek = [0u8; 1];
        client.peek(&mut peek).unwrap();
        assert!(client.discard_pending().unwrap() > 0);

        // Still blocking afterwards
        drop(server);
        let mut buf = [0u8; 1];
        assert_eq!(client.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_discard_pending_reports_closed_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let mut client = TcpConnector
            .connect(addr, Duration::from_secs(5))
            .unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(server);

        // Blocks until the FIN has arrived
        let mut peek = [0u8; 1];
        assert_eq!(client.peek(&mut peek).unwrap(), 0);
        assert!(client.discard_pending().is_err());
    }
}
