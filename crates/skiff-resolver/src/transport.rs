//! Query transports.

use super::Result;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tracing::trace;

/// Transport protocol for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// One message per datagram.
    Udp,
    /// Messages framed with a two-byte length prefix.
    Tcp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Udp => f.write_str("udp"),
            Self::Tcp => f.write_str("tcp"),
        }
    }
}

/// Filter applied to inbound messages; rejected ones are discarded.
pub type Accept<'a> = &'a (dyn Fn(&[u8]) -> bool + Send + Sync);

/// Sends a request to a server and waits for an accepted response.
///
/// Implementations do not time out on their own; callers wrap the exchange
/// in a timeout and drop it to cancel.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` to `server` and returns the first response that
    /// `accept` admits.
    async fn exchange(
        &self,
        protocol: Protocol,
        server: SocketAddr,
        request: Bytes,
        accept: Accept<'_>,
    ) -> Result<Bytes>;
}

/// Transport over tokio UDP and TCP sockets.
///
/// UDP uses a fresh connected socket per exchange so only the queried
/// server's datagrams are seen. TCP opens one connection per exchange.
#[derive(Debug, Clone)]
pub struct TokioTransport {
    recv_buffer: usize,
}

impl TokioTransport {
    /// Creates a transport that can receive datagrams of any size.
    pub fn new() -> Self {
        Self {
            recv_buffer: u16::MAX as usize,
        }
    }

    async fn exchange_udp(
        &self,
        server: SocketAddr,
        request: &[u8],
        accept: Accept<'_>,
    ) -> Result<Bytes> {
        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(server).await?;
        socket.send(request).await?;

        let mut buf = vec![0u8; self.recv_buffer];
        loop {
            let len = socket.recv(&mut buf).await?;
            if accept(&buf[..len]) {
                return Ok(Bytes::copy_from_slice(&buf[..len]));
            }
            trace!(server = %server, len, "Discarding unmatched datagram");
        }
    }

    async fn exchange_tcp(
        &self,
        server: SocketAddr,
        request: &[u8],
        accept: Accept<'_>,
    ) -> Result<Bytes> {
        let len = u16::try_from(request.len()).map_err(|_| {
            skiff_proto::Error::MessageTooLarge {
                size: request.len(),
                max_size: u16::MAX as usize,
            }
        })?;

        let mut stream = TcpStream::connect(server).await?;
        stream.set_nodelay(true)?;

        let mut frame = BytesMut::with_capacity(2 + request.len());
        frame.put_u16(len);
        frame.put_slice(request);
        stream.write_all(&frame).await?;

        // Responses are matched by content, not by arrival order.
        loop {
            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).await?;

            let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
            stream.read_exact(&mut buf).await?;

            if accept(&buf) {
                return Ok(Bytes::from(buf));
            }
            trace!(server = %server, len = buf.len(), "Discarding unmatched frame");
        }
    }
}

impl Default for TokioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for TokioTransport {
    async fn exchange(
        &self,
        protocol: Protocol,
        server: SocketAddr,
        request: Bytes,
        accept: Accept<'_>,
    ) -> Result<Bytes> {
        trace!(server = %server, protocol = %protocol, len = request.len(), "Sending query");
        match protocol {
            Protocol::Udp => self.exchange_udp(server, &request, accept).await,
            Protocol::Tcp => self.exchange_tcp(server, &request, accept).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResolverError;
    use tokio::net::TcpListener;

    fn starts_with_ok(data: &[u8]) -> bool {
        data.starts_with(b"ok")
    }

    #[tokio::test]
    async fn test_udp_discards_unaccepted() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();

        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            assert_eq!(&buf[..len], b"ping");
            server.send_to(b"noise", peer).await.unwrap();
            server.send_to(b"ok pong", peer).await.unwrap();
        });

        let transport = TokioTransport::new();
        let response = transport
            .exchange(Protocol::Udp, addr, Bytes::from_static(b"ping"), &starts_with_ok)
            .await
            .unwrap();

        assert_eq!(&response[..], b"ok pong");
    }

    #[tokio::test]
    async fn test_tcp_length_prefix() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut len = [0u8; 2];
            stream.read_exact(&mut len).await.unwrap();
            let mut request = vec![0u8; usize::from(u16::from_be_bytes(len))];
            stream.read_exact(&mut request).await.unwrap();
            assert_eq!(request, b"ping");

            for reply in [&b"noise"[..], &b"ok pong"[..]] {
                let len = u16::try_from(reply.len()).unwrap();
                stream.write_all(&len.to_be_bytes()).await.unwrap();
                stream.write_all(reply).await.unwrap();
            }
        });

        let transport = TokioTransport::new();
        let response = transport
            .exchange(Protocol::Tcp, addr, Bytes::from_static(b"ping"), &starts_with_ok)
            .await
            .unwrap();

        assert_eq!(&response[..], b"ok pong");
    }

    #[tokio::test]
    async fn test_tcp_closed_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            drop(stream);
        });

        let transport = TokioTransport::new();
        let err = transport
            .exchange(Protocol::Tcp, addr, Bytes::from_static(b"ping"), &starts_with_ok)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolverError::Network(_)));
    }
}
