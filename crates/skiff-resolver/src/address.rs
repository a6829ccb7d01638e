//! Name server address streams.

use skiff_proto::Name;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// An ordered, finite sequence of name server addresses for one
/// resolution.
#[derive(Debug, Clone)]
pub struct AddressStream {
    addresses: Vec<SocketAddr>,
    next: usize,
}

impl AddressStream {
    /// Creates a stream over the given addresses.
    pub fn new(addresses: Vec<SocketAddr>) -> Self {
        Self { addresses, next: 0 }
    }

    /// Returns the number of addresses not yet handed out.
    pub fn remaining(&self) -> usize {
        self.addresses.len() - self.next
    }

    /// Returns true if every address has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.next >= self.addresses.len()
    }
}

impl Iterator for AddressStream {
    type Item = SocketAddr;

    fn next(&mut self) -> Option<SocketAddr> {
        let addr = self.addresses.get(self.next).copied()?;
        self.next += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining(), Some(self.remaining()))
    }
}

impl ExactSizeIterator for AddressStream {}

/// Supplies the name servers to query for a name.
pub trait AddressStreamProvider: Send + Sync {
    /// Returns a fresh stream of servers for resolving `name`.
    fn name_server_stream(&self, name: &Name) -> AddressStream;
}

/// Hands out the configured servers in a fixed order.
#[derive(Debug, Clone)]
pub struct SequentialProvider {
    servers: Vec<SocketAddr>,
}

impl SequentialProvider {
    /// Creates a provider over the given servers.
    pub fn new(servers: Vec<SocketAddr>) -> Self {
        Self { servers }
    }

    /// Returns the configured servers.
    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}

impl AddressStreamProvider for SequentialProvider {
    fn name_server_stream(&self, _name: &Name) -> AddressStream {
        AddressStream::new(self.servers.clone())
    }
}

/// Rotates the starting server for each new stream.
#[derive(Debug)]
pub struct RotationalProvider {
    servers: Vec<SocketAddr>,
    next_index: AtomicUsize,
}

impl RotationalProvider {
    /// Creates a provider over the given servers.
    pub fn new(servers: Vec<SocketAddr>) -> Self {
        Self {
            servers,
            next_index: AtomicUsize::new(0),
        }
    }

    /// Returns the configured servers.
    pub fn servers(&self) -> &[SocketAddr] {
        &self.servers
    }
}

impl AddressStreamProvider for RotationalProvider {
    fn name_server_stream(&self, _name: &Name) -> AddressStream {
        let len = self.servers.len();
        if len == 0 {
            return AddressStream::new(Vec::new());
        }

        let start = self.next_index.fetch_add(1, Ordering::Relaxed) % len;
        let rotated = (0..len).map(|i| self.servers[(start + i) % len]).collect();
        AddressStream::new(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn servers() -> Vec<SocketAddr> {
        vec![
            "192.0.2.1:53".parse().unwrap(),
            "192.0.2.2:53".parse().unwrap(),
            "192.0.2.3:53".parse().unwrap(),
        ]
    }

    #[test]
    fn test_sequential_order() {
        let provider = SequentialProvider::new(servers());
        let name = Name::root();

        let first: Vec<_> = provider.name_server_stream(&name).collect();
        let second: Vec<_> = provider.name_server_stream(&name).collect();
        assert_eq!(first, servers());
        assert_eq!(second, servers());
    }

    #[test]
    fn test_rotational_order() {
        let provider = RotationalProvider::new(servers());
        let name = Name::root();

        let first: Vec<_> = provider.name_server_stream(&name).collect();
        let second: Vec<_> = provider.name_server_stream(&name).collect();
        let fourth = {
            provider.name_server_stream(&name);
            provider.name_server_stream(&name).next().unwrap()
        };

        assert_eq!(first, servers());
        assert_eq!(second[0], servers()[1]);
        assert_eq!(second[2], servers()[0]);
        assert_eq!(fourth, servers()[0]);
    }

    #[test]
    fn test_stream_is_finite() {
        let mut stream = AddressStream::new(servers());
        assert_eq!(stream.len(), 3);

        stream.next();
        stream.next();
        assert_eq!(stream.remaining(), 1);
        stream.next();
        assert!(stream.is_exhausted());
        assert_eq!(stream.next(), None);

        let empty = RotationalProvider::new(Vec::new());
        assert!(empty.name_server_stream(&Name::root()).is_exhausted());
    }
}
