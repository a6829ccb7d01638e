//! # Skiff DNS Resolver
//!
//! Stub resolver that turns a hostname and record type into answers by
//! querying upstream name servers.
//!
//! ## Features
//!
//! - Search-domain expansion with `ndots`
//! - Positive and negative caching through a pluggable [`RecordCache`]
//! - UDP with per-query timeouts, server failover and a query budget
//! - TCP retry when a response comes back truncated
//! - CNAME chasing through the cache and the network
//! - Coalescing of identical in-flight resolutions
//!
//! ## Example
//!
//! ```rust,ignore
//! use skiff_resolver::{ResolverBuilder, SequentialProvider};
//! use skiff_proto::RecordType;
//!
//! let resolver = ResolverBuilder::new()
//!     .name_servers(SequentialProvider::new(vec!["192.0.2.53:53".parse()?]))
//!     .build()?;
//!
//! let response = resolver.resolve_name("www.example.com", RecordType::A).await?;
//! for addr in response.a_records() {
//!     println!("{addr}");
//! }
//! ```
//!
//! [`RecordCache`]: skiff_cache::RecordCache

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skiff_proto::{Message, Name, Options, Question, ResponseCode};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod address;
pub mod builder;
pub mod search;
pub mod stub;
pub mod transport;

pub use address::{AddressStream, AddressStreamProvider, RotationalProvider, SequentialProvider};
pub use builder::ResolverBuilder;
pub use stub::StubResolver;
pub use transport::{Protocol, TokioTransport, Transport};

/// Resolver error.
///
/// Cloneable so that every caller sharing a coalesced resolution receives
/// the same outcome.
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    #[error("Resolution timed out")]
    ResolutionTimeout,

    #[error("Resolution of {name} failed: {rcode}")]
    ResolutionFailed { name: Name, rcode: ResponseCode },

    #[error("Query budget or name servers exhausted")]
    Exhausted,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(Arc<io::Error>),

    #[error("Protocol error: {0}")]
    Protocol(#[from] skiff_proto::Error),

    #[error("Resolution cancelled")]
    Cancelled,
}

impl ResolverError {
    /// Returns true if the name does not exist.
    pub fn is_nxdomain(&self) -> bool {
        matches!(
            self,
            Self::ResolutionFailed {
                rcode: ResponseCode::NXDomain,
                ..
            }
        )
    }

    /// Returns true if the name exists but has no records of the type.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            Self::ResolutionFailed {
                rcode: ResponseCode::NoError,
                ..
            }
        )
    }

    /// Returns the response code carried by a failed resolution.
    pub fn rcode(&self) -> Option<ResponseCode> {
        match self {
            Self::ResolutionFailed { rcode, .. } => Some(*rcode),
            _ => None,
        }
    }
}

impl From<io::Error> for ResolverError {
    fn from(err: io::Error) -> Self {
        Self::Network(Arc::new(err))
    }
}

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Names with fewer dots than this are tried with search domains first.
    pub ndots: u8,

    /// Search domains appended to relative names.
    pub search_domains: Vec<Name>,

    /// Timeout for a single query to one server (milliseconds).
    pub query_timeout_ms: u64,

    /// Timeout for a whole resolution (milliseconds).
    pub resolve_timeout_ms: u64,

    /// Wire queries allowed per resolution, CNAME chases included.
    pub max_queries_per_resolve: u32,

    /// UDP payload size advertised in EDNS.
    pub max_payload_size: u16,

    /// Attach an EDNS OPT record to queries.
    pub edns: bool,

    /// Set RD on queries.
    pub recursion_desired: bool,

    /// Minimum cache TTL override (seconds); zero leaves the cache default.
    pub min_ttl: Option<u32>,

    /// Maximum cache TTL override (seconds); zero leaves the cache default.
    pub max_ttl: Option<u32>,

    /// Negative cache TTL override (seconds); zero leaves the cache default.
    pub negative_ttl: Option<u32>,

    /// Codec options for decoding responses.
    pub options: Options,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ndots: 1,
            search_domains: Vec::new(),
            query_timeout_ms: 2000,
            resolve_timeout_ms: 10_000,
            max_queries_per_resolve: 16,
            max_payload_size: skiff_proto::DEFAULT_EDNS_UDP_SIZE,
            edns: true,
            recursion_desired: true,
            min_ttl: None,
            max_ttl: None,
            negative_ttl: None,
            options: Options::default(),
        }
    }
}

impl ResolverConfig {
    /// Checks the configuration for values the resolver cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.query_timeout_ms == 0 {
            return Err(ResolverError::Configuration(
                "query_timeout_ms must be at least 1".to_string(),
            ));
        }

        if self.resolve_timeout_ms < self.query_timeout_ms {
            return Err(ResolverError::Configuration(
                "resolve_timeout_ms cannot be shorter than query_timeout_ms".to_string(),
            ));
        }

        if self.max_queries_per_resolve == 0 {
            return Err(ResolverError::Configuration(
                "max_queries_per_resolve must be at least 1".to_string(),
            ));
        }

        if usize::from(self.max_payload_size) < skiff_proto::MAX_UDP_MESSAGE_SIZE {
            return Err(ResolverError::Configuration(format!(
                "max_payload_size must be at least {}",
                skiff_proto::MAX_UDP_MESSAGE_SIZE
            )));
        }

        if let Some(domain) = self.search_domains.iter().find(|d| !d.is_absolute()) {
            return Err(ResolverError::Configuration(format!(
                "search domain {domain} is not absolute"
            )));
        }

        if let (Some(min), Some(max)) = (self.min_ttl(), self.max_ttl()) {
            if min > max {
                return Err(ResolverError::Configuration(
                    "min_ttl cannot be greater than max_ttl".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Returns true if any cache TTL override is set to a nonzero value.
    pub fn has_ttl_overrides(&self) -> bool {
        self.min_ttl().is_some() || self.max_ttl().is_some() || self.negative_ttl().is_some()
    }

    /// Returns the minimum TTL override, if nonzero.
    pub fn min_ttl(&self) -> Option<u32> {
        self.min_ttl.filter(|&ttl| ttl != 0)
    }

    /// Returns the maximum TTL override, if nonzero.
    pub fn max_ttl(&self) -> Option<u32> {
        self.max_ttl.filter(|&ttl| ttl != 0)
    }

    /// Returns the negative TTL override, if nonzero.
    pub fn negative_ttl(&self) -> Option<u32> {
        self.negative_ttl.filter(|&ttl| ttl != 0)
    }

    /// Returns the per-query timeout.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Returns the whole-resolution timeout.
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}

/// Resolver trait.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolves an absolute question without search expansion.
    async fn resolve(&self, question: &Question) -> Result<Message>;
}
