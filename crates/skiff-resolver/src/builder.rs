//! Resolver assembly.

use super::address::AddressStreamProvider;
use super::stub::StubResolver;
use super::transport::{TokioTransport, Transport};
use super::{ResolverConfig, ResolverError, Result};
use skiff_cache::{CacheConfig, DnsCache, RecordCache};
use std::sync::Arc;
use std::time::Duration;

/// Builds a [`StubResolver`] from configuration and collaborators.
///
/// Without an explicit cache the resolver gets its own [`DnsCache`] shaped
/// by the configuration's TTL overrides. Without a transport it uses
/// [`TokioTransport`]. Name servers are required.
#[derive(Default)]
pub struct ResolverBuilder {
    config: ResolverConfig,
    cache: Option<Arc<dyn RecordCache>>,
    transport: Option<Arc<dyn Transport>>,
    name_servers: Option<Arc<dyn AddressStreamProvider>>,
}

impl ResolverBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resolver configuration.
    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses an external cache, possibly shared with other resolvers.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn RecordCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Uses a custom transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the name server address provider.
    #[must_use]
    pub fn name_servers(mut self, provider: impl AddressStreamProvider + 'static) -> Self {
        self.name_servers = Some(Arc::new(provider));
        self
    }

    /// Validates the configuration and builds the resolver.
    pub fn build(self) -> Result<StubResolver> {
        self.config.validate()?;

        let name_servers = self
            .name_servers
            .ok_or_else(|| ResolverError::Configuration("no name servers configured".to_string()))?;

        let cache = match self.cache {
            Some(_) if self.config.has_ttl_overrides() => {
                return Err(ResolverError::Configuration(
                    "TTL overrides cannot be applied to an external cache".to_string(),
                ));
            }
            Some(cache) => cache,
            None => Arc::new(DnsCache::new(cache_config(&self.config))),
        };

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(TokioTransport::new()));

        Ok(StubResolver::new(self.config, cache, transport, name_servers))
    }
}

fn cache_config(config: &ResolverConfig) -> CacheConfig {
    let defaults = CacheConfig::default();
    let secs = |ttl: Option<u32>, default: Duration| {
        ttl.map_or(default, |ttl| Duration::from_secs(u64::from(ttl)))
    };

    CacheConfig {
        min_ttl: secs(config.min_ttl(), defaults.min_ttl),
        max_ttl: secs(config.max_ttl(), defaults.max_ttl),
        negative_ttl: secs(config.negative_ttl(), defaults.negative_ttl),
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SequentialProvider;

    fn servers() -> SequentialProvider {
        SequentialProvider::new(vec!["127.0.0.1:53".parse().unwrap()])
    }

    #[test]
    fn test_build_defaults() {
        let resolver = ResolverBuilder::new().name_servers(servers()).build().unwrap();
        assert_eq!(resolver.config(), &ResolverConfig::default());
        assert!(format!("{resolver:?}").starts_with("StubResolver { config: ResolverConfig"));
    }

    #[test]
    fn test_missing_name_servers() {
        let err = ResolverBuilder::new().build().unwrap_err();
        assert!(matches!(err, ResolverError::Configuration(_)));
    }

    #[test]
    fn test_external_cache_with_ttl_override() {
        let config = ResolverConfig {
            max_ttl: Some(60),
            ..Default::default()
        };

        let err = ResolverBuilder::new()
            .config(config.clone())
            .cache(Arc::new(DnsCache::default()))
            .name_servers(servers())
            .build()
            .unwrap_err();
        assert!(matches!(err, ResolverError::Configuration(_)));

        // Zero overrides nothing, so an external cache is accepted.
        assert!(ResolverBuilder::new()
            .config(ResolverConfig {
                max_ttl: Some(0),
                ..Default::default()
            })
            .cache(Arc::new(DnsCache::default()))
            .name_servers(servers())
            .build()
            .is_ok());

        // The same overrides shape the resolver's own cache.
        assert!(ResolverBuilder::new()
            .config(config)
            .name_servers(servers())
            .build()
            .is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ResolverConfig {
            query_timeout_ms: 0,
            ..Default::default()
        };
        assert!(ResolverBuilder::new()
            .config(config)
            .name_servers(servers())
            .build()
            .is_err());
    }

    #[test]
    fn test_cache_config_from_overrides() {
        let config = ResolverConfig {
            min_ttl: Some(10),
            negative_ttl: Some(30),
            ..Default::default()
        };
        let cache = cache_config(&config);

        assert_eq!(cache.min_ttl, Duration::from_secs(10));
        assert_eq!(cache.max_ttl, CacheConfig::default().max_ttl);
        assert_eq!(cache.negative_ttl, Duration::from_secs(30));
    }
}
