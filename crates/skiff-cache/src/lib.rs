//! # Skiff DNS Cache
//!
//! TTL-bounded positive and negative answer cache keyed by owner name,
//! type and class.
//!
//! ## Features
//!
//! - TTL clamping into a configured `[min, max]` window
//! - Negative caching of NXDOMAIN and NODATA answers
//! - Lazy expiry: an expired entry reads as a miss and is dropped on lookup
//! - Bounded size through `moka`
//!
//! The resolver talks to the cache through the [`RecordCache`] trait, so an
//! external cache can stand in for [`DnsCache`].

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use skiff_proto::{Class, Name, RRset, ResponseCode, Type};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub mod entry;
pub mod key;

pub use entry::{CacheEntry, EntryData};
pub use key::CacheKey;

/// DNS cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries.
    pub max_entries: u64,

    /// Minimum TTL (floor).
    pub min_ttl: Duration,

    /// Maximum TTL (ceiling).
    pub max_ttl: Duration,

    /// Lifetime of negative entries.
    pub negative_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            min_ttl: Duration::ZERO,
            max_ttl: Duration::from_secs(86400),
            negative_ttl: Duration::from_secs(900),
        }
    }
}

impl CacheConfig {
    /// Clamps a record TTL into `[min_ttl, max_ttl]`.
    ///
    /// A floor above the ceiling yields the ceiling.
    pub fn clamp_ttl(&self, ttl: u32) -> Duration {
        Duration::from_secs(u64::from(ttl))
            .max(self.min_ttl)
            .min(self.max_ttl)
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A live positive entry; record TTLs are the remaining lifetime.
    Hit {
        /// The cached records.
        rrset: RRset,
        /// Remaining lifetime, rounded up to whole seconds.
        remaining_ttl: Duration,
    },
    /// A live negative entry.
    NegativeHit {
        /// NXDOMAIN, or NOERROR for NODATA.
        rcode: ResponseCode,
        /// Remaining lifetime, rounded up to whole seconds.
        remaining_ttl: Duration,
    },
    /// Nothing usable is cached.
    Miss,
}

impl CacheLookup {
    /// Returns true for a positive or negative hit.
    pub fn is_hit(&self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Cache contract used by the resolver.
#[async_trait]
pub trait RecordCache: Send + Sync {
    /// Looks up the entry for (name, type, class).
    async fn lookup(&self, name: &Name, rtype: Type, rclass: Class) -> CacheLookup;

    /// Stores a positive RRset.
    async fn store(&self, rrset: RRset);

    /// Stores a negative answer.
    async fn store_negative(&self, name: &Name, rtype: Type, rclass: Class, rcode: ResponseCode);

    /// Drops every entry.
    async fn clear(&self);
}

/// In-process DNS cache.
pub struct DnsCache {
    config: CacheConfig,
    cache: MokaCache<CacheKey, CacheEntry>,
    stats: CacheStats,
}

impl DnsCache {
    /// Creates a new DNS cache.
    pub fn new(config: CacheConfig) -> Self {
        // Entries expire lazily; moka's TTL only bounds how long dead
        // entries occupy space.
        let horizon = config
            .max_ttl
            .max(config.negative_ttl)
            .max(Duration::from_secs(1));
        let cache = MokaCache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(horizon)
            .build();

        Self {
            config,
            cache,
            stats: CacheStats::default(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Looks up the entry for (name, type, class).
    pub async fn lookup(&self, name: &Name, rtype: Type, rclass: Class) -> CacheLookup {
        let key = CacheKey::new(name, rtype, rclass);
        let Some(entry) = self.cache.get(&key).await else {
            self.stats.record_miss();
            return CacheLookup::Miss;
        };

        let now = Instant::now();
        if entry.is_expired(now) {
            trace!(name = %key.name(), rtype = %rtype, "cache entry expired");
            self.cache.invalidate(&key).await;
            self.stats.record_miss();
            return CacheLookup::Miss;
        }

        let remaining_ttl = Duration::from_secs(u64::from(entry.remaining_secs(now)));
        match entry.data() {
            EntryData::Positive(_) => {
                self.stats.record_hit();
                match entry.rrset_with_remaining_ttl(now) {
                    Some(rrset) => CacheLookup::Hit {
                        rrset,
                        remaining_ttl,
                    },
                    None => CacheLookup::Miss,
                }
            }
            EntryData::Negative(rcode) => {
                self.stats.record_negative_hit();
                CacheLookup::NegativeHit {
                    rcode: *rcode,
                    remaining_ttl,
                }
            }
        }
    }

    /// Stores an RRset, clamping each TTL into `[min_ttl, max_ttl]`.
    ///
    /// The entry expires when its shortest clamped TTL runs out. An RRset
    /// whose clamped TTL is zero is not stored.
    pub async fn store(&self, mut rrset: RRset) {
        let ttl = self.config.clamp_ttl(rrset.min_ttl());
        if ttl.is_zero() {
            trace!(name = %rrset.name(), rtype = %rrset.rtype(), "not caching zero TTL");
            return;
        }

        let secs = u32::try_from(ttl.as_secs()).unwrap_or(u32::MAX);
        rrset.set_ttl(secs);

        let key = CacheKey::from_rrset(&rrset);
        debug!(name = %key.name(), rtype = %key.rtype(), ttl = secs, "caching rrset");
        self.cache
            .insert(key, CacheEntry::positive(rrset, ttl, Instant::now()))
            .await;
    }

    /// Stores a negative answer for `negative_ttl`.
    pub async fn store_negative(&self, name: &Name, rtype: Type, rclass: Class, rcode: ResponseCode) {
        let ttl = self.config.negative_ttl;
        if ttl.is_zero() {
            return;
        }

        let key = CacheKey::new(name, rtype, rclass);
        debug!(name = %key.name(), rtype = %rtype, rcode = %rcode, "caching negative answer");
        self.cache
            .insert(key, CacheEntry::negative(rcode, ttl, Instant::now()))
            .await;
    }

    /// Removes one entry.
    pub async fn invalidate(&self, name: &Name, rtype: Type, rclass: Class) {
        self.cache.invalidate(&CacheKey::new(name, rtype, rclass)).await;
    }

    /// Clears the entire cache.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Applies pending inserts and removals so that [`len`](Self::len) is
    /// exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Returns the number of entries in the cache.
    ///
    /// Maintenance is deferred, so the count can lag behind recent writes
    /// until [`sync`](Self::sync) runs.
    pub fn len(&self) -> usize {
        usize::try_from(self.cache.entry_count()).unwrap_or(usize::MAX)
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.entry_count() == 0
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[async_trait]
impl RecordCache for DnsCache {
    async fn lookup(&self, name: &Name, rtype: Type, rclass: Class) -> CacheLookup {
        DnsCache::lookup(self, name, rtype, rclass).await
    }

    async fn store(&self, rrset: RRset) {
        DnsCache::store(self, rrset).await;
    }

    async fn store_negative(&self, name: &Name, rtype: Type, rclass: Class, rcode: ResponseCode) {
        DnsCache::store_negative(self, name, rtype, rclass, rcode).await;
    }

    async fn clear(&self) {
        DnsCache::clear(self);
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    negative_hits: AtomicU64,
}

impl CacheStats {
    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_negative_hit(&self) {
        self.negative_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of positive hits.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of misses, expired entries included.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Returns the number of negative hits.
    pub fn negative_hits(&self) -> u64 {
        self.negative_hits.load(Ordering::Relaxed)
    }

    /// Returns the share of lookups answered from the cache.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() + self.negative_hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
