//! Cache entry implementation.

use skiff_proto::{RRset, ResponseCode};
use std::time::{Duration, Instant};

/// What a cache entry holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    /// A positive answer. Record TTLs are the clamped TTLs at store time.
    Positive(RRset),
    /// A negative answer: NXDOMAIN, or NOERROR for NODATA.
    Negative(ResponseCode),
}

/// A cached answer with its absolute expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    data: EntryData,
    expires_at: Instant,
}

impl CacheEntry {
    /// Creates a positive entry expiring `ttl` after `now`.
    pub fn positive(rrset: RRset, ttl: Duration, now: Instant) -> Self {
        Self {
            data: EntryData::Positive(rrset),
            expires_at: now + ttl,
        }
    }

    /// Creates a negative entry expiring `ttl` after `now`.
    pub fn negative(rcode: ResponseCode, ttl: Duration, now: Instant) -> Self {
        Self {
            data: EntryData::Negative(rcode),
            expires_at: now + ttl,
        }
    }

    /// Returns the cached data.
    pub fn data(&self) -> &EntryData {
        &self.data
    }

    /// Returns true if this is a negative cache entry.
    pub fn is_negative(&self) -> bool {
        matches!(self.data, EntryData::Negative(_))
    }

    /// Returns when this entry expires.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns true if this entry has expired.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Returns the remaining lifetime, zero once expired.
    pub fn remaining_ttl(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }

    /// Returns the remaining lifetime in whole seconds, rounded up.
    pub fn remaining_secs(&self, now: Instant) -> u32 {
        let remaining = self.remaining_ttl(now);
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        u32::try_from(secs).unwrap_or(u32::MAX)
    }

    /// Returns the cached RRset with TTLs lowered to the remaining lifetime.
    pub fn rrset_with_remaining_ttl(&self, now: Instant) -> Option<RRset> {
        match &self.data {
            EntryData::Positive(rrset) => {
                let mut rrset = rrset.clone();
                rrset.set_ttl(self.remaining_secs(now));
                Some(rrset)
            }
            EntryData::Negative(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_proto::ResourceRecord;
    use std::net::Ipv4Addr;

    fn rrset() -> RRset {
        let record = ResourceRecord::a(
            "example.com.".parse().unwrap(),
            300,
            Ipv4Addr::new(192, 0, 2, 1),
        );
        RRset::from_records(vec![record]).unwrap()
    }

    #[test]
    fn test_cache_entry_expiry() {
        let now = Instant::now();
        let entry = CacheEntry::positive(rrset(), Duration::from_secs(10), now);

        assert!(!entry.is_expired(now));
        assert_eq!(entry.remaining_ttl(now), Duration::from_secs(10));
        assert!(entry.is_expired(now + Duration::from_secs(10)));
        assert_eq!(entry.remaining_ttl(now + Duration::from_secs(11)), Duration::ZERO);
    }

    #[test]
    fn test_remaining_secs_rounds_up() {
        let now = Instant::now();
        let entry = CacheEntry::positive(rrset(), Duration::from_secs(300), now);

        assert_eq!(entry.remaining_secs(now), 300);
        assert_eq!(entry.remaining_secs(now + Duration::from_millis(1)), 300);
        assert_eq!(entry.remaining_secs(now + Duration::from_millis(1500)), 299);

        let adjusted = entry
            .rrset_with_remaining_ttl(now + Duration::from_secs(100))
            .unwrap();
        assert!(adjusted.iter().all(|r| r.ttl() == 200));
    }

    #[test]
    fn test_negative_entry() {
        let now = Instant::now();
        let entry = CacheEntry::negative(ResponseCode::NXDomain, Duration::from_secs(60), now);

        assert!(entry.is_negative());
        assert_eq!(entry.data(), &EntryData::Negative(ResponseCode::NXDomain));
        assert!(entry.rrset_with_remaining_ttl(now).is_none());
    }
}
