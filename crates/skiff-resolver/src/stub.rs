//! Stub resolution state machine.
//!
//! A resolution walks the cache first, following cached CNAMEs, and only
//! goes to the network for the name it could not answer locally. Each wire
//! query costs one unit of the resolution's budget; servers are tried in
//! the order their address stream yields them.

use super::address::AddressStreamProvider;
use super::builder::ResolverBuilder;
use super::search;
use super::transport::{Accept, Protocol, Transport};
use super::{Resolver, ResolverConfig, ResolverError, Result};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use skiff_cache::{CacheKey, CacheLookup, RecordCache};
use skiff_proto::{
    Class, Edns, Message, Name, Options, Question, RRset, RecordClass, RecordType, ResourceRecord,
    ResponseCode, Type,
};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

/// Longest CNAME chain followed before giving up.
pub const MAX_CNAME_CHAIN: usize = 16;

type SharedResolution = Shared<BoxFuture<'static, Result<Message>>>;

/// Stub resolver.
///
/// Cheap to clone; clones share the cache, the transport and the set of
/// in-flight resolutions.
#[derive(Clone)]
pub struct StubResolver {
    inner: Arc<Inner>,
}

impl fmt::Debug for StubResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StubResolver")
            .field("config", &self.inner.config)
            .field("in_flight", &self.inner.in_flight.len())
            .field("shut_down", &self.is_shut_down())
            .finish_non_exhaustive()
    }
}

struct Inner {
    config: ResolverConfig,
    cache: Arc<dyn RecordCache>,
    transport: Arc<dyn Transport>,
    name_servers: Arc<dyn AddressStreamProvider>,
    in_flight: DashMap<CacheKey, WeakShared<BoxFuture<'static, Result<Message>>>>,
    shutdown: watch::Sender<bool>,
}

impl StubResolver {
    pub(crate) fn new(
        config: ResolverConfig,
        cache: Arc<dyn RecordCache>,
        transport: Arc<dyn Transport>,
        name_servers: Arc<dyn AddressStreamProvider>,
    ) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                config,
                cache,
                transport,
                name_servers,
                in_flight: DashMap::new(),
                shutdown,
            }),
        }
    }

    /// Returns a builder.
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// Returns the resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    /// Returns the cache.
    pub fn cache(&self) -> &Arc<dyn RecordCache> {
        &self.inner.cache
    }

    /// Resolves a host name, expanding it with the search domains.
    ///
    /// The first candidate that resolves wins; if none does, the last
    /// candidate's error is returned.
    pub async fn resolve_name(&self, host: &str, rtype: RecordType) -> Result<Message> {
        let config = &self.inner.config;
        let candidates = search::candidates(host, config.ndots, &config.search_domains)?;

        let lookups = async {
            let mut last_error = ResolverError::Exhausted;
            for name in candidates {
                let question = Question::internet(name, rtype);
                match self.resolve_shared(question).await {
                    Ok(response) => return Ok(response),
                    Err(ResolverError::Cancelled) => return Err(ResolverError::Cancelled),
                    Err(e) => {
                        debug!(host, error = %e, "Search candidate failed");
                        last_error = e;
                    }
                }
            }
            Err(last_error)
        };

        self.bounded(lookups).await
    }

    /// Returns the number of distinct questions being resolved right now.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }

    /// Cancels every in-flight resolution and refuses new ones.
    pub fn shutdown(&self) {
        self.inner.shutdown.send_replace(true);
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        *self.inner.shutdown.borrow()
    }

    /// Applies the resolve timeout and shutdown to a resolution.
    async fn bounded<F>(&self, resolution: F) -> Result<Message>
    where
        F: Future<Output = Result<Message>>,
    {
        let mut shutdown = self.inner.shutdown.subscribe();
        let stopped = *shutdown.borrow_and_update();
        if stopped {
            return Err(ResolverError::Cancelled);
        }

        tokio::select! {
            result = timeout(self.inner.config.resolve_timeout(), resolution) => {
                result.map_err(|_| ResolverError::ResolutionTimeout)?
            }
            () = cancelled(shutdown) => Err(ResolverError::Cancelled),
        }
    }

    /// Joins an identical in-flight resolution or starts a new one.
    async fn resolve_shared(&self, question: Question) -> Result<Message> {
        let key = CacheKey::from_question(&question);

        let shared = match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                if let Some(shared) = entry.get().upgrade() {
                    trace!(question = %question, "Joining in-flight resolution");
                    shared
                } else {
                    let shared = Inner::start(&self.inner, question, key);
                    if let Some(weak) = shared.downgrade() {
                        entry.insert(weak);
                    }
                    shared
                }
            }
            Entry::Vacant(entry) => {
                let shared = Inner::start(&self.inner, question, key);
                if let Some(weak) = shared.downgrade() {
                    entry.insert(weak);
                }
                shared
            }
        };

        shared.await
    }
}

#[async_trait]
impl Resolver for StubResolver {
    async fn resolve(&self, question: &Question) -> Result<Message> {
        if !question.qname.is_absolute() {
            return Err(skiff_proto::Error::relative_name(&question.qname).into());
        }
        self.bounded(self.resolve_shared(question.clone())).await
    }
}

async fn cancelled(mut shutdown: watch::Receiver<bool>) {
    loop {
        let stopped = *shutdown.borrow_and_update();
        if stopped {
            return;
        }
        if shutdown.changed().await.is_err() {
            futures::future::pending::<()>().await;
        }
    }
}

/// Per-resolution state.
struct Resolution {
    question: Question,
    budget: u32,
    /// CNAME records followed, in chain order.
    chain: Vec<ResourceRecord>,
    /// Names the resolution has reached, starting with the question name.
    names: Vec<Name>,
}

impl Resolution {
    fn new(question: Question, budget: u32) -> Self {
        let names = vec![question.qname.clone()];
        Self {
            question,
            budget,
            chain: Vec::new(),
            names,
        }
    }

    fn question_for(&self, name: &Name) -> Question {
        Question::new(name.clone(), self.question.qtype, self.question.qclass)
    }

    /// Follows a CNAME record and returns its target.
    fn follow(&mut self, cname: &ResourceRecord) -> Result<Name> {
        let target = cname
            .rdata()
            .as_cname()
            .cloned()
            .ok_or_else(|| skiff_proto::Error::invalid_argument("CNAME without a target"))?;

        if self.names.contains(&target) || self.chain.len() >= MAX_CNAME_CHAIN {
            warn!(name = %cname.name(), target = %target, "CNAME loop or chain too long");
            return Err(ResolverError::ResolutionFailed {
                name: self.question.qname.clone(),
                rcode: ResponseCode::ServFail,
            });
        }

        trace!(name = %cname.name(), target = %target, "Following CNAME");
        self.chain.push(cname.clone());
        self.names.push(target.clone());
        Ok(target)
    }

    /// Returns the records answering the question at `name`.
    fn answers(
        &self,
        name: &Name,
        class_ok: impl Fn(&ResourceRecord) -> bool,
        records: &[ResourceRecord],
    ) -> Vec<ResourceRecord> {
        let qtype = self.question.qtype;
        records
            .iter()
            .filter(|r| {
                r.name() == name
                    && class_ok(r)
                    && (r.rtype() == qtype || qtype.is(RecordType::ANY))
            })
            .cloned()
            .collect()
    }

    /// Builds the response handed to callers: the CNAME chain followed by
    /// the final records.
    fn into_response(self, records: Vec<ResourceRecord>, recursion_desired: bool) -> Message {
        let mut query = Message::query(self.question);
        query.header_mut().set_recursion_desired(recursion_desired);

        let mut response = Message::response_from(&query);
        response.header_mut().set_recursion_available(true);
        for record in self.chain.into_iter().chain(records) {
            response.add_answer(record);
        }
        response
    }
}

enum CacheOutcome {
    Answer(Vec<ResourceRecord>),
    Miss(Name),
}

enum NetworkOutcome {
    Answer(Vec<ResourceRecord>),
    Chase(Name),
}

impl Inner {
    fn start(inner: &Arc<Inner>, question: Question, key: CacheKey) -> SharedResolution {
        let entry = InFlightEntry {
            inner: Arc::clone(inner),
            key,
        };
        async move {
            let result = entry.inner.lookup(question).await;
            entry.inner.in_flight.remove(&entry.key);
            result
        }
        .boxed()
        .shared()
    }

    async fn lookup(&self, question: Question) -> Result<Message> {
        debug!(question = %question, "Resolving");
        let mut resolution = Resolution::new(question, self.config.max_queries_per_resolve);
        let mut target = resolution.question.qname.clone();

        loop {
            target = match self.from_cache(&mut resolution, target).await? {
                CacheOutcome::Answer(records) => {
                    return Ok(resolution.into_response(records, self.config.recursion_desired));
                }
                CacheOutcome::Miss(name) => name,
            };

            let response = self.query_servers(&mut resolution, &target).await?;
            target = match self.absorb(&mut resolution, &target, &response).await? {
                NetworkOutcome::Answer(records) => {
                    return Ok(resolution.into_response(records, self.config.recursion_desired));
                }
                NetworkOutcome::Chase(name) => {
                    debug!(name = %name, budget = resolution.budget, "Chasing CNAME");
                    name
                }
            };
        }
    }

    /// Answers from the cache, following cached CNAMEs.
    async fn from_cache(
        &self,
        resolution: &mut Resolution,
        mut name: Name,
    ) -> Result<CacheOutcome> {
        let qtype = resolution.question.qtype;
        let qclass = resolution.question.qclass;

        loop {
            match self.cache.lookup(&name, qtype, qclass).await {
                CacheLookup::Hit { rrset, .. } => {
                    trace!(name = %name, "Cache hit");
                    return Ok(CacheOutcome::Answer(rrset.records().to_vec()));
                }
                CacheLookup::NegativeHit { rcode, .. } => {
                    trace!(name = %name, rcode = %rcode, "Negative cache hit");
                    return Err(ResolverError::ResolutionFailed { name, rcode });
                }
                CacheLookup::Miss => {}
            }

            if qtype.is_cname() {
                return Ok(CacheOutcome::Miss(name));
            }

            let cname = Type::Known(RecordType::CNAME);
            match self.cache.lookup(&name, cname, qclass).await {
                CacheLookup::Hit { rrset, .. } => match rrset.records().first() {
                    Some(record) => name = resolution.follow(record)?,
                    None => return Ok(CacheOutcome::Miss(name)),
                },
                _ => return Ok(CacheOutcome::Miss(name)),
            }
        }
    }

    /// Queries servers for `name` until one gives a usable response.
    ///
    /// Fails with the last server's error once the stream or the budget
    /// runs out, or with `Exhausted` if nothing could be sent.
    async fn query_servers(&self, resolution: &mut Resolution, name: &Name) -> Result<Message> {
        let question = resolution.question_for(name);
        let mut last_error = ResolverError::Exhausted;

        for (attempt, server) in self.name_servers.name_server_stream(name).enumerate() {
            if resolution.budget == 0 {
                debug!(name = %name, "Query budget exhausted");
                break;
            }
            resolution.budget -= 1;

            debug!(attempt, server = %server, question = %question, "Querying");
            match self.query_server(server, &question).await {
                Ok(response) => match response.rcode() {
                    Some(ResponseCode::NoError | ResponseCode::NXDomain) => return Ok(response),
                    rcode => {
                        let rcode = rcode.unwrap_or(ResponseCode::ServFail);
                        debug!(server = %server, rcode = %rcode, "Server failed, trying next");
                        last_error = ResolverError::ResolutionFailed {
                            name: name.clone(),
                            rcode,
                        };
                    }
                },
                Err(e) => {
                    debug!(server = %server, error = %e, "Query failed, trying next");
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    /// Sends one query to one server, retrying over TCP on truncation.
    async fn query_server(&self, server: SocketAddr, question: &Question) -> Result<Message> {
        let mut query = Message::query(question.clone());
        query
            .header_mut()
            .set_recursion_desired(self.config.recursion_desired);
        if self.config.edns {
            query.set_edns(Some(Edns::new().with_udp_size(self.config.max_payload_size)));
        }

        let id = query.id();
        let wire = query.to_wire()?;
        let options = self.config.options;
        let accept = move |data: &[u8]| is_response_to(data, id, question, &options);

        let response = self.exchange(Protocol::Udp, server, wire.clone(), &accept).await?;
        let response = Message::parse_with(&response, &options)?;
        if !response.is_truncated() {
            return Ok(response);
        }

        debug!(server = %server, "Response truncated, retrying over TCP");
        let response = self.exchange(Protocol::Tcp, server, wire, &accept).await?;
        Ok(Message::parse_with(&response, &options)?)
    }

    async fn exchange(
        &self,
        protocol: Protocol,
        server: SocketAddr,
        wire: bytes::Bytes,
        accept: Accept<'_>,
    ) -> Result<bytes::Bytes> {
        timeout(
            self.config.query_timeout(),
            self.transport.exchange(protocol, server, wire, accept),
        )
        .await
        .map_err(|_| {
            debug!(server = %server, protocol = %protocol, "Query timed out");
            ResolverError::ResolutionTimeout
        })?
    }

    /// Caches a response and decides whether it answers the resolution.
    async fn absorb(
        &self,
        resolution: &mut Resolution,
        target: &Name,
        response: &Message,
    ) -> Result<NetworkOutcome> {
        let qclass = resolution.question.qclass;
        let class_ok = |r: &ResourceRecord| {
            r.rclass() == qclass || matches!(qclass, Class::Known(RecordClass::ANY))
        };

        let mut name = target.clone();
        let records = loop {
            let records = resolution.answers(&name, class_ok, response.answers());
            if !records.is_empty() || resolution.question.qtype.is_cname() {
                break records;
            }

            let cname = response
                .answers()
                .iter()
                .find(|r| r.name() == &name && r.is_cname() && class_ok(r));
            match cname {
                Some(cname) => name = resolution.follow(cname)?,
                None => break records,
            }
        };

        let relevant = response
            .answers()
            .iter()
            .filter(|r| class_ok(r) && resolution.names.contains(r.name()))
            .cloned();
        for rrset in RRset::group(relevant) {
            self.cache.store(rrset).await;
        }

        if !records.is_empty() {
            return Ok(NetworkOutcome::Answer(records));
        }

        let qtype = resolution.question.qtype;
        if response.is_nxdomain() {
            debug!(name = %name, "Name does not exist");
            self.cache
                .store_negative(&name, qtype, qclass, ResponseCode::NXDomain)
                .await;
            return Err(ResolverError::ResolutionFailed {
                name,
                rcode: ResponseCode::NXDomain,
            });
        }

        if &name != target && response.authority_soa().is_none() {
            return Ok(NetworkOutcome::Chase(name));
        }

        debug!(name = %name, "No data");
        self.cache
            .store_negative(&name, qtype, qclass, ResponseCode::NoError)
            .await;
        Err(ResolverError::ResolutionFailed {
            name,
            rcode: ResponseCode::NoError,
        })
    }
}

/// Owned by a resolution future. Dropping the future before it finishes,
/// as happens when every waiter times out, clears its in-flight slot
/// unless a newer resolution has taken it.
struct InFlightEntry {
    inner: Arc<Inner>,
    key: CacheKey,
}

impl Drop for InFlightEntry {
    fn drop(&mut self) {
        self.inner
            .in_flight
            .remove_if(&self.key, |_, resolution| resolution.upgrade().is_none());
    }
}

/// Returns true if `data` is a response to the query with `id` and
/// `question`.
fn is_response_to(data: &[u8], id: u16, question: &Question, options: &Options) -> bool {
    // Cheap id check before a full parse.
    if data.len() < 2 || u16::from_be_bytes([data[0], data[1]]) != id {
        return false;
    }

    match Message::parse_with(data, options) {
        Ok(response) => {
            response.is_response()
                && response.questions().len() == 1
                && response.questions()[0].matches(question)
        }
        Err(e) => {
            trace!(error = %e, "Discarding malformed response");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question::a("www.example.com.".parse().unwrap())
    }

    fn response_wire(id: u16, question: Question) -> Vec<u8> {
        let mut query = Message::query(question);
        query.set_id(id);
        Message::response_from(&query).to_wire().unwrap().to_vec()
    }

    #[test]
    fn test_is_response_to() {
        let options = Options::default();
        let wire = response_wire(42, question());

        assert!(is_response_to(&wire, 42, &question(), &options));
        assert!(!is_response_to(&wire, 43, &question(), &options));
        assert!(!is_response_to(
            &wire,
            42,
            &Question::aaaa("www.example.com.".parse().unwrap()),
            &options
        ));
        assert!(!is_response_to(&wire[..5], 42, &question(), &options));

        let mut query = Message::query(question());
        query.set_id(42);
        let query = query.to_wire().unwrap();
        assert!(!is_response_to(&query, 42, &question(), &options));
    }

    #[test]
    fn test_question_match_ignores_case() {
        let options = Options::default();
        let upper = Question::a("WWW.EXAMPLE.COM.".parse().unwrap());
        let wire = response_wire(7, upper);

        assert!(is_response_to(&wire, 7, &question(), &options));
    }

    #[test]
    fn test_follow_detects_loops() {
        let mut resolution = Resolution::new(question(), 4);
        let a: Name = "www.example.com.".parse().unwrap();
        let b: Name = "cdn.example.net.".parse().unwrap();

        let target = resolution
            .follow(&ResourceRecord::cname(a.clone(), 60, b.clone()))
            .unwrap();
        assert_eq!(target, b);

        let err = resolution
            .follow(&ResourceRecord::cname(b, 60, a))
            .unwrap_err();
        assert_eq!(err.rcode(), Some(ResponseCode::ServFail));
    }

    #[test]
    fn test_response_carries_chain() {
        let mut resolution = Resolution::new(question(), 4);
        let a: Name = "www.example.com.".parse().unwrap();
        let b: Name = "cdn.example.net.".parse().unwrap();
        resolution
            .follow(&ResourceRecord::cname(a, 60, b.clone()))
            .unwrap();

        let record = ResourceRecord::a(b, 60, std::net::Ipv4Addr::new(192, 0, 2, 7));
        let response = resolution.into_response(vec![record], true);

        assert!(response.is_response());
        assert_eq!(response.answers().len(), 2);
        assert!(response.answers()[0].is_cname());
        assert_eq!(
            response.a_records().collect::<Vec<_>>(),
            [std::net::Ipv4Addr::new(192, 0, 2, 7)]
        );
        assert_eq!(response.question(), Some(&question()));
    }
}
