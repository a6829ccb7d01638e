//! Resolver integration tests.
//!
//! These tests run the stub resolver against:
//! - in-process UDP/TCP name servers bound to 127.0.0.1
//! - a scripted in-memory transport that counts every exchange

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

use skiff_proto::{
    Message, Name, Options, Question, RecordType, ResourceRecord, ResponseCode,
};
use skiff_resolver::transport::Accept;
use skiff_resolver::{
    Protocol, Resolver, ResolverBuilder, ResolverConfig, ResolverError, RotationalProvider,
    SequentialProvider, StubResolver, Transport,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn name(text: &str) -> Name {
    text.parse().unwrap()
}

fn a(owner: &str, ttl: u32, addr: Ipv4Addr) -> ResourceRecord {
    ResourceRecord::a(name(owner), ttl, addr)
}

fn cname(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::cname(name(owner), 300, name(target))
}

/// Authoritative data shared by the test servers.
#[derive(Clone, Default)]
struct Zone {
    records: Vec<ResourceRecord>,
}

impl Zone {
    fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }

    /// Answers a query the way a recursive server without the CNAME
    /// target would: matching records, or the CNAME alone.
    fn answer(&self, query: &Message) -> Message {
        let mut response = Message::response_from(query);
        let Some(question) = query.question() else {
            response.set_rcode(ResponseCode::FormErr).unwrap();
            return response;
        };

        let owned: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.name() == &question.qname)
            .collect();

        if owned.is_empty() {
            response.set_rcode(ResponseCode::NXDomain).unwrap();
            return response;
        }

        for record in owned {
            if record.rtype() == question.qtype || record.is_cname() {
                response.add_answer(record.clone());
            }
        }
        response
    }
}

fn config() -> ResolverConfig {
    ResolverConfig {
        query_timeout_ms: 500,
        resolve_timeout_ms: 5000,
        ..Default::default()
    }
}

/// How a scripted server reacts to queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Behaviour {
    Answer,
    ServFail,
    Silent,
}

/// In-memory transport answering from a zone.
///
/// UDP responses are cut to `udp_limit` bytes, setting TC when the
/// answer does not fit.
struct ScriptedTransport {
    zone: Zone,
    behaviour: HashMap<SocketAddr, Behaviour>,
    udp_limit: usize,
    delay: Duration,
    sends: Arc<AtomicU64>,
    log: Arc<Mutex<Vec<(Protocol, SocketAddr, Question)>>>,
}

impl ScriptedTransport {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            behaviour: HashMap::new(),
            udp_limit: 4096,
            delay: Duration::ZERO,
            sends: Arc::new(AtomicU64::new(0)),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_behaviour(mut self, server: SocketAddr, behaviour: Behaviour) -> Self {
        self.behaviour.insert(server, behaviour);
        self
    }

    fn with_udp_limit(mut self, limit: usize) -> Self {
        self.udp_limit = limit;
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn sends(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sends)
    }

    fn log(&self) -> Arc<Mutex<Vec<(Protocol, SocketAddr, Question)>>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn exchange(
        &self,
        protocol: Protocol,
        server: SocketAddr,
        request: Bytes,
        accept: Accept<'_>,
    ) -> skiff_resolver::Result<Bytes> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let query = Message::parse(&request)?;
        self.log
            .lock()
            .push((protocol, server, query.question().cloned().unwrap()));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = match self.behaviour.get(&server).copied().unwrap_or(Behaviour::Answer) {
            Behaviour::Silent => futures::future::pending().await,
            Behaviour::ServFail => {
                let mut response = Message::response_from(&query);
                response.set_rcode(ResponseCode::ServFail).unwrap();
                response
            }
            Behaviour::Answer => self.zone.answer(&query),
        };

        // A spoofed reply with the wrong id must be rejected.
        let mut spoofed = response.clone();
        spoofed.set_id(response.id().wrapping_add(1));
        assert!(!accept(&spoofed.to_wire().unwrap()));

        let limit = match protocol {
            Protocol::Udp => self.udp_limit,
            Protocol::Tcp => u16::MAX as usize,
        };
        let wire = response.to_wire_with(limit, &Options::default())?;
        assert!(accept(&wire));
        Ok(wire)
    }
}

fn servers(count: u8) -> Vec<SocketAddr> {
    (1..=count)
        .map(|i| SocketAddr::from((Ipv4Addr::new(192, 0, 2, i), 53)))
        .collect()
}

fn scripted(config: ResolverConfig, transport: ScriptedTransport, count: u8) -> StubResolver {
    ResolverBuilder::new()
        .config(config)
        .transport(transport)
        .name_servers(SequentialProvider::new(servers(count)))
        .build()
        .unwrap()
}

/// Serves `zone` over UDP, cutting responses to `udp_limit` bytes.
async fn spawn_udp_server(zone: Zone, udp_limit: usize) -> (SocketAddr, Arc<AtomicU64>) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    spawn_udp_on(socket, zone, udp_limit, false)
}

fn spawn_udp_on(
    socket: UdpSocket,
    zone: Zone,
    udp_limit: usize,
    spoof_first: bool,
) -> (SocketAddr, Arc<AtomicU64>) {
    let addr = socket.local_addr().unwrap();
    let count = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&count);

    tokio::spawn(async move {
        let mut buf = vec![0u8; 4096];
        loop {
            let Ok((len, peer)) = socket.recv_from(&mut buf).await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);

            let Ok(query) = Message::parse(&buf[..len]) else {
                continue;
            };
            let response = zone.answer(&query);

            if spoof_first {
                let mut spoofed = response.clone();
                spoofed.set_id(query.id().wrapping_add(1));
                spoofed.clear_section(skiff_proto::Section::Answer);
                spoofed.add_answer(a("www.example.com.", 300, Ipv4Addr::new(6, 6, 6, 6)));
                let _ = socket.send_to(&spoofed.to_wire().unwrap(), peer).await;
            }

            let wire = response
                .to_wire_with(udp_limit, &Options::default())
                .unwrap();
            let _ = socket.send_to(&wire, peer).await;
        }
    });

    (addr, count)
}

/// Serves `zone` over TCP with two-byte length framing.
fn spawn_tcp_on(listener: TcpListener, zone: Zone) -> Arc<AtomicU64> {
    let count = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&count);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let zone = zone.clone();
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                let mut len_buf = [0u8; 2];
                while stream.read_exact(&mut len_buf).await.is_ok() {
                    let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
                    if stream.read_exact(&mut buf).await.is_err() {
                        return;
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let Ok(query) = Message::parse(&buf) else {
                        return;
                    };
                    let wire = zone.answer(&query).to_wire().unwrap();
                    let len = u16::try_from(wire.len()).unwrap();
                    if stream.write_all(&len.to_be_bytes()).await.is_err()
                        || stream.write_all(&wire).await.is_err()
                    {
                        return;
                    }
                }
            });
        }
    });

    count
}

// ============================================================================
// Socket Tests
// ============================================================================

#[tokio::test]
async fn test_search_domain_resolution_is_cached() {
    let zone = Zone::new(vec![a(
        "www.example.com.",
        300,
        Ipv4Addr::new(93, 184, 216, 34),
    )]);
    let (addr, queries) = spawn_udp_server(zone, 512).await;

    let resolver = ResolverBuilder::new()
        .config(ResolverConfig {
            ndots: 1,
            search_domains: vec![name("example.com.")],
            ..config()
        })
        .name_servers(SequentialProvider::new(vec![addr]))
        .build()
        .unwrap();

    let response = resolver
        .resolve_name("www.example.com", RecordType::A)
        .await
        .unwrap();
    assert_eq!(
        response.a_records().collect::<Vec<_>>(),
        [Ipv4Addr::new(93, 184, 216, 34)]
    );
    assert_eq!(response.answers()[0].ttl(), 300);
    assert_eq!(queries.load(Ordering::SeqCst), 1);

    let cached = resolver
        .resolve_name("www.example.com", RecordType::A)
        .await
        .unwrap();
    assert_eq!(
        cached.a_records().collect::<Vec<_>>(),
        [Ipv4Addr::new(93, 184, 216, 34)]
    );
    assert!(cached.answers()[0].ttl() <= 300);
    assert!(cached.answers()[0].ttl() >= 299);
    assert_eq!(queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_truncated_udp_retries_over_tcp() {
    let records: Vec<_> = (1..=60)
        .map(|i| a("big.example.com.", 300, Ipv4Addr::new(198, 51, 100, i)))
        .collect();
    let zone = Zone::new(records);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let socket = UdpSocket::bind(addr).await.unwrap();

    let tcp_queries = spawn_tcp_on(listener, zone.clone());
    let (_, udp_queries) = spawn_udp_on(socket, zone, 512, false);

    let resolver = ResolverBuilder::new()
        .config(ResolverConfig {
            edns: false,
            ..config()
        })
        .name_servers(SequentialProvider::new(vec![addr]))
        .build()
        .unwrap();

    let response = resolver
        .resolve(&Question::a(name("big.example.com.")))
        .await
        .unwrap();

    assert!(!response.is_truncated());
    assert_eq!(response.a_records().count(), 60);
    assert_eq!(udp_queries.load(Ordering::SeqCst), 1);
    assert_eq!(tcp_queries.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_mismatched_id_is_discarded() {
    let zone = Zone::new(vec![a("www.example.com.", 300, Ipv4Addr::new(192, 0, 2, 80))]);
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let (addr, _) = spawn_udp_on(socket, zone, 512, true);

    let resolver = ResolverBuilder::new()
        .config(config())
        .name_servers(SequentialProvider::new(vec![addr]))
        .build()
        .unwrap();

    let response = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap();
    assert_eq!(
        response.a_records().collect::<Vec<_>>(),
        [Ipv4Addr::new(192, 0, 2, 80)]
    );
}

// ============================================================================
// Scripted Transport Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_queries_are_coalesced() {
    let zone = Zone::new(vec![a("www.example.com.", 300, Ipv4Addr::new(192, 0, 2, 1))]);
    let transport = ScriptedTransport::new(zone).with_delay(Duration::from_millis(50));
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 1);

    let question = Question::a(name("www.example.com."));
    let (first, second, third) = tokio::join!(
        resolver.resolve(&question),
        resolver.resolve(&question),
        resolver.resolve_name("www.example.com.", RecordType::A),
    );

    assert_eq!(first.unwrap().a_records().count(), 1);
    assert_eq!(second.unwrap().a_records().count(), 1);
    assert_eq!(third.unwrap().a_records().count(), 1);
    assert_eq!(sends.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_resolutions_leave_nothing_in_flight() {
    let servers = servers(2);
    let transport = ScriptedTransport::new(Zone::default())
        .with_behaviour(servers[0], Behaviour::Silent)
        .with_behaviour(servers[1], Behaviour::Silent);
    let resolver = scripted(
        ResolverConfig {
            query_timeout_ms: 1000,
            resolve_timeout_ms: 1500,
            ..config()
        },
        transport,
        2,
    );

    let questions: Vec<_> = (0..50)
        .map(|i| Question::a(name(&format!("host{i}.example.com."))))
        .collect();
    let results =
        futures::future::join_all(questions.iter().map(|question| resolver.resolve(question)))
            .await;

    assert!(results
        .iter()
        .all(|result| matches!(result, Err(ResolverError::ResolutionTimeout))));
    assert_eq!(resolver.in_flight(), 0);
}

#[tokio::test]
async fn test_truncation_fallback_scripted() {
    let records: Vec<_> = (1..=60)
        .map(|i| a("big.example.com.", 300, Ipv4Addr::new(198, 51, 100, i)))
        .collect();
    let transport = ScriptedTransport::new(Zone::new(records)).with_udp_limit(512);
    let log = transport.log();
    let resolver = scripted(config(), transport, 2);

    let response = resolver
        .resolve(&Question::a(name("big.example.com.")))
        .await
        .unwrap();
    assert_eq!(response.a_records().count(), 60);

    let log = log.lock();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, Protocol::Udp);
    assert_eq!(log[1].0, Protocol::Tcp);
    assert_eq!(log[0].1, log[1].1);
}

#[tokio::test]
async fn test_servfail_advances_to_next_server() {
    let zone = Zone::new(vec![a("www.example.com.", 300, Ipv4Addr::new(192, 0, 2, 1))]);
    let servers = servers(2);
    let transport = ScriptedTransport::new(zone).with_behaviour(servers[0], Behaviour::ServFail);
    let log = transport.log();
    let resolver = scripted(config(), transport, 2);

    let response = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap();
    assert_eq!(response.a_records().count(), 1);

    let log = log.lock();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].1, servers[0]);
    assert_eq!(log[1].1, servers[1]);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_advances_to_next_server() {
    let zone = Zone::new(vec![a("www.example.com.", 300, Ipv4Addr::new(192, 0, 2, 1))]);
    let servers = servers(2);
    let transport = ScriptedTransport::new(zone).with_behaviour(servers[0], Behaviour::Silent);
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 2);

    let response = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap();
    assert_eq!(response.a_records().count(), 1);
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_all_servers_silent() {
    let zone = Zone::default();
    let servers = servers(2);
    let transport = ScriptedTransport::new(zone)
        .with_behaviour(servers[0], Behaviour::Silent)
        .with_behaviour(servers[1], Behaviour::Silent);
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 2);

    let err = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::ResolutionTimeout));
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_resolve_timeout_bounds_resolution() {
    let servers = servers(3);
    let mut transport = ScriptedTransport::new(Zone::default());
    for server in &servers {
        transport = transport.with_behaviour(*server, Behaviour::Silent);
    }
    let sends = transport.sends();
    let resolver = scripted(
        ResolverConfig {
            query_timeout_ms: 400,
            resolve_timeout_ms: 500,
            ..config()
        },
        transport,
        3,
    );

    let err = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::ResolutionTimeout));
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_query_budget_limits_attempts() {
    let servers = servers(3);
    let transport = ScriptedTransport::new(Zone::default())
        .with_behaviour(servers[0], Behaviour::ServFail)
        .with_behaviour(servers[1], Behaviour::ServFail);
    let sends = transport.sends();
    let resolver = scripted(
        ResolverConfig {
            max_queries_per_resolve: 2,
            ..config()
        },
        transport,
        3,
    );

    let err = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap_err();
    assert_eq!(err.rcode(), Some(ResponseCode::ServFail));
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_nxdomain_is_cached_negatively() {
    let transport = ScriptedTransport::new(Zone::default());
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 1);
    let question = Question::a(name("missing.example.com."));

    let err = resolver.resolve(&question).await.unwrap_err();
    assert!(err.is_nxdomain());

    let err = resolver.resolve(&question).await.unwrap_err();
    assert!(err.is_nxdomain());
    assert_eq!(sends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_nodata_is_cached_negatively() {
    let zone = Zone::new(vec![a("www.example.com.", 300, Ipv4Addr::new(192, 0, 2, 1))]);
    let transport = ScriptedTransport::new(zone);
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 1);

    for _ in 0..2 {
        let err = resolver
            .resolve_name("www.example.com.", RecordType::AAAA)
            .await
            .unwrap_err();
        assert!(err.is_no_data());
    }
    assert_eq!(sends.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cname_is_chased() {
    let zone = Zone::new(vec![
        cname("www.example.com.", "cdn.example.net."),
        a("cdn.example.net.", 60, Ipv4Addr::new(203, 0, 113, 9)),
    ]);
    let transport = ScriptedTransport::new(zone);
    let log = transport.log();
    let sends = transport.sends();
    let resolver = scripted(config(), transport, 1);

    let response = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap();
    assert_eq!(response.answers().len(), 2);
    assert!(response.answers()[0].is_cname());
    assert_eq!(
        response.a_records().collect::<Vec<_>>(),
        [Ipv4Addr::new(203, 0, 113, 9)]
    );

    {
        let log = log.lock();
        assert_eq!(log.len(), 2);
        assert_eq!(log[1].2.qname, name("cdn.example.net."));
    }

    // The chain and its target now come from the cache.
    let cached = resolver
        .resolve(&Question::a(name("www.example.com.")))
        .await
        .unwrap();
    assert_eq!(cached.answers().len(), 2);
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cname_loop_fails() {
    let zone = Zone::new(vec![
        cname("a.example.com.", "b.example.com."),
        cname("b.example.com.", "a.example.com."),
    ]);
    let resolver = scripted(config(), ScriptedTransport::new(zone), 1);

    let err = resolver
        .resolve(&Question::a(name("a.example.com.")))
        .await
        .unwrap_err();
    assert_eq!(err.rcode(), Some(ResponseCode::ServFail));
}

#[tokio::test]
async fn test_search_candidates_in_order() {
    let zone = Zone::new(vec![a("db.corp.example.", 300, Ipv4Addr::new(10, 0, 0, 5))]);
    let transport = ScriptedTransport::new(zone);
    let log = transport.log();
    let resolver = scripted(
        ResolverConfig {
            search_domains: vec![name("example.com."), name("corp.example.")],
            ..config()
        },
        transport,
        1,
    );

    let response = resolver.resolve_name("db", RecordType::A).await.unwrap();
    assert_eq!(
        response.a_records().collect::<Vec<_>>(),
        [Ipv4Addr::new(10, 0, 0, 5)]
    );

    let asked: Vec<_> = log.lock().iter().map(|(_, _, q)| q.qname.to_string()).collect();
    assert_eq!(asked, ["db.example.com.", "db.corp.example."]);
}

#[tokio::test]
async fn test_search_exhaustion_reports_last_error() {
    let resolver = scripted(
        ResolverConfig {
            search_domains: vec![name("example.com.")],
            ..config()
        },
        ScriptedTransport::new(Zone::default()),
        1,
    );

    let err = resolver.resolve_name("nothing", RecordType::A).await.unwrap_err();
    match err {
        ResolverError::ResolutionFailed { name: failed, rcode } => {
            assert_eq!(rcode, ResponseCode::NXDomain);
            assert_eq!(failed, name("nothing."));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rotational_provider_spreads_queries() {
    let zone = Zone::new(vec![
        a("one.example.com.", 300, Ipv4Addr::new(192, 0, 2, 1)),
        a("two.example.com.", 300, Ipv4Addr::new(192, 0, 2, 2)),
    ]);
    let transport = ScriptedTransport::new(zone);
    let log = transport.log();
    let resolver = ResolverBuilder::new()
        .config(config())
        .transport(transport)
        .name_servers(RotationalProvider::new(servers(2)))
        .build()
        .unwrap();

    resolver.resolve(&Question::a(name("one.example.com."))).await.unwrap();
    resolver.resolve(&Question::a(name("two.example.com."))).await.unwrap();

    let log = log.lock();
    assert_ne!(log[0].1, log[1].1);
}

#[tokio::test]
async fn test_shutdown_cancels_resolution() {
    let servers = servers(1);
    let transport =
        ScriptedTransport::new(Zone::default()).with_behaviour(servers[0], Behaviour::Silent);
    let resolver = scripted(config(), transport, 1);

    let pending = {
        let resolver = resolver.clone();
        tokio::spawn(async move {
            resolver
                .resolve(&Question::a(name("www.example.com.")))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    resolver.shutdown();
    assert!(resolver.is_shut_down());

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, ResolverError::Cancelled));

    let err = resolver
        .resolve(&Question::a(name("other.example.com.")))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolverError::Cancelled));
}

#[tokio::test]
async fn test_relative_question_rejected() {
    let resolver = scripted(config(), ScriptedTransport::new(Zone::default()), 1);
    let question = Question::a(Name::parse("www", None).unwrap());

    let err = resolver.resolve(&question).await.unwrap_err();
    assert!(matches!(err, ResolverError::Protocol(_)));
}
