//! Integration tests for the connection tracker
//!
//! Covers the full interception lifecycle end to end and hammers the
//! registry from many threads to check the membership invariants hold under
//! true parallelism.

use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::{Arc, Barrier};
use std::thread;

use bytes::Bytes;
use parking_lot::Mutex;

use intercept_track::{
    ConnectionKey, ConnectionRecord, ConnectionRegistry, PacketSink, ReinjectionDriver,
    SocketHandle, SubmitError, SubmitFlags, TrackerConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn key_for(i: u64) -> ConnectionKey {
    ConnectionKey::new(
        Ipv4Addr::new(10, 0, (i >> 8) as u8, i as u8),
        40000 + (i as u16 % 1000),
        Ipv4Addr::new(203, 0, 113, i as u8),
        443,
    )
}

fn make_record(registry: &ConnectionRegistry, i: u64) -> Arc<ConnectionRecord> {
    ConnectionRecord::new(
        key_for(i),
        SocketHandle(i),
        &TrackerConfig::default(),
        registry.stats_handle(),
    )
}

#[derive(Default)]
struct CountingSink {
    submitted: Mutex<Vec<Bytes>>,
}

impl PacketSink for CountingSink {
    fn submit(
        &self,
        _socket: SocketHandle,
        _destination: SocketAddrV4,
        payload: Bytes,
        _control: Option<Bytes>,
        _flags: SubmitFlags,
    ) -> Result<(), SubmitError> {
        self.submitted.lock().push(payload);
        Ok(())
    }
}

#[test]
fn full_interception_lifecycle() {
    init_tracing();

    let config = TrackerConfig::default();
    let registry = ConnectionRegistry::new(&config);
    let sink = Arc::new(CountingSink::default());
    let driver = ReinjectionDriver::new(
        Arc::clone(&sink) as Arc<dyn PacketSink>,
        registry.stats_handle(),
    );

    // First observation: create and register
    let record = make_record(&registry, 1);
    registry.insert(Arc::clone(&record));

    // Packets arrive before the disposition is known
    let dest = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 1), 443);
    for p in [b"syn".as_ref(), b"hello", b"world"] {
        record
            .defer_packet(Bytes::copy_from_slice(p), None, SubmitFlags::NONE, dest)
            .unwrap();
    }

    // Later packets are matched through the registry
    let found = registry.find_by_socket(SocketHandle(1)).unwrap();
    assert!(ConnectionRecord::same_record(&found, &record));
    registry.touch(&found);

    // Disposition decided: drain in order
    driver.drain(&record).unwrap();
    let submitted = sink.submitted.lock().clone();
    assert_eq!(
        submitted.iter().map(AsRef::as_ref).collect::<Vec<_>>(),
        vec![b"syn".as_ref(), b"hello", b"world"]
    );
    assert!(record.queue().is_empty());

    // Teardown: remove, then destroy
    assert!(registry.remove(&record));
    drop(found);
    drop(record);
    assert!(registry.is_empty());

    let stats = registry.stats().snapshot();
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.packets_deferred, 3);
    assert_eq!(stats.packets_reinjected, 3);
    assert_eq!(stats.packets_discarded, 0);
}

#[test]
fn teardown_discards_instead_of_forwarding() {
    init_tracing();

    let config = TrackerConfig::default();
    let registry = ConnectionRegistry::new(&config);
    let sink = Arc::new(CountingSink::default());

    let record = make_record(&registry, 2);
    registry.insert(Arc::clone(&record));

    let dest = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 2), 443);
    record
        .defer_packet(Bytes::from_static(b"a"), None, SubmitFlags::NONE, dest)
        .unwrap();
    record
        .defer_packet(Bytes::from_static(b"b"), None, SubmitFlags::NONE, dest)
        .unwrap();

    assert!(registry.remove(&record));
    drop(record);

    assert!(sink.submitted.lock().is_empty());
    assert_eq!(registry.stats().packets_discarded(), 2);
}

#[test]
fn registry_clear_drops_buffered_packets() {
    init_tracing();

    let config = TrackerConfig::default();
    let registry = ConnectionRegistry::new(&config);
    let dest = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 9), 443);

    for i in 0..4 {
        let record = make_record(&registry, i);
        record
            .defer_packet(Bytes::from_static(b"x"), None, SubmitFlags::NONE, dest)
            .unwrap();
        registry.insert(record);
    }

    assert_eq!(registry.clear(), 4);
    assert!(registry.is_empty());
    assert_eq!(registry.stats().packets_discarded(), 4);
}

#[test]
fn concurrent_insert_remove_stress() {
    init_tracing();

    const INSERTERS: u64 = 8;
    const PER_THREAD: u64 = 32;
    const REMOVED_PER_THREAD: u64 = 16;

    let config = TrackerConfig::default();
    let registry = Arc::new(ConnectionRegistry::new(&config));

    // Pre-create all records so remover threads have stable handles
    let records: Vec<Arc<ConnectionRecord>> = (0..INSERTERS * PER_THREAD)
        .map(|i| make_record(&registry, i))
        .collect();

    let barrier = Arc::new(Barrier::new(INSERTERS as usize));
    let mut handles = Vec::new();

    for t in 0..INSERTERS {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        let chunk: Vec<_> = records
            [(t * PER_THREAD) as usize..((t + 1) * PER_THREAD) as usize]
            .iter()
            .map(Arc::clone)
            .collect();
        handles.push(thread::spawn(move || {
            barrier.wait();
            for r in chunk {
                registry.insert(r);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(registry.len(), (INSERTERS * PER_THREAD) as usize);

    // Concurrently remove the first half of each thread's chunk while other
    // threads touch and look up surviving records.
    let barrier = Arc::new(Barrier::new(INSERTERS as usize * 2));
    let mut handles = Vec::new();

    for t in 0..INSERTERS {
        let remover_registry = Arc::clone(&registry);
        let remover_barrier = Arc::clone(&barrier);
        let doomed: Vec<_> = records
            [(t * PER_THREAD) as usize..(t * PER_THREAD + REMOVED_PER_THREAD) as usize]
            .iter()
            .map(Arc::clone)
            .collect();
        handles.push(thread::spawn(move || {
            remover_barrier.wait();
            for r in doomed {
                assert!(remover_registry.remove(&r));
            }
        }));

        let toucher_registry = Arc::clone(&registry);
        let toucher_barrier = Arc::clone(&barrier);
        let survivors: Vec<_> = records
            [(t * PER_THREAD + REMOVED_PER_THREAD) as usize..((t + 1) * PER_THREAD) as usize]
            .iter()
            .map(Arc::clone)
            .collect();
        handles.push(thread::spawn(move || {
            toucher_barrier.wait();
            for r in survivors {
                toucher_registry.touch(&r);
                let found = toucher_registry.find_by_socket(r.socket()).unwrap();
                assert!(ConnectionRecord::same_record(&found, &r));
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    // Membership equals inserted minus removed
    let expected: HashSet<ConnectionKey> = (0..INSERTERS)
        .flat_map(|t| (t * PER_THREAD + REMOVED_PER_THREAD)..((t + 1) * PER_THREAD))
        .map(key_for)
        .collect();
    let walk = registry.snapshot_keys();
    assert_eq!(walk.len(), expected.len());
    let actual: HashSet<ConnectionKey> = walk.into_iter().collect();
    assert_eq!(actual, expected);

    let stats = registry.stats();
    assert_eq!(stats.inserted(), INSERTERS * PER_THREAD);
    assert_eq!(stats.removed(), INSERTERS * REMOVED_PER_THREAD);
}

#[test]
fn concurrent_defer_and_drain() {
    init_tracing();

    let config = TrackerConfig::default();
    let registry = ConnectionRegistry::new(&config);
    let sink = Arc::new(CountingSink::default());
    let driver = Arc::new(ReinjectionDriver::new(
        Arc::clone(&sink) as Arc<dyn PacketSink>,
        registry.stats_handle(),
    ));

    let record = make_record(&registry, 5);
    registry.insert(Arc::clone(&record));
    let dest = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 5), 443);

    // Writers race with a drainer; every packet must come out exactly once,
    // either via the sink or still queued at the end.
    let barrier = Arc::new(Barrier::new(5));
    let mut handles = Vec::new();
    for w in 0..4u8 {
        let record = Arc::clone(&record);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..50u8 {
                record
                    .defer_packet(
                        Bytes::copy_from_slice(&[w, i]),
                        None,
                        SubmitFlags::NONE,
                        dest,
                    )
                    .unwrap();
            }
        }));
    }
    {
        let record = Arc::clone(&record);
        let driver = Arc::clone(&driver);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..8 {
                driver.drain(&record).unwrap();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    driver.drain(&record).unwrap();

    let submitted = sink.submitted.lock();
    assert_eq!(submitted.len(), 200);
    let unique: HashSet<&[u8]> = submitted.iter().map(AsRef::as_ref).collect();
    assert_eq!(unique.len(), 200);
    assert!(record.queue().is_empty());
}
