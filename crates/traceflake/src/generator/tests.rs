use std::collections::HashSet;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};
use std::thread::scope;

use crate::{
    BasicTraceIdGenerator, Error, LockTraceIdGenerator, NodeId, Poll, SystemClock, TimeSource,
    TraceId, TraceIdGenerator, time::unix_now_millis,
};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
#[derive(Clone, Default)]
struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    fn at(millis: u64) -> Self {
        let clock = Self::default();
        clock.set(millis);
        clock
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Replays `values` one read at a time, then repeats the last value.
struct ScriptedClock {
    values: Vec<u64>,
    reads: AtomicUsize,
}

impl ScriptedClock {
    fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            reads: AtomicUsize::new(0),
        }
    }
}

impl TimeSource for ScriptedClock {
    fn current_millis(&self) -> u64 {
        let i = self.reads.fetch_add(1, Ordering::SeqCst);
        self.values[i.min(self.values.len() - 1)]
    }
}

trait PollExt {
    fn unwrap_ready(self) -> TraceId;
    fn unwrap_pending(self) -> u64;
}

impl PollExt for Poll<TraceId> {
    fn unwrap_ready(self) -> TraceId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn node(value: i64) -> NodeId {
    NodeId::new(value).unwrap()
}

fn run_sequence_increments_within_same_tick<G: TraceIdGenerator>(generator: &G) {
    let id1 = generator.poll_id().unwrap().unwrap_ready();
    let id2 = generator.poll_id().unwrap().unwrap_ready();
    let id3 = generator.poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_returns_pending_when_sequence_exhausted<G: TraceIdGenerator>(generator: &G) {
    let yield_for = generator.poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
    // still exhausted on a second poll within the same tick
    assert_eq!(generator.poll_id().unwrap().unwrap_pending(), 1);
}

fn run_rollover_advances_the_millisecond<G: TraceIdGenerator>(generator: &G) {
    let mut ids = Vec::with_capacity(4097);
    for _ in 0..4097 {
        ids.push(generator.next_id().unwrap());
    }

    for (i, id) in ids[..4096].iter().enumerate() {
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i as u64);
    }
    let last = ids[4096];
    assert!(last.timestamp() > ids[4095].timestamp());
    assert_eq!(last.timestamp(), 43);
    assert_eq!(last.sequence(), 0);

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

fn run_clock_regression_is_an_error<G: TraceIdGenerator>(generator: &G, clock: &ManualClock) {
    let before = generator.next_id().unwrap();
    assert_eq!(before.timestamp(), 1_000);

    clock.set(900);
    assert_eq!(
        generator.next_id(),
        Err(Error::ClockRegression { behind_ms: 100 })
    );
    assert_eq!(
        generator.poll_id(),
        Err(Error::ClockRegression { behind_ms: 100 })
    );

    // the failed calls did not disturb the state
    clock.set(1_000);
    let after = generator.next_id().unwrap();
    assert_eq!(after.timestamp(), 1_000);
    assert_eq!(after.sequence(), before.sequence() + 1);
    assert!(after > before);
}

fn run_monotonic_and_unique<G: TraceIdGenerator>(generator: &G, expected_node: u64) {
    const TOTAL_IDS: usize = 4096 * 16;

    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    let mut last = None;
    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        assert_eq!(id.node_id(), expected_node);
        if let Some(prev) = last {
            assert!(id > prev, "{id:?} not after {prev:?}");
            if id.timestamp() > prev.timestamp() {
                assert_eq!(id.sequence(), 0);
            } else {
                assert_eq!(id.sequence(), prev.sequence() + 1);
            }
        }
        assert!(seen.insert(id));
        last = Some(id);
    }
}

fn run_ids_are_decimal_and_recover_their_time<G: TraceIdGenerator>(generator: &G) {
    for _ in 0..1_000 {
        let before = unix_now_millis();
        let id = generator.next_id().unwrap();
        let s = id.to_string();
        assert!(!s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()), "{s}");
        assert!(crate::is_well_formed(&s));

        let minted = id.unix_millis();
        assert!(minted.abs_diff(before) < 50, "{minted} vs {before}");
    }
}

#[test]
fn basic_generator_sequence_test() {
    let generator = BasicTraceIdGenerator::new(node(0), MockTime { millis: 42 });
    run_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_sequence_test() {
    let generator = LockTraceIdGenerator::new(node(0), MockTime { millis: 42 });
    run_sequence_increments_within_same_tick(&generator);
}

#[test]
fn basic_generator_pending_test() {
    let generator = BasicTraceIdGenerator::from_components(
        0,
        node(0),
        TraceId::max_sequence(),
        MockTime { millis: 0 },
    );
    run_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_pending_test() {
    let generator = LockTraceIdGenerator::from_components(
        0,
        node(0),
        TraceId::max_sequence(),
        MockTime { millis: 0 },
    );
    run_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn basic_generator_rollover_test() {
    // 4096 reads fill tick 42, the 4097th read finds it exhausted, the next
    // read moves on to 43
    let mut values = vec![42; 4097];
    values.push(43);
    let generator = BasicTraceIdGenerator::new(node(1), ScriptedClock::new(values));
    run_rollover_advances_the_millisecond(&generator);
}

#[test]
fn lock_generator_rollover_test() {
    let mut values = vec![42; 4097];
    values.push(43);
    let generator = LockTraceIdGenerator::new(node(1), ScriptedClock::new(values));
    run_rollover_advances_the_millisecond(&generator);
}

#[test]
fn rollover_waits_through_the_callback() {
    let clock = ManualClock::at(42);
    let generator =
        BasicTraceIdGenerator::from_components(42, node(5), TraceId::max_sequence(), &clock);

    let mut waits = 0;
    let id = generator
        .next_id_with(|yield_for| {
            assert_eq!(yield_for, 1);
            waits += 1;
            if waits == 3 {
                clock.set(43);
            }
        })
        .unwrap();

    assert_eq!(waits, 3);
    assert_eq!(id.to_components(), (43, 5, 0));
}

#[test]
fn regression_during_wait_is_reported() {
    let clock = ManualClock::at(42);
    let generator =
        BasicTraceIdGenerator::from_components(42, node(5), TraceId::max_sequence(), &clock);

    let result = generator.next_id_with(|_| clock.set(30));
    assert_eq!(result, Err(Error::ClockRegression { behind_ms: 12 }));
}

#[test]
fn basic_generator_clock_regression_test() {
    let clock = ManualClock::at(1_000);
    let generator = BasicTraceIdGenerator::new(node(9), clock.clone());
    run_clock_regression_is_an_error(&generator, &clock);
}

#[test]
fn lock_generator_clock_regression_test() {
    let clock = ManualClock::at(1_000);
    let generator = LockTraceIdGenerator::new(node(9), clock.clone());
    run_clock_regression_is_an_error(&generator, &clock);
}

#[test]
fn timestamp_overflow_is_an_error() {
    let now = TraceId::max_timestamp() + 1;
    let generator = BasicTraceIdGenerator::new(node(0), MockTime { millis: now });
    assert_eq!(
        generator.next_id(),
        Err(Error::TimestampOverflow { millis: now })
    );
}

#[test]
fn max_node_id_round_trips() {
    let generator = BasicTraceIdGenerator::new(node(1023), MockTime { millis: 7 });
    let id = generator.next_id().unwrap();
    assert_eq!(id.to_components(), (7, 1023, 0));
    assert_eq!(generator.node_id().get(), 1023);
}

#[test]
fn basic_generator_monotonic_clock_test() {
    let generator = BasicTraceIdGenerator::new(node(1), SystemClock::new().unwrap());
    run_monotonic_and_unique(&generator, 1);
}

#[test]
fn lock_generator_monotonic_clock_test() {
    let generator = LockTraceIdGenerator::new(node(1), SystemClock::new().unwrap());
    run_monotonic_and_unique(&generator, 1);
}

#[test]
fn basic_generator_format_and_timestamp_test() {
    let generator = BasicTraceIdGenerator::new(node(2), SystemClock::new().unwrap());
    run_ids_are_decimal_and_recover_their_time(&generator);
}

#[test]
fn lock_generator_format_and_timestamp_test() {
    let generator = LockTraceIdGenerator::new(node(2), SystemClock::new().unwrap());
    run_ids_are_decimal_and_recover_their_time(&generator);
}

#[test]
fn lock_generator_threaded_uniqueness_test() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096 * 4;
    const TOTAL_IDS: usize = THREADS * IDS_PER_THREAD;

    let generator = LockTraceIdGenerator::new(node(3), SystemClock::new().unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = generator.clone();
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut last = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap();
                    // each thread observes a strictly increasing stream
                    assert!(last.is_none_or(|prev| id > prev));
                    last = Some(id);
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn generators_format_with_debug() {
    let basic = BasicTraceIdGenerator::from_components(5, node(4), 2, MockTime { millis: 5 });
    let text = format!("{basic:?}");
    assert!(text.starts_with("BasicTraceIdGenerator { last: TraceId {"));
    assert!(text.contains("timestamp: 5"));
    assert!(text.ends_with(".. }"));

    let lock = LockTraceIdGenerator::new(node(4), MockTime { millis: 5 });
    assert_eq!(
        format!("{lock:?}"),
        "LockTraceIdGenerator { node_id: NodeId(4), .. }"
    );
}
