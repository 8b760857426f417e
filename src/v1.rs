//! UUIDv1 generator and related types

use crate::entropy::EntropySource;
use crate::timestamp::{self, TimeFields, NSECS_PER_MSEC};
use crate::Uuid;

/// Largest value of the 14-bit clock sequence.
const MAX_CLOCK_SEQ: u16 = (1 << 14) - 1;

impl Uuid {
    /// Creates a UUID byte array from UUIDv1 field values.
    ///
    /// # Panics
    ///
    /// Panics if `time.time_hi` is not a 12-bit integer or `clock_seq` is not a 14-bit integer.
    pub const fn from_fields_v1(time: TimeFields, clock_seq: u16, node: [u8; 6]) -> Self {
        if time.time_hi >= 1 << 12 || clock_seq > MAX_CLOCK_SEQ {
            panic!("invalid field value");
        }

        Self([
            (time.time_low >> 24) as u8,
            (time.time_low >> 16) as u8,
            (time.time_low >> 8) as u8,
            time.time_low as u8,
            (time.time_mid >> 8) as u8,
            time.time_mid as u8,
            0x10 | (time.time_hi >> 8) as u8,
            time.time_hi as u8,
            0x80 | (clock_seq >> 8) as u8,
            clock_seq as u8,
            node[0],
            node[1],
            node[2],
            node[3],
            node[4],
            node[5],
        ])
    }
}

/// Error generating a UUID.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// More than 10000 UUIDs were requested within the same millisecond.
    #[error("cannot create more than 10M uuids/sec")]
    RateExceeded,

    /// The entropy source supplied by the caller failed.
    #[error("entropy source failed: {0}")]
    Entropy(#[from] rand::Error),
}

/// Per-call overrides for [`V1Generator::generate_with`].
///
/// Every field defaults to `None`, meaning the live clock or the generator state is used.
///
/// # Examples
///
/// ```rust
/// use uuid14::{V1Generator, V1Options};
///
/// let mut g = V1Generator::new([0u8; 16]);
/// let uuid = g.generate_with(&V1Options {
///     msecs: Some(1321651533573),
///     nsecs: Some(5432),
///     clock_seq: Some(0x385c),
///     node: Some([0x61, 0xcd, 0x3c, 0xbb, 0x32, 0x10]),
/// })?;
/// assert_eq!(uuid.to_string(), "d9428888-122b-11e1-b85c-61cd3cbb3210");
/// # Ok::<(), uuid14::GenerateError>(())
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct V1Options {
    /// Unix time in milliseconds.
    pub msecs: Option<i64>,

    /// 100-nanosecond intervals within the millisecond, less than 10000.
    pub nsecs: Option<u16>,

    /// Clock sequence; only the low 14 bits are used.
    pub clock_seq: Option<u16>,

    /// Node ID.
    pub node: Option<[u8; 6]>,
}

/// Clock sequence tracker that keeps successive UUIDv1 timestamps ordered and distinguishable.
///
/// Each call to [`ClockState::advance`] takes a candidate time and yields the `nsecs` and clock
/// sequence to encode. Within one millisecond, `nsecs` counts up from zero to simulate a
/// 100-nanosecond clock; a new millisecond resets it. When the clock is observed to go backwards,
/// the clock sequence is incremented so that the new UUIDs cannot collide with earlier ones.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ClockState {
    last_msecs: i64,
    last_nsecs: u16,
    clock_seq: u16,
}

impl ClockState {
    /// Creates a tracker with the initial clock sequence, of which only the low 14 bits are used.
    pub const fn new(clock_seq: u16) -> Self {
        Self {
            last_msecs: 0,
            last_nsecs: 0,
            clock_seq: clock_seq & MAX_CLOCK_SEQ,
        }
    }

    /// Returns the current clock sequence.
    pub const fn clock_seq(&self) -> u16 {
        self.clock_seq
    }

    /// Returns the `(msecs, nsecs)` pair of the most recent successful call.
    pub const fn last_time(&self) -> (i64, u16) {
        (self.last_msecs, self.last_nsecs)
    }

    /// Moves the state to `msecs` and returns the `(nsecs, clock_seq)` to use for it.
    ///
    /// Explicit `nsecs` or `clock_seq` values are used as given rather than derived from the
    /// state, but still become the basis for the next call. The state is left untouched on error.
    pub fn advance(
        &mut self,
        msecs: i64,
        nsecs: Option<u16>,
        clock_seq: Option<u16>,
    ) -> Result<(u16, u16), GenerateError> {
        let mut next_clock_seq = clock_seq.map_or(self.clock_seq, |e| e & MAX_CLOCK_SEQ);
        let mut next_nsecs = nsecs.unwrap_or(self.last_nsecs + 1);

        // elapsed time in 100-nanosecond units
        let dt = (msecs as i128 - self.last_msecs as i128) * NSECS_PER_MSEC as i128
            + (next_nsecs as i128 - self.last_nsecs as i128);

        if dt < 0 && clock_seq.is_none() {
            next_clock_seq = (next_clock_seq + 1) & MAX_CLOCK_SEQ;
            tracing::debug!(
                msecs,
                last_msecs = self.last_msecs,
                clock_seq = next_clock_seq,
                "clock regression; bumped clock sequence"
            );
        }

        if (dt < 0 || msecs > self.last_msecs) && nsecs.is_none() {
            next_nsecs = 0;
        }

        if next_nsecs >= NSECS_PER_MSEC {
            tracing::debug!(msecs, "more than 10000 uuids requested within a millisecond");
            return Err(GenerateError::RateExceeded);
        }

        self.last_msecs = msecs;
        self.last_nsecs = next_nsecs;
        self.clock_seq = next_clock_seq;
        Ok((next_nsecs, next_clock_seq))
    }
}

/// Represents a UUIDv1 generator that owns a clock sequence tracker and a node ID.
///
/// The generator guarantees that UUIDs generated by it in increasing wall-clock order carry
/// increasing timestamps, and that a clock rollback bumps the clock sequence. Wrap the generator
/// in a [`Mutex`](std::sync::Mutex) to share the guarantee across threads, as the process-wide
/// generator behind [`uuid1`](crate::uuid1) does.
///
/// # Examples
///
/// ```rust
/// use uuid14::{entropy::Entropy, V1Generator};
///
/// let mut g = V1Generator::with_entropy(&mut Entropy::select())?;
/// let uuid = g.generate()?;
/// assert_eq!(uuid.version(), Some(1));
/// # Ok::<(), uuid14::GenerateError>(())
/// ```
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct V1Generator {
    state: ClockState,
    node_id: [u8; 6],
}

impl V1Generator {
    /// Creates a generator from 16 random bytes.
    ///
    /// The first six bytes become the node ID, with the multicast bit set to mark it as not
    /// being an IEEE 802 address, and the next two seed the 14-bit clock sequence.
    pub const fn new(seed: [u8; 16]) -> Self {
        Self {
            state: ClockState::new(((seed[6] as u16) << 8) | seed[7] as u16),
            node_id: [seed[0] | 0x01, seed[1], seed[2], seed[3], seed[4], seed[5]],
        }
    }

    /// Creates a generator seeded from an entropy source.
    pub fn with_entropy<E: EntropySource + ?Sized>(source: &mut E) -> Result<Self, GenerateError> {
        Ok(Self::new(source.next_16_bytes()?))
    }

    /// Returns the node ID used unless overridden.
    pub const fn node_id(&self) -> [u8; 6] {
        self.node_id
    }

    /// Returns the clock sequence tracker.
    pub const fn state(&self) -> &ClockState {
        &self.state
    }

    /// Generates a new UUIDv1 object from the current time.
    pub fn generate(&mut self) -> Result<Uuid, GenerateError> {
        self.generate_with(&V1Options::default())
    }

    /// Generates a new UUIDv1 object, applying the overrides given.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::RateExceeded`] if the resulting `nsecs` reaches 10000, i.e. when
    /// more than 10000 UUIDs are requested within the same millisecond.
    ///
    /// # Panics
    ///
    /// Panics if `msecs` is outside the range from [`MIN_MSECS`](timestamp::MIN_MSECS) to
    /// [`MAX_MSECS`](timestamp::MAX_MSECS). The generator state is left untouched in that case.
    pub fn generate_with(&mut self, options: &V1Options) -> Result<Uuid, GenerateError> {
        let msecs = options
            .msecs
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        assert!(
            (timestamp::MIN_MSECS..=timestamp::MAX_MSECS).contains(&msecs),
            "`msecs` out of the range of UUID timestamp"
        );

        // commit the new state only once the UUID is fully built
        let mut state = self.state.clone();
        let (nsecs, clock_seq) = state.advance(msecs, options.nsecs, options.clock_seq)?;
        let uuid = Uuid::from_fields_v1(
            timestamp::to_uuid_epoch(msecs, nsecs),
            clock_seq,
            options.node.unwrap_or(self.node_id),
        );
        self.state = state;
        Ok(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClockState, GenerateError, V1Generator, V1Options};
    use crate::{parse_fields, Uuid};

    const TIME: i64 = 1321644961388;

    fn new_gen() -> V1Generator {
        V1Generator::new([0x5a; 16])
    }

    fn at(msecs: i64) -> V1Options {
        V1Options {
            msecs: Some(msecs),
            ..Default::default()
        }
    }

    /// Decodes `(msecs, nsecs)` from a UUIDv1.
    fn time_of(uuid: Uuid) -> (i64, u16) {
        let f = uuid.fields().v1.unwrap();
        (f.msecs, f.nsecs)
    }

    /// Produces the expected UUID from explicit options
    #[test]
    fn produces_the_expected_uuid_from_explicit_options() {
        let uuid = new_gen()
            .generate_with(&V1Options {
                msecs: Some(1321651533573),
                nsecs: Some(5432),
                clock_seq: Some(0x385c),
                node: Some([0x61, 0xcd, 0x3c, 0xbb, 0x32, 0x10]),
            })
            .unwrap();
        assert_eq!(uuid.to_string(), "d9428888-122b-11e1-b85c-61cd3cbb3210");
    }

    /// Derives node ID and clock sequence from seed
    #[test]
    fn derives_node_id_and_clock_sequence_from_seed() {
        let g = V1Generator::new([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0xff, 0xee, 0, 0, 0, 0, 0, 0, 0, 0,
        ]);
        assert_eq!(g.node_id(), [0x01, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(g.state().clock_seq(), 0x3fee);
    }

    /// Creates different UUIDs within the same millisecond
    #[test]
    fn creates_different_uuids_within_the_same_millisecond() {
        let mut g = new_gen();
        let a = g.generate_with(&at(TIME)).unwrap();
        let b = g.generate_with(&at(TIME)).unwrap();
        assert_ne!(a, b);
        assert_eq!(time_of(a), (TIME, 0));
        assert_eq!(time_of(b), (TIME, 1));
    }

    /// Fails when more than 10k UUIDs are created in a millisecond
    #[test]
    fn fails_when_more_than_10k_uuids_are_created_in_a_millisecond() {
        let mut g = new_gen();
        let r = g.generate_with(&V1Options {
            nsecs: Some(10_000),
            ..at(TIME)
        });
        assert!(matches!(r, Err(GenerateError::RateExceeded)));

        g.generate_with(&V1Options {
            nsecs: Some(9_999),
            ..at(TIME)
        })
        .unwrap();
        let before = g.state().clone();
        assert!(matches!(
            g.generate_with(&at(TIME)),
            Err(GenerateError::RateExceeded)
        ));
        assert_eq!(g.state(), &before);

        // recovers once the millisecond advances
        assert_eq!(time_of(g.generate_with(&at(TIME + 1)).unwrap()), (TIME + 1, 0));
    }

    /// Counts up to 10k UUIDs within a millisecond
    #[test]
    fn counts_up_to_10k_uuids_within_a_millisecond() {
        let mut g = new_gen();
        let mut prev = time_of(g.generate_with(&at(TIME)).unwrap());
        for _ in 1..10_000 {
            let curr = time_of(g.generate_with(&at(TIME)).unwrap());
            assert!(prev < curr);
            prev = curr;
        }
        assert_eq!(prev, (TIME, 9_999));
        assert!(g.generate_with(&at(TIME)).is_err());
    }

    /// Bumps clock sequence on clock regression
    #[test]
    fn bumps_clock_sequence_on_clock_regression() {
        let mut g = new_gen();
        let f0 = g.generate_with(&at(TIME)).unwrap().fields().v1.unwrap();
        let f1 = g.generate_with(&at(TIME - 1)).unwrap().fields().v1.unwrap();
        assert_eq!(f1.clock_seq, (f0.clock_seq + 1) & 0x3fff);
        assert_eq!((f1.msecs, f1.nsecs), (TIME - 1, 0));
    }

    /// Wraps clock sequence around 14 bits
    #[test]
    fn wraps_clock_sequence_around_14_bits() {
        let mut s = ClockState::new(0xffff);
        assert_eq!(s.clock_seq(), 0x3fff);
        s.advance(TIME, None, None).unwrap();
        assert_eq!(s.advance(TIME - 1, None, None).unwrap(), (0, 0));
        assert_eq!(s.clock_seq(), 0);
    }

    /// Keeps explicit clock sequence on clock regression
    #[test]
    fn keeps_explicit_clock_sequence_on_clock_regression() {
        let mut s = ClockState::new(0x1234);
        s.advance(TIME, None, None).unwrap();
        assert_eq!(s.advance(TIME - 1, None, Some(0x0abc)).unwrap(), (0, 0x0abc));
        assert_eq!(s.clock_seq(), 0x0abc);
        assert_eq!(s.advance(TIME - 1, None, None).unwrap(), (1, 0x0abc));
        assert_eq!(s.last_time(), (TIME - 1, 1));
    }

    /// Spaces UUIDs across a millisecond boundary 100ns apart
    #[test]
    fn spaces_uuids_across_a_millisecond_boundary_100ns_apart() {
        let mut g = new_gen();
        let u0 = g
            .generate_with(&V1Options {
                nsecs: Some(9_999),
                ..at(TIME)
            })
            .unwrap();
        let u1 = g
            .generate_with(&V1Options {
                nsecs: Some(0),
                ..at(TIME + 1)
            })
            .unwrap();
        let low = |e: Uuid| u32::from_be_bytes([e.0[0], e.0[1], e.0[2], e.0[3]]);
        assert_eq!(low(u1).wrapping_sub(low(u0)), 1);
    }

    /// Orders UUIDs generated at explicit increasing times
    #[test]
    fn orders_uuids_generated_at_explicit_increasing_times() {
        let mut g = new_gen();
        let times = [
            TIME - 10 * 3600 * 1000,
            TIME - 1,
            TIME,
            TIME + 1,
            TIME + 28 * 24 * 3600 * 1000,
        ];
        let decoded: Vec<(i64, u16)> = times
            .iter()
            .map(|e| time_of(g.generate_with(&at(*e)).unwrap()))
            .collect();
        let mut sorted = decoded.clone();
        sorted.sort();
        assert_eq!(decoded, sorted);
        assert!(decoded.iter().zip(times).all(|(d, t)| d.0 == t));
    }

    /// Orders UUIDs generated back to back
    #[test]
    fn orders_uuids_generated_back_to_back() {
        let mut g = new_gen();
        let decoded: Vec<(i64, u16)> = (0..1_000)
            .map(|_| time_of(g.generate().unwrap()))
            .collect();
        for w in decoded.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }

    /// Sets version and variant on every UUID
    #[test]
    fn sets_version_and_variant_on_every_uuid() {
        let mut g = new_gen();
        for i in 0..1_000 {
            let e = g.generate_with(&at(TIME + i)).unwrap();
            assert_eq!(parse_fields(&e.to_string()).version, Some(1));
            assert_eq!(e.as_bytes()[8] & 0xc0, 0x80);
            assert_eq!(e.as_bytes()[10..], [0x5b, 0x5a, 0x5a, 0x5a, 0x5a, 0x5a]);
        }
    }

    /// Encodes the last representable millisecond with any nsecs
    #[test]
    fn encodes_the_last_representable_millisecond_with_any_nsecs() {
        use crate::timestamp::{MAX_MSECS, MIN_MSECS};

        let mut g = new_gen();
        let e = g
            .generate_with(&V1Options {
                nsecs: Some(9_999),
                ..at(MAX_MSECS)
            })
            .unwrap();
        assert_eq!(time_of(e), (MAX_MSECS, 9_999));
        assert_eq!(g.state().last_time(), (MAX_MSECS, 9_999));

        let e = g.generate_with(&at(MIN_MSECS)).unwrap();
        assert_eq!(time_of(e), (MIN_MSECS, 0));
    }

    /// Leaves state untouched on out-of-range msecs
    #[test]
    fn leaves_state_untouched_on_out_of_range_msecs() {
        use crate::timestamp::MAX_MSECS;
        use std::panic::{catch_unwind, AssertUnwindSafe};

        let mut g = new_gen();
        g.generate_with(&at(TIME)).unwrap();
        let before = g.state().clone();
        for msecs in [MAX_MSECS + 1, i64::MAX, i64::MIN] {
            let r = catch_unwind(AssertUnwindSafe(|| {
                g.generate_with(&V1Options {
                    nsecs: Some(9_999),
                    ..at(msecs)
                })
            }));
            assert!(r.is_err());
            assert_eq!(g.state(), &before);
        }
    }

    /// Panics on out-of-range field values
    #[test]
    #[should_panic]
    fn panics_on_out_of_range_field_values() {
        let _ = Uuid::from_fields_v1(
            crate::timestamp::TimeFields {
                time_low: 0,
                time_mid: 0,
                time_hi: 1 << 12,
            },
            0,
            [0; 6],
        );
    }
}
