//! Conversion between Unix time and the 60-bit UUID timestamp
//!
//! UUID timestamps count 100-nanosecond intervals since the Gregorian epoch (1582-10-15
//! 00:00:00 UTC), whereas this crate handles time as `msecs` (integer milliseconds since the Unix
//! epoch) plus `nsecs` (the residual 100-nanosecond intervals within that millisecond). The
//! arithmetic below is split into high and low 32-bit halves so that no intermediate value
//! exceeds 53 bits of magnitude.

/// Number of 100-nanosecond intervals between the Gregorian epoch and the Unix epoch.
pub const GREGORIAN_OFFSET: u64 = 122_192_928_000_000_000;

/// Number of 100-nanosecond intervals in a millisecond.
pub const NSECS_PER_MSEC: u16 = 10_000;

/// Smallest `msecs` representable by a UUID timestamp (the Gregorian epoch).
pub const MIN_MSECS: i64 = -12_219_292_800_000;

/// Largest `msecs` at which every `nsecs` value is representable by a UUID timestamp.
///
/// The 60-bit field ends at `(MAX_MSECS + 1, 6975)`, so the following millisecond is only
/// partially representable and is excluded.
pub const MAX_MSECS: i64 = 103_072_857_660_683;

const TWO_32: i64 = 1 << 32;
const TICKS: i64 = NSECS_PER_MSEC as i64;
const OFFSET_HI: i64 = (GREGORIAN_OFFSET >> 32) as i64;
const OFFSET_LO: i64 = (GREGORIAN_OFFSET & 0xffff_ffff) as i64;

/// The three timestamp fields of a version 1 UUID.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TimeFields {
    /// Low 32 bits of the timestamp.
    pub time_low: u32,
    /// Middle 16 bits of the timestamp.
    pub time_mid: u16,
    /// High 12 bits of the timestamp.
    pub time_hi: u16,
}

impl TimeFields {
    /// Returns the 60-bit timestamp the fields represent.
    pub const fn ticks(&self) -> u64 {
        ((self.time_hi as u64 & 0xfff) << 48) | ((self.time_mid as u64) << 32) | self.time_low as u64
    }

    /// Splits a 60-bit timestamp into fields.
    ///
    /// # Panics
    ///
    /// Panics if `ticks` is not a 60-bit integer.
    pub const fn from_ticks(ticks: u64) -> Self {
        if ticks >= 1 << 60 {
            panic!("`ticks` must be a 60-bit integer");
        }
        Self {
            time_low: ticks as u32,
            time_mid: (ticks >> 32) as u16,
            time_hi: (ticks >> 48) as u16,
        }
    }
}

/// Converts a Unix time to UUID timestamp fields.
///
/// # Examples
///
/// ```rust
/// use uuid14::timestamp::{to_uuid_epoch, TimeFields};
///
/// let fields = to_uuid_epoch(1321651533573, 5432);
/// assert_eq!(
///     fields,
///     TimeFields { time_low: 0xd9428888, time_mid: 0x122b, time_hi: 0x1e1 }
/// );
/// ```
///
/// # Panics
///
/// Panics if `nsecs` is not less than 10000 or if the time does not fit in the 60-bit timestamp.
/// Any `msecs` from [`MIN_MSECS`] to [`MAX_MSECS`] fits with any valid `nsecs`.
pub fn to_uuid_epoch(msecs: i64, nsecs: u16) -> TimeFields {
    assert!(nsecs < NSECS_PER_MSEC, "`nsecs` must be less than 10000");

    let lo = msecs % TWO_32;
    let mut hi = (msecs - lo) / TWO_32 * TICKS + OFFSET_HI;
    let lo = lo * TICKS + nsecs as i64 + OFFSET_LO;

    let mut rem = lo % TWO_32;
    hi += (lo - rem) / TWO_32;
    if rem < 0 {
        // borrow from the high half
        rem += TWO_32;
        hi -= 1;
    }

    assert!(
        (0..1 << 28).contains(&hi),
        "`msecs` out of the range of UUID timestamp"
    );
    TimeFields {
        time_low: rem as u32,
        time_mid: (hi & 0xffff) as u16,
        time_hi: (hi >> 16) as u16,
    }
}

/// Converts UUID timestamp fields back to a Unix time, returning `(msecs, nsecs)`.
///
/// The result is floored to the millisecond, so `nsecs` is always in `0..10000` even for times
/// before the Unix epoch.
pub fn from_uuid_epoch(fields: TimeFields) -> (i64, u16) {
    let hi = ((fields.time_hi as i64 & 0xfff) << 16) + fields.time_mid as i64 - OFFSET_HI;
    let rem_hi = hi.rem_euclid(TICKS);
    let hi = hi.div_euclid(TICKS);

    let lo = fields.time_low as i64 - OFFSET_LO;
    let rem_lo = lo.rem_euclid(TICKS);
    let lo = lo.div_euclid(TICKS);

    let rem = rem_hi * TWO_32 + rem_lo;
    let nsecs = rem % TICKS;
    let msecs = hi * TWO_32 + lo + rem / TICKS;
    (msecs, nsecs as u16)
}
