//! Time-based (version 1) and random (version 4) UUIDs as specified by RFC 4122
//!
//! ```rust
//! use uuid14::{uuid1, uuid4};
//!
//! let uuid = uuid1()?;
//! println!("{}", uuid); // e.g. "d9428888-122b-11e1-b85c-61cd3cbb3210"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//!
//! let uuid = uuid4();
//! println!("{}", uuid); // e.g. "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
//! # Ok::<(), uuid14::GenerateError>(())
//! ```
//!
//! See [RFC 4122](https://www.rfc-editor.org/rfc/rfc4122).
//!
//! # Field and bit layout
//!
//! This implementation produces version 1 identifiers with the following bit layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                           time_low                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |           time_mid            |  ver  |        time_hi        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|         clock_seq         |             node              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             node                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 60-bit timestamp (`time_hi`, `time_mid`, `time_low`) counts 100-nanosecond intervals
//!   since the Gregorian epoch, 1582-10-15 00:00:00 UTC.
//! - The 4-bit `ver` field is set at `0001`.
//! - The 2-bit `var` field is set at `10`.
//! - The 14-bit `clock_seq` field is randomly initialized and incremented whenever the system
//!   clock is observed to move backwards.
//! - The 48-bit `node` field is a random value with the multicast bit set, unless one is given.
//!
//! The system clock only has millisecond resolution, so UUIDs generated within the same
//! millisecond are given successive 100-nanosecond offsets. A generator can therefore issue at
//! most 10000 UUIDs per millisecond, and returns [`GenerateError::RateExceeded`] beyond that.
//!
//! # Parsing and validation
//!
//! [`str::parse`] accepts only the canonical form checked by [`validate`], whereas
//! [`Uuid::parse_lenient`] picks up hexadecimal digit pairs from any string. [`parse_fields`]
//! decodes the version, and for version 1 the timestamp, clock sequence, and node.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod uuid;
pub use uuid::{stringify, validate, ParseError, Uuid, Variant};

pub mod entropy;
pub mod timestamp;

mod fields;
pub use fields::{parse_fields, Fields, V1Fields};

mod v1;
pub use v1::{ClockState, GenerateError, V1Generator, V1Options};

mod v4;
pub use v4::uuid4_from;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{uuid1, uuid1_with, uuid4};
