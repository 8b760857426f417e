//! Decoding the semantic content of a UUID

use chrono::{DateTime, Utc};

use crate::timestamp::{self, TimeFields};
use crate::Uuid;

/// Field values decoded from a UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Fields {
    /// The UUID as a byte array.
    pub bytes: [u8; 16],

    /// The top three bits of byte 8 (`bytes[8] & 0xe0`).
    pub variant: u8,

    /// The version number, present only for the RFC 4122 variant.
    pub version: Option<u8>,

    /// Timestamp, clock sequence, and node, present only for version 1.
    pub v1: Option<V1Fields>,
}

/// Field values specific to a UUIDv1.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct V1Fields {
    /// Low 32 bits of the timestamp.
    pub time_low: u32,
    /// Middle 16 bits of the timestamp.
    pub time_mid: u16,
    /// High 12 bits of the timestamp.
    pub time_hi: u16,
    /// Unix time in milliseconds.
    pub msecs: i64,
    /// 100-nanosecond intervals within the millisecond.
    pub nsecs: u16,
    /// The 14-bit clock sequence.
    pub clock_seq: u16,
    /// The 48-bit node ID.
    pub node: [u8; 6],
}

impl V1Fields {
    /// Returns the timestamp as a calendar time at millisecond resolution.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.msecs)
    }
}

impl Uuid {
    /// Decodes the variant, version, and version-specific fields.
    pub fn fields(&self) -> Fields {
        let id = &self.0;
        let variant = id[8] & 0xe0;

        // RFC 4122 fields apply only to the `10` variant
        if variant & 0xc0 != 0x80 {
            return Fields {
                bytes: *id,
                variant,
                version: None,
                v1: None,
            };
        }

        let version = id[6] >> 4;
        let v1 = (version == 1).then(|| {
            let time = TimeFields {
                time_low: u32::from_be_bytes([id[0], id[1], id[2], id[3]]),
                time_mid: u16::from_be_bytes([id[4], id[5]]),
                time_hi: u16::from_be_bytes([id[6] & 0x0f, id[7]]),
            };
            let (msecs, nsecs) = timestamp::from_uuid_epoch(time);
            V1Fields {
                time_low: time.time_low,
                time_mid: time.time_mid,
                time_hi: time.time_hi,
                msecs,
                nsecs,
                clock_seq: u16::from_be_bytes([id[8] & 0x3f, id[9]]),
                node: [id[10], id[11], id[12], id[13], id[14], id[15]],
            }
        });

        Fields {
            bytes: *id,
            variant,
            version: Some(version),
            v1,
        }
    }
}

/// Decodes the fields of a UUID string, read leniently as by [`Uuid::parse_lenient`].
///
/// Use [`Uuid::fields`] for a UUID already in byte form.
///
/// # Examples
///
/// ```rust
/// let f = uuid14::parse_fields("28c2764e-7ccf-11e4-b116-123b93f75cba");
/// assert_eq!(f.version, Some(1));
/// assert_eq!(f.v1.unwrap().clock_seq, 0x3116);
/// ```
pub fn parse_fields(src: &str) -> Fields {
    Uuid::parse_lenient(src).fields()
}
