//! FILETIME: 100-nanosecond intervals since 1601-01-01 UTC

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rpc_ndr::{NdrDecode, Result, StructSchema, TypeDesc, Value};

/// 100-nanosecond intervals between 1601-01-01 and 1970-01-01
pub const UNIX_EPOCH_OFFSET: u64 = 116_444_736_000_000_000;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Windows FILETIME (MS-DTYP 2.3.3)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileTime {
    pub low_date_time: u32,
    pub high_date_time: u32,
}

impl FileTime {
    pub fn new(intervals: u64) -> Self {
        Self {
            low_date_time: intervals as u32,
            high_date_time: (intervals >> 32) as u32,
        }
    }

    /// Raw 100ns interval count
    pub fn as_u64(&self) -> u64 {
        (u64::from(self.high_date_time) << 32) | u64::from(self.low_date_time)
    }

    /// Nanoseconds since the Unix epoch, negative before 1970
    pub fn unix_nanos(&self) -> i128 {
        (i128::from(self.as_u64()) - i128::from(UNIX_EPOCH_OFFSET)) * 100
    }

    /// `None` when the time is not representable on this platform.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        let nanos = self.unix_nanos();
        let magnitude = nanos.unsigned_abs();
        let duration = Duration::new(
            u64::try_from(magnitude / NANOS_PER_SEC).ok()?,
            (magnitude % NANOS_PER_SEC) as u32,
        );
        if nanos >= 0 {
            UNIX_EPOCH.checked_add(duration)
        } else {
            UNIX_EPOCH.checked_sub(duration)
        }
    }

    /// The "never" sentinel, 0x7FFFFFFF_FFFFFFFF
    pub fn is_never(&self) -> bool {
        self.as_u64() == i64::MAX as u64
    }
}

impl NdrDecode for FileTime {
    fn ndr_type() -> Result<TypeDesc> {
        cached_schema!(StructSchema::builder("FILETIME")
            .field::<u32>("dwLowDateTime")
            .field::<u32>("dwHighDateTime")
            .build())
    }

    fn from_ndr(value: Value) -> Result<Self> {
        let mut fields = value.into_struct("FILETIME")?;
        Ok(Self {
            low_date_time: fields.take("dwLowDateTime")?,
            high_date_time: fields.take("dwHighDateTime")?,
        })
    }
}
