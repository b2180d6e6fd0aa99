//! MS-DOS timestamp handling for archive entries.
//!
//! ZIP entries store modification times as packed MS-DOS date/time
//! fields: local calendar fields with 2-second resolution, years
//! 1980..=2107. This module converts a file's [`SystemTime`] mtime into
//! that representation, using local wall-clock fields by default or UTC
//! fields when configured.
//!
//! Times outside the representable range are clamped to the nearest
//! bound rather than wrapping, so a pre-1980 mtime encodes as
//! 1980-01-01 00:00:00.

use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, Timelike, Utc};

/// Earliest year representable in a DOS date field.
const DOS_EPOCH_YEAR: i32 = 1980;

/// Latest year representable in a DOS date field (1980 + 127).
const DOS_MAX_YEAR: i32 = 2107;

/// A packed MS-DOS date/time pair as stored in ZIP entry headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    /// Packed date: bits 15-9 year-1980, 8-5 month, 4-0 day.
    pub date: u16,
    /// Packed time: bits 15-11 hour, 10-5 minute, 4-0 second/2.
    pub time: u16,
}

impl DosDateTime {
    /// Converts an mtime into DOS fields.
    ///
    /// `use_utc` selects UTC calendar fields; the default (matching what
    /// native archivers produce) is the local wall clock.
    pub fn from_system_time(mtime: SystemTime, use_utc: bool) -> Self {
        if use_utc {
            let dt: DateTime<Utc> = mtime.into();
            Self::from_fields(
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
            )
        } else {
            let dt: DateTime<Local> = mtime.into();
            Self::from_fields(
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
            )
        }
    }

    /// Packs calendar fields, clamping out-of-range years.
    fn from_fields(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        if year < DOS_EPOCH_YEAR {
            return Self { date: 0x0021, time: 0 }; // 1980-01-01 00:00:00
        }
        if year > DOS_MAX_YEAR {
            return Self {
                date: 0xFF9F, // 2107-12-31
                time: 0xBF7D, // 23:59:58
            };
        }

        let date =
            (((year - DOS_EPOCH_YEAR) as u16) << 9) | ((month as u16) << 5) | (day as u16);
        let time = ((hour as u16) << 11) | ((minute as u16) << 5) | ((second / 2) as u16);
        Self { date, time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_utc_fields_packed() {
        // 2024-06-15 12:34:56 UTC
        let mtime = UNIX_EPOCH + Duration::from_secs(1_718_454_896);
        let dos = DosDateTime::from_system_time(mtime, true);

        assert_eq!(dos.date >> 9, (2024 - 1980) as u16);
        assert_eq!((dos.date >> 5) & 0x0F, 6);
        assert_eq!(dos.date & 0x1F, 15);
        assert_eq!(dos.time >> 11, 12);
        assert_eq!((dos.time >> 5) & 0x3F, 34);
        // DOS time has 2-second resolution.
        assert_eq!((dos.time & 0x1F) * 2, 56);
    }

    #[test]
    fn test_pre_dos_epoch_clamps() {
        let dos = DosDateTime::from_system_time(UNIX_EPOCH, true);
        assert_eq!(dos.date, 0x0021);
        assert_eq!(dos.time, 0);
    }

    #[test]
    fn test_odd_seconds_truncate() {
        // 2024-06-15 00:00:57 UTC
        let mtime = UNIX_EPOCH + Duration::from_secs(1_718_409_657);
        let dos = DosDateTime::from_system_time(mtime, true);
        assert_eq!((dos.time & 0x1F) * 2, 56);
    }

    #[test]
    fn test_far_future_clamps() {
        // Well past year 2107.
        let mtime = UNIX_EPOCH + Duration::from_secs(10_000_000_000);
        let dos = DosDateTime::from_system_time(mtime, true);
        assert!(dos.date >> 9 <= (DOS_MAX_YEAR - DOS_EPOCH_YEAR) as u16);
    }
}
