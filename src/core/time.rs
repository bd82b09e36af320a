//! Clock and timezone adapter.
//!
//! Everything the assistant stores is a timezone-naive instant that is UTC by
//! convention; everything the user types or reads is wall-clock time in one
//! configured IANA zone. Mixing the two naive flavors in a comparison is the
//! classic way this kind of system corrupts its schedule, so each flavor gets
//! its own wrapper type and all conversions go through [`TimeKeeper`]:
//!
//! - [`LocalTime`]: zone-aware wall clock in the configured zone
//! - [`UtcTime`]: zone-aware UTC instant, used for all scheduling math
//! - [`StoredUtc`]: naive storage form; deliberately has no ordering, so a
//!   value read back from the store must be rehydrated before any comparison

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Wall-clock instant in the configured local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LocalTime(DateTime<Tz>);

impl LocalTime {
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn plus(&self, delta: Duration) -> LocalTime {
        LocalTime(self.0 + delta)
    }

    /// Overflow-checked variant of [`LocalTime::plus`].
    pub fn checked_plus(&self, delta: Duration) -> Option<LocalTime> {
        self.0.checked_add_signed(delta).map(LocalTime)
    }

    /// Calendar date `days` days after this instant's date.
    pub fn plus_days(&self, days: u64) -> NaiveDate {
        self.0.date_naive() + chrono::Days::new(days)
    }

    /// Render with a chrono format string, e.g. `"%d/%m/%Y a las %H:%M"`.
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

/// Zone-aware UTC instant. All tier-window arithmetic happens on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcTime(DateTime<Utc>);

impl UtcTime {
    pub fn plus(&self, delta: Duration) -> UtcTime {
        UtcTime(self.0 + delta)
    }

    pub fn minus(&self, delta: Duration) -> UtcTime {
        UtcTime(self.0 - delta)
    }

    /// Signed time remaining until `self`, measured from `from`.
    pub fn since(&self, from: UtcTime) -> Duration {
        self.0 - from.0
    }
}

/// Naive instant as persisted. Always UTC by convention; the type offers no
/// ordering so it cannot be compared without reattaching the zone tag first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUtc(NaiveDateTime);

impl StoredUtc {
    /// Storage-boundary accessor. Only serialization code should need this.
    pub fn raw(&self) -> NaiveDateTime {
        self.0
    }

    /// Storage-boundary constructor for values read back from the store.
    pub fn from_raw(naive: NaiveDateTime) -> StoredUtc {
        StoredUtc(naive)
    }
}

/// Converts between the configured civil timezone and UTC.
#[derive(Debug, Clone, Copy)]
pub struct TimeKeeper {
    tz: Tz,
}

impl TimeKeeper {
    pub fn new(tz: Tz) -> TimeKeeper {
        TimeKeeper { tz }
    }

    pub fn zone(&self) -> Tz {
        self.tz
    }

    /// Current wall-clock instant in the configured zone.
    pub fn now_local(&self) -> LocalTime {
        LocalTime(Utc::now().with_timezone(&self.tz))
    }

    /// Current instant in UTC.
    pub fn now_utc(&self) -> UtcTime {
        UtcTime(Utc::now())
    }

    pub fn to_utc(&self, local: LocalTime) -> UtcTime {
        UtcTime(local.0.with_timezone(&Utc))
    }

    pub fn to_local(&self, utc: UtcTime) -> LocalTime {
        LocalTime(utc.0.with_timezone(&self.tz))
    }

    /// Drop the zone tag without moving the point in time. This is the only
    /// way to produce the storage representation.
    pub fn strip_zone(&self, utc: UtcTime) -> StoredUtc {
        StoredUtc(utc.0.naive_utc())
    }

    /// Reattach the UTC tag to a stored instant. Required before a stored
    /// value participates in any comparison or local-time display.
    pub fn rehydrate(&self, stored: StoredUtc) -> UtcTime {
        UtcTime(DateTime::from_naive_utc_and_offset(stored.0, Utc))
    }

    /// Build a wall-clock instant from calendar parts. Returns `None` when
    /// the combination does not exist in the zone (e.g. inside a DST gap).
    pub fn local_from_parts(&self, date: NaiveDate, hour: u32, minute: u32) -> Option<LocalTime> {
        let naive = date.and_hms_opt(hour, minute, 0)?;
        self.tz.from_local_datetime(&naive).earliest().map(LocalTime)
    }
}
