//! Staged natural-language time resolution.
//!
//! A phrase is examined in fixed stages and each stage sees only the text the
//! previous stages left behind: a matched day keyword is blanked out of the
//! working copy so the time-of-day stage can never re-claim its characters.
//! Within the day stage, table order decides the winner, not position in the
//! phrase.

use chrono::{Duration, NaiveDate, Weekday};
use regex::{Captures, Regex};

use crate::core::error::ResolveError;
use crate::core::time::{LocalTime, StoredUtc, TimeKeeper};

/// What a day keyword resolves to, relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayKeyword {
    DayAfterTomorrow,
    Tomorrow,
    Today,
    Weekday(Weekday),
}

/// Fixed day-keyword table. Scanned in order; the first keyword present
/// anywhere in the phrase wins. The two-day forms sit above the one-day forms
/// so "pasado mañana" is not swallowed by "mañana".
const DAY_TABLE: &[(&str, DayKeyword)] = &[
    ("pasado mañana", DayKeyword::DayAfterTomorrow),
    ("pasado manana", DayKeyword::DayAfterTomorrow),
    ("day after tomorrow", DayKeyword::DayAfterTomorrow),
    ("mañana", DayKeyword::Tomorrow),
    ("manana", DayKeyword::Tomorrow),
    ("tomorrow", DayKeyword::Tomorrow),
    ("hoy", DayKeyword::Today),
    ("today", DayKeyword::Today),
    ("ahora", DayKeyword::Today),
    ("lunes", DayKeyword::Weekday(Weekday::Mon)),
    ("monday", DayKeyword::Weekday(Weekday::Mon)),
    ("martes", DayKeyword::Weekday(Weekday::Tue)),
    ("tuesday", DayKeyword::Weekday(Weekday::Tue)),
    ("miércoles", DayKeyword::Weekday(Weekday::Wed)),
    ("miercoles", DayKeyword::Weekday(Weekday::Wed)),
    ("wednesday", DayKeyword::Weekday(Weekday::Wed)),
    ("jueves", DayKeyword::Weekday(Weekday::Thu)),
    ("thursday", DayKeyword::Weekday(Weekday::Thu)),
    ("viernes", DayKeyword::Weekday(Weekday::Fri)),
    ("friday", DayKeyword::Weekday(Weekday::Fri)),
    ("sábado", DayKeyword::Weekday(Weekday::Sat)),
    ("sabado", DayKeyword::Weekday(Weekday::Sat)),
    ("saturday", DayKeyword::Weekday(Weekday::Sat)),
    ("domingo", DayKeyword::Weekday(Weekday::Sun)),
    ("sunday", DayKeyword::Weekday(Weekday::Sun)),
];

/// Working copy of the phrase. Consumed spans are overwritten with spaces so
/// later stages see reduced input without byte offsets shifting underneath
/// still-to-run pattern matches.
struct Scratch {
    text: String,
}

impl Scratch {
    fn new(phrase: &str) -> Scratch {
        Scratch {
            text: phrase.trim().to_lowercase(),
        }
    }

    fn text(&self) -> &str {
        &self.text
    }

    /// Blank out `len` bytes starting at `start` (both on char boundaries).
    fn consume(&mut self, start: usize, len: usize) {
        let blanked: String = self.text[start..start + len].chars().map(|_| ' ').collect();
        self.text.replace_range(start..start + len, &blanked);
    }
}

/// Converts free-text phrases like "mañana a las 3 pm" or "in 20 minutes"
/// into a future stored instant.
pub struct TimeResolver {
    keeper: TimeKeeper,
    interval: Regex,
    clock: Regex,
    meridiem: Regex,
    bare_hour: Regex,
    indicator: Regex,
}

impl TimeResolver {
    pub fn new(keeper: TimeKeeper) -> TimeResolver {
        TimeResolver {
            keeper,
            // "en 20 minutos" / "in 2 hours" / "en 3 días" / "in 1 week"
            interval: Regex::new(
                r"\b(?:en|in)\s+(\d+)\s*(minutos?|minutes?|horas?|hours?|d[ií]as?|days?|semanas?|weeks?)\b",
            )
            .expect("hardcoded pattern"),
            // "3:30", "3:30pm"
            clock: Regex::new(r"(\d{1,2}):(\d{2})\s*(am|pm)?").expect("hardcoded pattern"),
            // "3 pm"
            meridiem: Regex::new(r"(\d{1,2})\s*(am|pm)\b").expect("hardcoded pattern"),
            // "a las 3" / "at 3", bare hour with no meridiem
            bare_hour: Regex::new(r"(?:a las|las|at)\s*(\d{1,2})").expect("hardcoded pattern"),
            // Any hint that the phrase talks about a clock time at all.
            // Substring semantics on purpose: cheap and predictable.
            indicator: Regex::new(r"a las|las|at|hrs|horas|am|pm|:|\d").expect("hardcoded pattern"),
        }
    }

    /// Resolve `phrase` against the current local instant `now`. The result
    /// is always strictly in the future.
    pub fn resolve(&self, phrase: &str, now: LocalTime) -> Result<StoredUtc, ResolveError> {
        let mut scratch = Scratch::new(phrase);

        // Stage 1: relative interval, terminal on match.
        if let Some(caps) = self.interval.captures(scratch.text()) {
            let target = self.apply_interval(&caps, now, phrase)?;
            return Ok(self.keeper.strip_zone(self.keeper.to_utc(target)));
        }

        // Stage 2: day keyword, first hit in table order.
        let mut day_found = false;
        let mut target_date = now.date();
        for (keyword, meaning) in DAY_TABLE {
            if let Some(start) = scratch.text().find(keyword) {
                target_date = resolve_day(*meaning, now);
                scratch.consume(start, keyword.len());
                day_found = true;
                break;
            }
        }

        // No day and nothing that even looks like a clock time: the phrase
        // is not about time, default to one hour from now.
        if !day_found && !self.indicator.is_match(scratch.text()) {
            let fallback = now
                .checked_plus(Duration::hours(1))
                .ok_or_else(|| invalid(phrase))?;
            return Ok(self.keeper.strip_zone(self.keeper.to_utc(fallback)));
        }

        // Stage 3: time of day against whatever text is left.
        let (hour, minute) = self.resolve_clock(scratch.text(), now);

        // Stage 4: combine, clamping defensively.
        let hour = hour.clamp(0, 23) as u32;
        let minute = minute.clamp(0, 59) as u32;
        let mut target = self
            .keeper
            .local_from_parts(target_date, hour, minute)
            .ok_or_else(|| invalid(phrase))?;

        // Stage 5: anything at or before now moves forward exactly one day.
        if target <= now {
            target = target
                .checked_plus(Duration::days(1))
                .ok_or_else(|| invalid(phrase))?;
        }

        Ok(self.keeper.strip_zone(self.keeper.to_utc(target)))
    }

    fn apply_interval(
        &self,
        caps: &Captures<'_>,
        now: LocalTime,
        phrase: &str,
    ) -> Result<LocalTime, ResolveError> {
        let amount: i64 = caps[1].parse().map_err(|_| invalid(phrase))?;
        let unit = &caps[2];
        let delta = if unit.starts_with("min") {
            Duration::try_minutes(amount)
        } else if unit.starts_with("hor") || unit.starts_with("hour") {
            Duration::try_hours(amount)
        } else if unit.starts_with("sem") || unit.starts_with("week") {
            Duration::try_weeks(amount)
        } else {
            Duration::try_days(amount)
        };
        delta
            .and_then(|d| now.checked_plus(d))
            .ok_or_else(|| invalid(phrase))
    }

    /// Three patterns tried in order; falls back to now's wall time.
    fn resolve_clock(&self, text: &str, now: LocalTime) -> (i64, i64) {
        if let Some(caps) = self.clock.captures(text) {
            let hour: i64 = caps[1].parse().unwrap_or(0);
            let minute: i64 = caps[2].parse().unwrap_or(0);
            return (adjust_meridiem(hour, caps.get(3).map(|m| m.as_str())), minute);
        }

        if let Some(caps) = self.meridiem.captures(text) {
            let hour: i64 = caps[1].parse().unwrap_or(0);
            return (adjust_meridiem(hour, caps.get(2).map(|m| m.as_str())), 0);
        }

        if let Some(caps) = self.bare_hour.captures(text) {
            let hour: i64 = caps[1].parse().unwrap_or(0);
            // Short phrases like "a las 3" almost always mean the afternoon.
            let hour = if hour < 8 { hour + 12 } else { hour };
            return (hour, 0);
        }

        (now.hour() as i64, now.minute() as i64)
    }
}

/// 12-hour adjustment: pm adds 12 unless already past noon, 12am is midnight.
fn adjust_meridiem(hour: i64, period: Option<&str>) -> i64 {
    match period {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    }
}

/// Next occurrence of the keyword's day. Named weekdays land strictly after
/// today: asking for "lunes" on a Monday means next week.
fn resolve_day(meaning: DayKeyword, now: LocalTime) -> NaiveDate {
    match meaning {
        DayKeyword::Today => now.date(),
        DayKeyword::Tomorrow => now.plus_days(1),
        DayKeyword::DayAfterTomorrow => now.plus_days(2),
        DayKeyword::Weekday(target) => {
            let ahead = i64::from(target.num_days_from_monday())
                - i64::from(now.weekday().num_days_from_monday());
            let ahead = if ahead <= 0 { ahead + 7 } else { ahead };
            now.plus_days(ahead as u64)
        }
    }
}

fn invalid(phrase: &str) -> ResolveError {
    ResolveError::InvalidDate {
        phrase: phrase.to_string(),
    }
}
