//! Daily job definitions and free-text time-of-day parsing.
//!
//! Defines [`TimeOfDay`], the [`DailyJob`] bookkeeping record and the
//! [`ScheduleError`] raised when a job cannot be registered.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Errors raised by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// The time phrase could not be understood.
    #[error("invalid time of day '{0}'")]
    InvalidTime(String),
    /// A callback panicked while holding the job table.
    #[error("scheduler lock poisoned")]
    LockPoisoned,
}

/// Wall-clock time at which a daily job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// Hour of day (0-23, local time).
    pub hour: u8,
    /// Minute of hour (0-59).
    pub min: u8,
}

impl TimeOfDay {
    /// Build from 24-hour components.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] if either component is out of range.
    pub fn new(hour: u8, min: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || min > 59 {
            return Err(ScheduleError::InvalidTime(format!("{hour}:{min:02}")));
        }
        Ok(Self { hour, min })
    }

    /// Parse a spoken time of day.
    ///
    /// Accepts 12-hour forms with an `am`/`pm` suffix (`"3 pm"`, `"3pm"`,
    /// `"3:30 pm"`, `"7 a.m."`) and 24-hour forms (`"15:00"`, `"9"`).
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTime`] carrying the original text.
    pub fn parse(text: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidTime(text.to_owned());

        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '.')
            .flat_map(char::to_lowercase)
            .collect();

        let (clock, meridiem) = if let Some(rest) = compact.strip_suffix("am") {
            (rest, Some(Meridiem::Am))
        } else if let Some(rest) = compact.strip_suffix("pm") {
            (rest, Some(Meridiem::Pm))
        } else {
            (compact.as_str(), None)
        };

        let (hour_text, min_text) = match clock.split_once(':') {
            Some((h, m)) => (h, m),
            None => (clock, "0"),
        };
        let digits = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
        if !digits(hour_text) || !digits(min_text) || min_text.len() > 2 {
            return Err(invalid());
        }
        let hour: u8 = hour_text.parse().map_err(|_| invalid())?;
        let min: u8 = min_text.parse().map_err(|_| invalid())?;

        let hour = match meridiem {
            Some(m) => {
                if !(1..=12).contains(&hour) {
                    return Err(invalid());
                }
                match m {
                    Meridiem::Am => hour % 12,
                    Meridiem::Pm => hour % 12 + 12,
                }
            }
            None => hour,
        };

        Self::new(hour, min).map_err(|_| invalid())
    }

    /// The equivalent [`NaiveTime`].
    pub fn as_naive_time(self) -> NaiveTime {
        // Components are range-checked on construction.
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.min), 0)
            .unwrap_or_default()
    }

    /// First instant strictly after `now` at this time of day.
    ///
    /// A time already reached today resolves to tomorrow.
    pub fn next_after(self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.as_naive_time());
        if today > now {
            today
        } else {
            today + chrono::Duration::days(1)
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.min)
    }
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

/// Identifier assigned to a job at registration. Increases monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// A callback registered to fire once per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyJob {
    /// Registration id.
    pub id: JobId,
    /// Human-readable label, e.g. the reminder message.
    pub label: String,
    /// When the job fires each day.
    pub time: TimeOfDay,
    /// Next instant the job is due.
    pub next_fire: NaiveDateTime,
    /// Last instant the job fired, if any.
    pub last_fired: Option<NaiveDateTime>,
    /// Number of times the job has fired.
    pub fire_count: u64,
}

impl DailyJob {
    /// Create a job registered at `now`.
    pub fn new(id: JobId, label: impl Into<String>, time: TimeOfDay, now: NaiveDateTime) -> Self {
        Self {
            id,
            label: label.into(),
            time,
            next_fire: time.next_after(now),
            last_fired: None,
            fire_count: 0,
        }
    }

    /// Returns `true` if the job's next firing has arrived.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_fire
    }

    /// Record a firing at `now` and move to the next future occurrence.
    ///
    /// Occurrences skipped while the process was not ticking are dropped.
    pub fn mark_fired(&mut self, now: NaiveDateTime) {
        self.last_fired = Some(now);
        self.fire_count += 1;
        self.next_fire = self.time.next_after(now);
    }
}

/// One entry in the scheduler's fire history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireRecord {
    /// Job that fired.
    pub job_id: JobId,
    /// Job label at the time of firing.
    pub label: String,
    /// Tick instant that fired it.
    pub fired_at: NaiveDateTime,
}
