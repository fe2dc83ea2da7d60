//! Intent classification for spoken commands.
//!
//! Utterances are matched against an ordered table of keyword rules; the first
//! rule whose predicate holds builds the [`Intent`]. Matching is plain
//! substring search on the lowercased utterance, so rule order decides which
//! intent wins when several keywords co-occur.
//!
//! | Order | Keyword | Intent |
//! |-------|---------|--------|
//! | 1 | `weather` | [`Intent::Weather`] |
//! | 2 | `news` | [`Intent::News`] |
//! | 3 | `reminder` | [`Intent::SetReminder`] |
//! | 4 | `open` | [`Intent::OpenApp`] |
//! | 5 | `search` | [`Intent::Search`] |
//! | 6 | `time` | [`Intent::Time`] |
//! | 7 | `exit`, `goodbye` | [`Intent::Exit`] |
//! | 8 | `calendar events` | [`Intent::CalendarList`] |
//! | 9 | `add event` | [`Intent::CalendarAdd`] |

use std::fmt;

/// A classified command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Current weather for a location (may be empty).
    Weather {
        /// Utterance with the `weather` keyword removed.
        location: String,
    },
    /// Top headlines digest.
    News,
    /// Schedule a daily reminder. The raw command is parsed by the handler.
    SetReminder {
        /// The full lowercased utterance.
        command: String,
    },
    /// Launch an allow-listed application.
    OpenApp {
        /// Spoken application name.
        app: String,
    },
    /// Open a web search.
    Search {
        /// Query text, passed on verbatim.
        query: String,
    },
    /// Speak the current time.
    Time,
    /// End the session.
    Exit,
    /// Read upcoming calendar events.
    CalendarList,
    /// Start the event-creation sub-dialogue.
    CalendarAdd,
    /// Nothing matched; listen again without replying.
    NoOp,
}

impl Intent {
    /// Short stable name used in logs and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Weather { .. } => "weather",
            Self::News => "news",
            Self::SetReminder { .. } => "set_reminder",
            Self::OpenApp { .. } => "open_app",
            Self::Search { .. } => "search",
            Self::Time => "time",
            Self::Exit => "exit",
            Self::CalendarList => "calendar_list",
            Self::CalendarAdd => "calendar_add",
            Self::NoOp => "no_op",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weather { location } => write!(f, "weather(location={location:?})"),
            Self::SetReminder { command } => write!(f, "set_reminder(command={command:?})"),
            Self::OpenApp { app } => write!(f, "open_app(app={app:?})"),
            Self::Search { query } => write!(f, "search(query={query:?})"),
            other => f.write_str(other.name()),
        }
    }
}

/// One entry of the classification table.
struct IntentRule {
    matches: fn(&str) -> bool,
    build: fn(&str) -> Intent,
}

const RULES: &[IntentRule] = &[
    IntentRule {
        matches: mentions_weather,
        build: build_weather,
    },
    IntentRule {
        matches: mentions_news,
        build: |_| Intent::News,
    },
    IntentRule {
        matches: mentions_reminder,
        build: build_reminder,
    },
    IntentRule {
        matches: mentions_open,
        build: build_open_app,
    },
    IntentRule {
        matches: mentions_search,
        build: build_search,
    },
    IntentRule {
        matches: mentions_time,
        build: |_| Intent::Time,
    },
    IntentRule {
        matches: mentions_exit,
        build: |_| Intent::Exit,
    },
    IntentRule {
        matches: mentions_calendar_events,
        build: |_| Intent::CalendarList,
    },
    IntentRule {
        matches: mentions_add_event,
        build: |_| Intent::CalendarAdd,
    },
];

fn mentions_weather(u: &str) -> bool {
    u.contains("weather")
}

fn mentions_news(u: &str) -> bool {
    u.contains("news")
}

fn mentions_reminder(u: &str) -> bool {
    u.contains("reminder")
}

fn mentions_open(u: &str) -> bool {
    u.contains("open")
}

fn mentions_search(u: &str) -> bool {
    u.contains("search")
}

fn mentions_time(u: &str) -> bool {
    u.contains("time")
}

fn mentions_exit(u: &str) -> bool {
    u.contains("exit") || u.contains("goodbye")
}

fn mentions_calendar_events(u: &str) -> bool {
    u.contains("calendar events")
}

fn mentions_add_event(u: &str) -> bool {
    u.contains("add event")
}

fn build_weather(u: &str) -> Intent {
    Intent::Weather {
        location: strip_keyword(u, "weather"),
    }
}

fn build_reminder(u: &str) -> Intent {
    Intent::SetReminder {
        command: u.to_owned(),
    }
}

fn build_open_app(u: &str) -> Intent {
    Intent::OpenApp {
        app: strip_keyword(u, "open"),
    }
}

fn build_search(u: &str) -> Intent {
    Intent::Search {
        query: strip_keyword(u, "search"),
    }
}

/// Remove every occurrence of `keyword` and trim the ends.
///
/// Inner whitespace is left as is: `"what's the weather in boston"` becomes
/// `"what's the  in boston"`.
fn strip_keyword(utterance: &str, keyword: &str) -> String {
    utterance.replace(keyword, "").trim().to_owned()
}

/// Stateless keyword classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentDispatcher;

impl IntentDispatcher {
    /// Create a dispatcher.
    pub fn new() -> Self {
        Self
    }

    /// Classify a lowercased utterance. First matching rule wins.
    pub fn classify(&self, utterance: &str) -> Intent {
        RULES
            .iter()
            .find(|rule| (rule.matches)(utterance))
            .map(|rule| (rule.build)(utterance))
            .unwrap_or(Intent::NoOp)
    }
}

/// Classify with a default [`IntentDispatcher`].
pub fn classify(utterance: &str) -> Intent {
    IntentDispatcher.classify(utterance)
}

// ---------------------------------------------------------------------------
// Reminder parameters
// ---------------------------------------------------------------------------

/// Marker that precedes the time phrase of a reminder command.
const TIME_MARKER: &str = "reminder at";

/// Why a reminder command could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReminderParseError {
    /// No standalone word `to` separates the time from the message.
    #[error("no \"to\" separating time and message")]
    MissingMessage,
    /// The part before `to` does not contain `reminder at`.
    #[error("no \"reminder at\" before the time")]
    MissingTimeMarker,
    /// Nothing between `reminder at` and `to`.
    #[error("empty reminder time")]
    EmptyTime,
    /// Nothing after `to`.
    #[error("empty reminder message")]
    EmptyMessage,
}

/// Time phrase and message extracted from a reminder command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRequest {
    /// Free-text time of day, e.g. `"3 pm"`.
    pub time: String,
    /// What to be reminded of.
    pub message: String,
}

impl ReminderRequest {
    /// Parse `"... reminder at <time> to <message>"`.
    ///
    /// The command is split on the first standalone word `to`, so words such
    /// as `tomorrow` or `today` do not act as the separator.
    ///
    /// # Errors
    ///
    /// Returns a [`ReminderParseError`] describing the missing part.
    pub fn parse(command: &str) -> Result<Self, ReminderParseError> {
        let split_at = find_word(command, "to").ok_or(ReminderParseError::MissingMessage)?;
        let (head, tail) = command.split_at(split_at);
        let message = tail["to".len()..].trim();

        let marker = head
            .find(TIME_MARKER)
            .ok_or(ReminderParseError::MissingTimeMarker)?;
        let time = head[marker + TIME_MARKER.len()..].trim();

        if time.is_empty() {
            return Err(ReminderParseError::EmptyTime);
        }
        if message.is_empty() {
            return Err(ReminderParseError::EmptyMessage);
        }

        Ok(Self {
            time: time.to_owned(),
            message: message.to_owned(),
        })
    }
}

/// Byte offset of the first occurrence of `word` not embedded in a longer word.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    haystack.match_indices(word).map(|(i, _)| i).find(|&i| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
