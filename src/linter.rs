use crate::{
    Config, Flow,
    catalog::{self, Diagnostic, Severity},
    date::{self, DateFormat, ParsedTimestamp},
    headers::{self, HEADER_COUNT, HEADERS},
    list::{ListError, skip_lws},
    patterns::Patterns,
    status::StatusLine,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;

/// Allowed distance, in seconds, between a server date and our clock.
pub(crate) const DATE_TOLERANCE_SECS: i64 = 10;

/// Something the presentation layer is told about, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A received line, exactly as it arrived (line terminator included).
    Line(String),
    Diagnostic(Diagnostic),
    Note(Note),
}

/// Context that qualifies the diagnostic following it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    List(ListError),
    /// A well-formed element outside the known vocabulary, e.g. an unknown
    /// Cache-Control directive.
    UnknownToken { label: &'static str, value: String },
}

impl Note {
    pub fn severity(&self) -> Severity {
        match self {
            Note::List(_) => Severity::Error,
            Note::UnknownToken { .. } => Severity::Warning,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Note::List(err) => err.fmt(f),
            Note::UnknownToken { label, value } => write!(f, "{label} '{value}':"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

/// Validation state for one response at a time.
///
/// Call [`begin`](Linter::begin) for every URL, feed it the received lines
/// with [`line`](Linter::line) until it answers [`Flow::Stop`], then call
/// [`finish`](Linter::finish). Events accumulate until taken with
/// [`take_events`](Linter::take_events).
pub struct Linter {
    pub(crate) patterns: Patterns,
    max_line_length: usize,
    clock: Clock,

    url: String,
    seen_status_line: bool,
    counts: [u32; HEADER_COUNT],
    events: Vec<Event>,
}

impl Linter {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            patterns: Patterns::new()?,
            max_line_length: config.max_line_length,
            clock: Clock::System,

            url: String::new(),
            seen_status_line: false,
            counts: [0; HEADER_COUNT],
            events: vec![],
        })
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        match self.clock {
            Clock::System => Utc::now(),
            Clock::Fixed(now) => now,
        }
    }

    /// Resets all per-response state before checking `url`.
    pub fn begin(&mut self, url: &str) {
        self.url = url.to_string();
        self.seen_status_line = false;
        self.counts = [0; HEADER_COUNT];
        self.events.clear();

        if !url.starts_with("http") {
            self.emit("nothttp");
        }
    }

    /// Checks one received line. The first line is the status line; an empty
    /// line ends the header block and answers [`Flow::Stop`].
    pub fn line(&mut self, raw: &[u8]) -> Flow {
        // Latin-1: every byte is one character.
        let text: String = raw.iter().map(|&b| char::from(b)).collect();
        self.events.push(Event::Line(text.clone()));

        let content = match text.strip_suffix("\r\n") {
            Some(content) => content,
            None => {
                self.emit("notcrlf");
                text.strip_suffix('\n').unwrap_or(&text)
            }
        };
        if raw.len() >= self.max_line_length {
            self.emit("headertoolong");
        }

        if content.is_empty() {
            self.emit("endofheaders");
            return Flow::Stop;
        }

        if !self.seen_status_line {
            self.seen_status_line = true;
            self.check_status_line(content);
        } else {
            match content.split_once(':') {
                Some((name, value)) => self.check_header(name, trim_lws(value)),
                None => self.emit("missingcolon"),
            }
        }

        Flow::Continue
    }

    pub fn check_status_line(&mut self, line: &str) {
        let key = match StatusLine::parse(line, &self.patterns) {
            Some(status) => status.classify().key(),
            None => "badstatusline",
        };
        self.emit(key);
    }

    /// Dispatches a header to its validator. `value` is expected without
    /// surrounding white space.
    pub fn check_header(&mut self, name: &str, value: &str) {
        match headers::find(name) {
            Some(index) => {
                self.counts[index] += 1;
                (HEADERS[index].check)(self, value);
            }
            None if name.starts_with("X-") || name.starts_with("x-") => self.emit("xheader"),
            None => self.emit("nonstandard"),
        }
    }

    /// Reports absent headers, then checks the shape of the URL itself.
    pub fn finish(&mut self) {
        self.report_missing();
        self.check_url();
    }

    pub fn report_missing(&mut self) {
        for (rule, count) in HEADERS.iter().zip(self.counts) {
            if let (0, Some(missing)) = (count, rule.missing) {
                self.emit(missing);
            }
        }
    }

    pub fn check_url(&mut self) {
        if !self.patterns.clean_url.is_match(&self.url) {
            self.emit("ugly");
        }
    }

    /// How many times `name` was seen in the current response.
    pub fn count(&self, name: &str) -> Option<u32> {
        headers::find(name).map(|index| self.counts[index])
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, key: &str) {
        self.events.push(Event::Diagnostic(catalog::lookup(key)));
    }

    pub(crate) fn note(&mut self, note: Note) {
        self.events.push(Event::Note(note));
    }

    /// Parses an HTTP-date, reporting obsolete formats and failures.
    pub(crate) fn date(&mut self, value: &str) -> Option<DateTime<Utc>> {
        let parsed = date::parse_date(value, &self.patterns);

        match parsed.as_ref().and_then(ParsedTimestamp::instant) {
            Some(instant) => {
                match parsed.map(|ts| ts.format) {
                    Some(DateFormat::Asctime) => self.emit("asctime"),
                    Some(DateFormat::Rfc1036) => self.emit("rfc1036"),
                    _ => {}
                }
                Some(instant)
            }
            None => {
                self.emit("baddate");
                None
            }
        }
    }
}

fn trim_lws(value: &str) -> &str {
    skip_lws(value).trim_end_matches([' ', '\t'])
}
