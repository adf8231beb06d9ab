use crate::{Diagnostic, Event, Format, Note, Severity};
use std::io::{self, Write};

/// Column text diagnostics are wrapped at.
const WRAP_COLUMN: usize = 75;
const INDENT: &str = "    ";

/// Writes linter events as plain text or as an HTML fragment.
///
/// A report for one URL is `begin_url`, the events of the response,
/// `end_response`, then either `failure` or `begin_summary` followed by the
/// summary events, and finally `end_url`.
pub struct Renderer<W: Write> {
    out: W,
    format: Format,
    line_open: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            line_open: false,
        }
    }

    pub fn begin_url(&mut self, url: &str) -> io::Result<()> {
        match self.format {
            Format::Text => writeln!(self.out, "Checking URL {url}"),
            Format::Html => writeln!(self.out, "<ul>"),
        }
    }

    pub fn event(&mut self, event: &Event) -> io::Result<()> {
        match event {
            Event::Line(line) => self.line(line),
            Event::Diagnostic(diagnostic) => self.diagnostic(diagnostic),
            Event::Note(note) => self.note(note),
        }
    }

    pub fn events<'e>(&mut self, events: impl IntoIterator<Item = &'e Event>) -> io::Result<()> {
        for event in events {
            self.event(event)?;
        }
        Ok(())
    }

    /// Closes the list of received lines.
    pub fn end_response(&mut self) -> io::Result<()> {
        self.close_line()?;
        if self.format == Format::Html {
            writeln!(self.out, "</ul>")?;
        }
        Ok(())
    }

    /// Reports a failed fetch; nothing else is reported for that URL.
    pub fn failure(&mut self, err: &anyhow::Error) -> io::Result<()> {
        let message = format!("{err:#}");
        match self.format {
            Format::Text => {
                write!(self.out, "Error: ")?;
                self.escaped(&message)?;
                writeln!(self.out, ".")
            }
            Format::Html => {
                write!(self.out, "<p class='error'>Error: ")?;
                self.escaped(&message)?;
                writeln!(self.out, ".</p>")
            }
        }
    }

    /// Opens the section for checks that run after the whole head was seen.
    pub fn begin_summary(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        if self.format == Format::Html {
            write!(self.out, "<ul>")?;
        }
        Ok(())
    }

    pub fn end_url(&mut self) -> io::Result<()> {
        self.close_line()?;
        if self.format == Format::Html {
            writeln!(self.out, "</ul>")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) -> io::Result<()> {
        self.close_line()?;
        match self.format {
            Format::Text => {
                write!(self.out, "* ")?;
                self.escaped(line)?;
                writeln!(self.out)
            }
            Format::Html => {
                write!(self.out, "<li><code>")?;
                self.escaped(line)?;
                write!(self.out, "</code><ul>")?;
                self.line_open = true;
                Ok(())
            }
        }
    }

    fn close_line(&mut self) -> io::Result<()> {
        if std::mem::take(&mut self.line_open) {
            writeln!(self.out, "</ul></li>")?;
        }
        Ok(())
    }

    fn diagnostic(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let text = diagnostic.to_string();
        match self.format {
            Format::Text => {
                for line in wrap(&text) {
                    writeln!(self.out, "{INDENT}{line}")?;
                }
                writeln!(self.out)
            }
            Format::Html => {
                match class(diagnostic.severity) {
                    Some(class) => write!(self.out, "<li class='{class}'>")?,
                    None => write!(self.out, "<li>")?,
                }
                self.linked(&text)?;
                writeln!(self.out, "</li>")
            }
        }
    }

    fn note(&mut self, note: &Note) -> io::Result<()> {
        let text = note.to_string();
        match self.format {
            Format::Text => writeln!(self.out, "{INDENT}{text}"),
            Format::Html => {
                let class = class(note.severity()).unwrap_or("warning");
                write!(self.out, "<li class='{class}'>")?;
                self.escaped(&text)?;
                writeln!(self.out, "</li>")
            }
        }
    }

    /// Writes `s` with control characters as `[xx]`, and markup escaped in
    /// HTML.
    fn escaped(&mut self, s: &str) -> io::Result<()> {
        let html = self.format == Format::Html;
        for c in s.chars() {
            match c {
                '<' if html => write!(self.out, "&lt;")?,
                '>' if html => write!(self.out, "&gt;")?,
                '&' if html => write!(self.out, "&amp;")?,
                ' '..='~' => write!(self.out, "{c}")?,
                _ if html => write!(self.out, "<span class='cc'>[{:02x}]</span>", u32::from(c))?,
                _ => write!(self.out, "[{:02x}]", u32::from(c))?,
            }
        }
        Ok(())
    }

    /// HTML text with `http://` references turned into links.
    fn linked(&mut self, mut text: &str) -> io::Result<()> {
        while let Some(at) = text.find("http://") {
            self.escaped(&text[..at])?;
            let rest = &text[at..];
            let end = rest.find(' ').unwrap_or(rest.len());
            let (link, after) = rest.split_at(end);

            write!(self.out, "<a href='")?;
            self.escaped(link)?;
            write!(self.out, "'>")?;
            self.escaped(link)?;
            write!(self.out, "</a>")?;
            text = after;
        }
        self.escaped(text)
    }
}

fn class(severity: Severity) -> Option<&'static str> {
    match severity {
        Severity::Ok => Some("ok"),
        Severity::Info => None,
        Severity::Warning => Some("warning"),
        Severity::Error => Some("error"),
    }
}

/// Breaks `text` into indented lines no wider than [`WRAP_COLUMN`].
fn wrap(text: &str) -> Vec<String> {
    let mut lines = vec![];
    let mut current = String::new();

    for word in text.split(' ') {
        let width = INDENT.len() + current.len();
        if !current.is_empty() && width + 1 + word.len() > WRAP_COLUMN {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    lines.push(current);
    lines
}
