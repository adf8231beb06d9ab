//! Per-header validators for the response headers of RFC 2616 section 14,
//! plus Set-Cookie.

use crate::{
    Linter,
    catalog::cmp_ignore_case,
    linter::{DATE_TOLERANCE_SECS, Note},
    list::{Bounds, ListError, parse_list},
};
use regex::Regex;

pub(crate) struct HeaderRule {
    pub name: &'static str,
    pub check: fn(&mut Linter, &str),
    /// Reported when the header is absent from a response.
    pub missing: Option<&'static str>,
}

pub(crate) const HEADER_COUNT: usize = 26;

// Sorted by name, case-insensitively.
pub(crate) static HEADERS: [HeaderRule; HEADER_COUNT] = [
    rule("Accept-Ranges", Linter::accept_ranges, None),
    rule("Age", Linter::age, None),
    rule("Allow", Linter::allow, None),
    rule("Cache-Control", Linter::cache_control, None),
    rule("Connection", Linter::connection, None),
    rule("Content-Encoding", Linter::content_encoding, None),
    rule("Content-Language", Linter::content_language, Some("missingcontlang")),
    rule("Content-Length", Linter::content_length, None),
    rule("Content-Location", Linter::content_location, None),
    rule("Content-MD5", Linter::content_md5, None),
    rule("Content-Range", Linter::content_range, None),
    rule("Content-Type", Linter::content_type, Some("missingcontenttype")),
    rule("Date", Linter::date_header, Some("missingdate")),
    rule("ETag", Linter::etag, None),
    rule("Expires", Linter::expires, None),
    rule("Last-Modified", Linter::last_modified, Some("missinglastmod")),
    rule("Location", Linter::location, None),
    rule("Pragma", Linter::pragma, None),
    rule("Retry-After", Linter::retry_after, None),
    rule("Server", Linter::server, None),
    rule("Set-Cookie", Linter::set_cookie, None),
    rule("Trailer", Linter::trailer, None),
    rule("Transfer-Encoding", Linter::transfer_encoding, None),
    rule("Upgrade", Linter::upgrade, None),
    rule("Vary", Linter::vary, None),
    rule("Via", Linter::via, None),
];

const fn rule(
    name: &'static str,
    check: fn(&mut Linter, &str),
    missing: Option<&'static str>,
) -> HeaderRule {
    HeaderRule {
        name,
        check,
        missing,
    }
}

pub(crate) fn find(name: &str) -> Option<usize> {
    HEADERS
        .binary_search_by(|rule| cmp_ignore_case(rule.name, name))
        .ok()
}

// Sorted, compared case-insensitively.
const CACHE_DIRECTIVES: &[&str] = &[
    "max-age",
    "max-stale",
    "min-fresh",
    "must-revalidate",
    "no-cache",
    "no-store",
    "no-transform",
    "only-if-cached",
    "private",
    "proxy-revalidate",
    "public",
    "s-maxage",
];
const CONTENT_CODINGS: &[&str] = &["compress", "deflate", "gzip", "identity"];
const TRANSFER_CODINGS: &[&str] = &["chunked", "compress", "deflate", "gzip", "identity"];

fn known(vocabulary: &[&str], name: &str) -> bool {
    vocabulary
        .binary_search_by(|known| cmp_ignore_case(known, name))
        .is_ok()
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl Linter {
    /// Reports `ok` when `passed`, `bad` otherwise.
    fn verdict(&mut self, passed: bool, bad: &str) {
        self.emit(if passed { "ok" } else { bad });
    }

    /// Parses a list, forwarding the failure as a note.
    fn list(&mut self, value: &str, item: fn(&Linter) -> &Regex, bounds: Bounds) -> bool {
        let result = parse_list(value, item(self), bounds, |_| {});
        self.list_outcome(result)
    }

    /// Parses a list whose item names must belong to `vocabulary`. Unknown
    /// names are reported as they appear, under `label`.
    fn list_of_known(
        &mut self,
        value: &str,
        item: fn(&Linter) -> &Regex,
        vocabulary: &[&str],
        label: &'static str,
        unknown_key: &str,
    ) -> bool {
        let mut unknown = vec![];
        let result = parse_list(value, item(self), Bounds::at_least(1), |element| {
            if let Some(name) = element.name.filter(|name| !known(vocabulary, name)) {
                unknown.push(name.to_string());
            }
        });

        for name in unknown {
            self.note(Note::UnknownToken { label, value: name });
            self.emit(unknown_key);
        }
        self.list_outcome(result)
    }

    fn list_outcome(&mut self, result: Result<usize, ListError>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => {
                self.note(Note::List(err));
                false
            }
        }
    }

    fn accept_ranges(&mut self, value: &str) {
        let passed = matches!(value, "bytes" | "none");
        self.verdict(passed, "unknownrange");
    }

    fn age(&mut self, value: &str) {
        self.verdict(all_digits(value), "badage");
    }

    fn allow(&mut self, value: &str) {
        let passed = self.list(value, |l| &l.patterns.token, Bounds::at_least(0));
        self.verdict(passed, "badallow");
    }

    fn cache_control(&mut self, value: &str) {
        let passed = self.list_of_known(
            value,
            |l| &l.patterns.token_value,
            CACHE_DIRECTIVES,
            "Cache-Control directive",
            "unknowncachecont",
        );
        self.verdict(passed, "badcachecont");
    }

    fn connection(&mut self, value: &str) {
        self.verdict(value == "close", "badconnection");
    }

    fn content_encoding(&mut self, value: &str) {
        let passed = self.list_of_known(
            value,
            |l| &l.patterns.token,
            CONTENT_CODINGS,
            "Content-Encoding",
            "unknowncontenc",
        );
        self.verdict(passed, "badcontenc");
    }

    fn content_language(&mut self, value: &str) {
        let passed = self.list(value, |l| &l.patterns.token, Bounds::at_least(1));
        self.verdict(passed, "badcontlang");
    }

    fn content_length(&mut self, value: &str) {
        self.verdict(all_digits(value), "badcontlen");
    }

    fn content_location(&mut self, value: &str) {
        self.verdict(!value.contains(' '), "badcontloc");
    }

    fn content_md5(&mut self, value: &str) {
        // base64 of 16 bytes; counted in characters, one per received byte
        self.verdict(value.chars().count() == 24, "badcontmd5");
    }

    fn content_range(&mut self, _value: &str) {
        self.emit("contentrange");
    }

    fn content_type(&mut self, value: &str) {
        let Some(caps) = self.patterns.content_type.captures(value) else {
            self.emit("badcontenttype");
            return;
        };

        let is_text = caps
            .name("type")
            .is_some_and(|t| t.as_str().eq_ignore_ascii_case("text"));
        let has_charset = caps.name("parameters").is_some_and(|params| {
            self.patterns
                .parameter
                .captures_iter(params.as_str())
                .filter_map(|param| param.name("name"))
                .any(|name| name.as_str().eq_ignore_ascii_case("charset"))
        });

        self.verdict(!is_text || has_charset, "nocharset");
    }

    fn date_header(&mut self, value: &str) {
        let Some(instant) = self.date(value) else {
            return;
        };
        let skew = (self.now() - instant).num_seconds().abs();
        self.verdict(skew <= DATE_TOLERANCE_SECS, "wrongdate");
    }

    fn etag(&mut self, value: &str) {
        let passed = self.patterns.etag.is_match(value);
        self.verdict(passed, "badetag");
    }

    fn expires(&mut self, value: &str) {
        if self.date(value).is_some() {
            self.emit("ok");
        }
    }

    fn last_modified(&mut self, value: &str) {
        let Some(instant) = self.date(value) else {
            return;
        };
        let ahead = (instant - self.now()).num_seconds();
        self.verdict(ahead <= DATE_TOLERANCE_SECS, "futurelastmod");
    }

    fn location(&mut self, value: &str) {
        let passed = self.patterns.absolute_uri.is_match(value);
        self.verdict(passed, "badlocation");
    }

    fn pragma(&mut self, value: &str) {
        let passed = self.list(value, |l| &l.patterns.token_value, Bounds::at_least(1));
        self.verdict(passed, "badpragma");
    }

    fn retry_after(&mut self, value: &str) {
        if all_digits(value) || self.date(value).is_some() {
            self.emit("ok");
        }
    }

    fn server(&mut self, value: &str) {
        let passed = self.patterns.server.is_match(value);
        self.verdict(passed, "badserver");
    }

    fn trailer(&mut self, value: &str) {
        let passed = self.list(value, |l| &l.patterns.token, Bounds::at_least(1));
        self.verdict(passed, "badtrailer");
    }

    fn transfer_encoding(&mut self, value: &str) {
        let passed = self.list_of_known(
            value,
            |l| &l.patterns.transfer_coding,
            TRANSFER_CODINGS,
            "Transfer-Encoding",
            "unknowntransenc",
        );
        self.verdict(passed, "badtransenc");
    }

    fn upgrade(&mut self, value: &str) {
        let passed = self.list(value, |l| &l.patterns.upgrade, Bounds::at_least(1));
        self.verdict(passed, "badupgrade");
    }

    fn vary(&mut self, value: &str) {
        let passed = value == "*" || self.list(value, |l| &l.patterns.token, Bounds::at_least(1));
        self.verdict(passed, "badvary");
    }

    fn via(&mut self, _value: &str) {
        self.emit("via");
    }
}
