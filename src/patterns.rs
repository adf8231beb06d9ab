use anyhow::{Context as _, Result};
use regex::Regex;

const TOKEN: &str = r"[-0-9a-zA-Z_.!]+";
// Media types, codings and parameter names do not admit `!`.
const NARROW_TOKEN: &str = r"[-0-9a-zA-Z_.]+";
const QUOTED_BODY: &str = r#"(?:[^"\\]|\\.)*"#;

const WEEKDAY: &str = "(?:Mon|Tue|Wed|Thu|Fri|Sat|Sun)";
const LONG_WEEKDAY: &str = "(?:Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday)";
const MONTH: &str = "(?P<month>Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)";
const CLOCK: &str = "(?P<hour>[012][0-9]):(?P<minute>[0-5][0-9]):(?P<second>[0-5][0-9])";

/// Every grammar the linter matches header values against.
///
/// Built once per [`Linter`](crate::Linter); matching never mutates anything,
/// so one set serves any number of checked URLs.
#[derive(Debug)]
pub struct Patterns {
    pub token: Regex,
    pub token_value: Regex,
    pub content_type: Regex,
    pub parameter: Regex,
    pub absolute_uri: Regex,
    pub etag: Regex,
    pub server: Regex,
    pub transfer_coding: Regex,
    pub upgrade: Regex,
    /// URLs made only of path segments; anything else is reported as ugly.
    pub clean_url: Regex,
    pub status_line: Regex,
    pub rfc1123: Regex,
    pub rfc1036: Regex,
    pub asctime: Regex,
    pub cookie_name_value: Regex,
    pub cookie_expires: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self> {
        let parameter_tail = format!(
            r#"(?:;[ \t]*{NARROW_TOKEN}=(?:{NARROW_TOKEN}|"{QUOTED_BODY}")[ \t]*)*"#
        );

        let server_item = format!(r"(?:{TOKEN}(?:/{NARROW_TOKEN})?|\(.*\))");

        Ok(Self {
            token: compile(&format!("^(?P<name>{TOKEN})"))?,
            token_value: compile(&format!(
                r#"^(?P<name>{TOKEN})(?:=(?:(?P<token>{TOKEN})|"(?P<quoted>{QUOTED_BODY})"))?"#
            ))?,
            content_type: compile(&format!(
                r"^(?P<type>{NARROW_TOKEN})/(?P<subtype>{NARROW_TOKEN})[ \t]*(?P<parameters>{parameter_tail})$"
            ))?,
            parameter: compile(&format!(
                r#";[ \t]*(?P<name>{NARROW_TOKEN})=(?:(?P<token>{NARROW_TOKEN})|"(?P<quoted>{QUOTED_BODY})")"#
            ))?,
            absolute_uri: compile("^[a-zA-Z0-9]+://[^ ]+$")?,
            etag: compile(&format!(r#"^(?P<weak>W/[ \t]*)?"(?P<opaque>{QUOTED_BODY})"$"#))?,
            // product tokens and comments, separated by white space
            server: compile(&format!(
                r"^{server_item}(?:[ \t]+{server_item})*[ \t]*$"
            ))?,
            transfer_coding: compile(&format!(
                r"^(?P<name>{NARROW_TOKEN})[ \t]*{parameter_tail}"
            ))?,
            upgrade: compile(&format!("^(?P<name>{NARROW_TOKEN}(?:/{NARROW_TOKEN})*)"))?,
            clean_url: compile("^[a-zA-Z0-9]+://[^/]+[-/a-zA-Z0-9_]*$")?,
            status_line: compile(
                r"^HTTP/(?P<major>[0-9]+)\.(?P<minor>[0-9]+) (?P<code>[0-9]{3}) (?P<reason>[\t\x20-\x7E\x{80}-\x{FF}]*)$",
            )?,
            rfc1123: compile(&format!(
                "^{WEEKDAY}, (?P<day>[0123][0-9]) {MONTH} (?P<year>[0-9]{{4}}) {CLOCK} GMT$"
            ))?,
            rfc1036: compile(&format!(
                "^{LONG_WEEKDAY}, (?P<day>[0123][0-9])-{MONTH}-(?P<year>[0-9]{{2}}) {CLOCK} GMT$"
            ))?,
            asctime: compile(&format!(
                "^{WEEKDAY} {MONTH} (?P<day>[ 12][0-9]) {CLOCK} (?P<year>[0-9]{{4}})$"
            ))?,
            cookie_name_value: compile("^[^;, ]+=[^;, ]*$")?,
            cookie_expires: compile(&format!(
                "^{WEEKDAY}, (?P<day>[0123][0-9])-{MONTH}-(?P<year>[0-9]{{4}}) {CLOCK} GMT$"
            ))?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("failed to compile pattern '{pattern}'"))
}

/// Resolves backslash escapes inside the body of a quoted string.
pub fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> Patterns {
        Patterns::new().unwrap()
    }

    #[test]
    fn token_stops_at_separator() {
        let p = patterns();
        let caps = p.token.captures("no-cache, private").unwrap();
        assert_eq!(&caps["name"], "no-cache");
        assert!(p.token.captures(" leading").is_none());
    }

    #[test]
    fn token_value_handles_escaped_quotes() {
        let p = patterns();
        let caps = p.token_value.captures(r#"private="a\"b", x"#).unwrap();
        assert_eq!(&caps["name"], "private");
        assert_eq!(&caps["quoted"], r#"a\"b"#);
        assert_eq!(unescape(&caps["quoted"]), r#"a"b"#);
        assert_eq!(&caps[0], r#"private="a\"b""#);

        let caps = p.token_value.captures("max-age=60").unwrap();
        assert_eq!(&caps["token"], "60");
    }

    #[test]
    fn content_type_consumes_whole_value() {
        let p = patterns();
        assert!(p.content_type.is_match("text/html"));
        assert!(p.content_type.is_match(r#"text/html; charset="utf-8" ; q=1"#));
        assert!(!p.content_type.is_match("text/html; charset"));
        assert!(!p.content_type.is_match("text"));
    }

    #[test]
    fn etag_weak_and_strong() {
        let p = patterns();
        assert!(p.etag.is_match(r#""abc""#));
        assert!(p.etag.is_match(r#"W/"abc""#));
        assert!(p.etag.is_match(r#""a\"c""#));
        assert!(!p.etag.is_match("abc"));
        assert!(!p.etag.is_match(r#""a"c""#));
    }

    #[test]
    fn server_products_and_comments() {
        let p = patterns();
        assert!(p.server.is_match("Apache/2.4.1 (Unix) OpenSSL/1.0"));
        assert!(p.server.is_match("nginx"));
        assert!(!p.server.is_match("Apache/2.4/x"));
        assert!(!p.server.is_match("Apache/2/3"));
        assert!(p.server.is_match("Apache/2.4.1\t(Unix) "));
        assert!(!p.server.is_match(""));
    }

    #[test]
    fn ugly_urls() {
        let p = patterns();
        assert!(p.clean_url.is_match("http://example.com/a/b-c_d/"));
        assert!(p.clean_url.is_match("http://example.com"));
        assert!(!p.clean_url.is_match("http://example.com/index.php"));
        assert!(!p.clean_url.is_match("http://example.com/a?b=c"));
    }

    #[test]
    fn status_line_accepts_latin1_reason() {
        let p = patterns();
        assert!(p.status_line.is_match("HTTP/1.1 200 Tr\u{e8}s bien"));
        assert!(!p.status_line.is_match("HTTP/1.1 200 O\u{7}K"));
        assert!(!p.status_line.is_match("HTTP/1.1 20 OK"));
    }
}
