//! Human readable text for every condition the linter can report.

use std::{cmp::Ordering, fmt};
use table::MESSAGES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Ok,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Severity::Ok | Severity::Info => None,
            Severity::Warning => Some("Warning"),
            Severity::Error => Some("Error"),
        }
    }
}

/// One reported condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub key: String,
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity.label() {
            Some(label) => write!(f, "{label}: {}", self.text),
            None => f.write_str(&self.text),
        }
    }
}

/// Resolves `key` against the catalog. Unknown keys come back as
/// informational diagnostics whose text is the key itself.
pub fn lookup(key: &str) -> Diagnostic {
    match MESSAGES.binary_search_by(|(k, _, _)| cmp_ignore_case(k, key)) {
        Ok(index) => {
            let (key, severity, text) = MESSAGES[index];
            Diagnostic {
                key: key.to_string(),
                severity,
                text: text.to_string(),
            }
        }
        Err(_) => {
            log::warn!("no catalog entry for diagnostic key '{key}'");
            Diagnostic {
                key: key.to_string(),
                severity: Severity::Info,
                text: key.to_string(),
            }
        }
    }
}

/// ASCII case-insensitive ordering, the order every lookup table is kept in.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

mod table {
    use super::Severity::{self, Error, Info, Ok, Warning};

    // Sorted by key.
    pub(super) static MESSAGES: &[(&str, Severity, &str)] = &[
        ("1xx", Info, "A response status code in the range 100 - 199 indicates a 'provisional response'."),
        ("2xx", Info, "A response status code in the range 200 - 299 indicates that the request was successful."),
        ("3xx", Info, "A response status code in the range 300 - 399 indicates that the client should redirect to a new URL."),
        ("4xx", Info, "A response status code in the range 400 - 499 indicates that the request could not be fulfilled due to client error."),
        ("5xx", Info, "A response status code in the range 500 - 599 indicates that an error occurred on the server."),
        ("asctime", Warning, "This date is in the obsolete asctime() format. Consider using the RFC 1123 format instead."),
        ("badage", Error, "The Age header must be one number."),
        ("badallow", Error, "The Allow header must be a comma-separated list of HTTP methods."),
        ("badcachecont", Error, "The Cache-Control header must be a comma-separated list of directives."),
        ("badconnection", Warning, "The only value of the Connection header defined by HTTP/1.1 is \"close\"."),
        ("badcontenc", Error, "The Content-Encoding header must be a comma-separated list of encodings."),
        ("badcontenttype", Error, "The Content-Type header must be of the form 'type/subtype (; optional parameters)'."),
        ("badcontlang", Error, "The Content-Language header must be a comma-separated list of language tags."),
        ("badcontlen", Error, "The Content-Length header must be a number."),
        ("badcontloc", Error, "The Content-Location header must be an absolute or relative URI."),
        ("badcontmd5", Error, "The Content-MD5 header must be a base64 encoded MD5 sum."),
        ("baddate", Error, "Failed to parse this date. Dates should be in the RFC 1123 format."),
        ("badetag", Error, "The ETag header must be a quoted string (optionally preceded by \"W/\" for a weak tag)."),
        ("badlocation", Error, "The Location header must be an absolute URI. Relative URIs are not permitted."),
        ("badpragma", Error, "The Pragma header must be a comma-separated list of directives."),
        ("badserver", Error, "The Server header must be a space-separated list of products of the form Name/optional-version and comments in ()."),
        ("badstatus", Warning, "The response status code is outside the standard range 100 - 599."),
        ("badstatusline", Error, "Failed to parse the response Status-Line. The status line must be of the form 'HTTP/n.n <3-digit status> <reason phrase>'."),
        ("badtrailer", Error, "The Trailer header must be a comma-separated list of header names."),
        ("badtransenc", Error, "The Transfer-Encoding header must be a comma-separated list of encodings."),
        ("badupgrade", Error, "The Upgrade header must be a comma-separated list of product identifiers."),
        ("badvary", Error, "The Vary header must be a comma-separated list of header names, or \"*\"."),
        ("contentrange", Warning, "The Content-Range header should not be returned by the server for this request."),
        ("cookiebaddate", Error, "The expires date must be in the form \"Wdy, DD-Mon-YYYY HH:MM:SS GMT\"."),
        ("cookiebadnameval", Error, "A Set-Cookie header must start with name=value, each excluding semi-colon, comma and white space."),
        ("cookiebadpath", Error, "The path does not start with \"/\"."),
        ("cookiepastdate", Warning, "The expires date is in the past. The cookie will be deleted by browsers."),
        ("cookieunknownfield", Warning, "This is not a standard Set-Cookie field."),
        ("endofheaders", Info, "End of headers."),
        ("futurehttp", Warning, "I only understand HTTP/1.1. Check for a newer version of this tool."),
        ("futurelastmod", Error, "The specified Last-Modified date-time is in the future."),
        ("headertoolong", Warning, "Header too long."),
        ("missingcolon", Error, "Headers must be of the form 'Name: value'."),
        ("missingcontenttype", Warning, "No Content-Type header was present. The client will have to guess the media type or ask the user. Adding a Content-Type header is strongly recommended."),
        ("missingcontlang", Info, "Consider adding a Content-Language header if applicable for this document."),
        ("missingdate", Warning, "No Date header was present. A Date header must be present, unless the server does not have a clock, or the response is 100, 101, or 500 - 599."),
        ("missinglastmod", Info, "No Last-Modified header was present. The HTTP/1.1 specification states that this header should be sent whenever feasible."),
        ("nocharset", Warning, "No character set is specified in the Content-Type. Clients may assume the default of ISO-8859-1. Consider appending '; charset=...'."),
        ("nonstandard", Warning, "I don't know anything about this header. Is it a standard HTTP response header?"),
        ("notcrlf", Error, "This header line does not end in CR LF. HTTP requires that all header lines end with CR LF."),
        ("nothttp", Warning, "This is not an http or https url."),
        ("ok", Ok, "OK."),
        ("oldhttp", Warning, "This version of HTTP is obsolete. Consider upgrading to HTTP/1.1."),
        ("rfc1036", Warning, "This date is in the obsolete RFC 1036 format. Consider using the RFC 1123 format instead."),
        ("ugly", Info, "This URL appears to contain implementation-specific parts such as an extension or a query string. This may make the URL liable to change when the implementation is changed, resulting in broken links. Consider using URL rewriting or equivalent to implement a future-proof URL space. See http://www.w3.org/Provider/Style/URI for more information."),
        ("unknowncachecont", Warning, "This Cache-Control directive is non-standard and will have limited support."),
        ("unknowncontenc", Warning, "This is not a standard Content-Encoding."),
        ("unknownrange", Warning, "This range unit is not a standard HTTP/1.1 range."),
        ("unknowntransenc", Warning, "This is not a standard Transfer-Encoding."),
        ("via", Info, "This header was added by a proxy, cache or gateway."),
        ("wrongdate", Warning, "The server date-time differs from this system's date-time by more than 10 seconds. Check that both the system clocks are correct."),
        ("xheader", Info, "This is an extension header. I don't know how to check it."),
    ];
}
