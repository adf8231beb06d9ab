use crate::patterns::Patterns;

/// `HTTP-Version SP Status-Code SP Reason-Phrase` (RFC 2616 section 6.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine<'a> {
    pub major: u32,
    pub minor: u32,
    pub code: u16,
    pub reason: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    ObsoleteVersion,
    FutureVersion,
    OutOfRange,
    /// Leading digit of a code in 100..=599.
    Class(u8),
}

impl StatusClass {
    pub fn key(&self) -> &'static str {
        match self {
            StatusClass::ObsoleteVersion => "oldhttp",
            StatusClass::FutureVersion => "futurehttp",
            StatusClass::OutOfRange => "badstatus",
            StatusClass::Class(1) => "1xx",
            StatusClass::Class(2) => "2xx",
            StatusClass::Class(3) => "3xx",
            StatusClass::Class(4) => "4xx",
            StatusClass::Class(_) => "5xx",
        }
    }
}

impl<'a> StatusLine<'a> {
    pub fn parse(line: &'a str, patterns: &Patterns) -> Option<Self> {
        let caps = patterns.status_line.captures(line)?;

        Some(Self {
            major: saturating_number(caps.name("major")?.as_str()),
            minor: saturating_number(caps.name("minor")?.as_str()),
            code: caps.name("code")?.as_str().parse().ok()?,
            reason: caps.name("reason")?.as_str(),
        })
    }

    pub fn classify(&self) -> StatusClass {
        match (self.major, self.minor) {
            (0, _) | (1, 0) => StatusClass::ObsoleteVersion,
            (1, 1) => match self.code {
                100..=599 => StatusClass::Class((self.code / 100) as u8),
                _ => StatusClass::OutOfRange,
            },
            _ => StatusClass::FutureVersion,
        }
    }
}

/// Version numbers too large for `u32` still compare as "newer than 1.1".
fn saturating_number(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(line: &str) -> Option<StatusClass> {
        let patterns = Patterns::new().unwrap();
        StatusLine::parse(line, &patterns).map(|status| status.classify())
    }

    #[test]
    fn parses_fields() {
        let patterns = Patterns::new().unwrap();
        let status = StatusLine::parse("HTTP/1.1 404 Not Found", &patterns).unwrap();
        assert_eq!(
            status,
            StatusLine {
                major: 1,
                minor: 1,
                code: 404,
                reason: "Not Found"
            }
        );
    }

    #[test]
    fn classification() {
        assert_eq!(classify("HTTP/1.1 404 Not Found"), Some(StatusClass::Class(4)));
        assert_eq!(classify("HTTP/1.1 101 Switching"), Some(StatusClass::Class(1)));
        assert_eq!(classify("HTTP/0.9 200 OK"), Some(StatusClass::ObsoleteVersion));
        assert_eq!(classify("HTTP/1.0 200 OK"), Some(StatusClass::ObsoleteVersion));
        assert_eq!(classify("HTTP/2.0 200 OK"), Some(StatusClass::FutureVersion));
        assert_eq!(classify("HTTP/1.2 200 OK"), Some(StatusClass::FutureVersion));
        assert_eq!(classify("HTTP/1.1 999 Weird"), Some(StatusClass::OutOfRange));
        assert_eq!(classify("HTTP/1.1 099 Low"), Some(StatusClass::OutOfRange));
    }

    #[test]
    fn huge_versions_are_future() {
        assert_eq!(
            classify("HTTP/99999999999.1 200 OK"),
            Some(StatusClass::FutureVersion)
        );
        assert_eq!(
            classify("HTTP/1.99999999999 200 OK"),
            Some(StatusClass::FutureVersion)
        );
    }

    #[test]
    fn empty_reason_is_allowed() {
        assert_eq!(classify("HTTP/1.1 200 "), Some(StatusClass::Class(2)));
        assert_eq!(classify("HTTP/1.1 200"), None);
        assert_eq!(classify("HTTP/1.1  200 OK"), None);
    }

    #[test]
    fn keys() {
        assert_eq!(StatusClass::Class(3).key(), "3xx");
        assert_eq!(StatusClass::OutOfRange.key(), "badstatus");
    }
}
