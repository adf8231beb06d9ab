//! Set-Cookie, as described by the original Netscape cookie specification.
//!
//! ```text
//! Set-Cookie: NAME=VALUE; expires=DATE; path=PATH; domain=DOMAIN_NAME; secure
//! ```

use crate::{
    Linter,
    date::parse_cookie_date,
    linter::{DATE_TOLERANCE_SECS, Note},
    list::skip_lws,
};

/// Case-insensitive `prefix` match, returning what follows it.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

impl Linter {
    /// Every component is checked even after one fails; `ok` is reported
    /// only when none did.
    pub(crate) fn set_cookie(&mut self, value: &str) {
        let (name_value, attributes) = match value.split_once(';') {
            Some((name_value, attributes)) => (name_value, Some(attributes)),
            None => (value, None),
        };

        let mut ok = true;

        if !self.patterns.cookie_name_value.is_match(name_value) {
            self.emit("cookiebadnameval");
            ok = false;
        }

        let mut attributes: Vec<&str> = attributes
            .into_iter()
            .flat_map(|a| a.split(';'))
            .map(|attribute| skip_lws(attribute).trim_end_matches([' ', '\t']))
            .collect();
        // a trailing `;` ends the attribute list; empty fields before it are reported
        if attributes.last() == Some(&"") {
            attributes.pop();
        }

        for attribute in attributes {
            ok &= self.cookie_attribute(attribute);
        }

        if ok {
            self.emit("ok");
        }
    }

    fn cookie_attribute(&mut self, attribute: &str) -> bool {
        if let Some(expires) = strip_prefix_ignore_case(attribute, "expires=") {
            let Some(instant) =
                parse_cookie_date(expires, &self.patterns).and_then(|ts| ts.instant())
            else {
                self.emit("cookiebaddate");
                return false;
            };
            if (self.now() - instant).num_seconds() > DATE_TOLERANCE_SECS {
                self.emit("cookiepastdate");
                return false;
            }
            true
        } else if strip_prefix_ignore_case(attribute, "domain=").is_some() {
            true
        } else if let Some(path) = strip_prefix_ignore_case(attribute, "path=") {
            if !path.starts_with('/') {
                self.emit("cookiebadpath");
                return false;
            }
            true
        } else if attribute.eq_ignore_ascii_case("secure") {
            true
        } else {
            self.note(Note::UnknownToken {
                label: "Set-Cookie field",
                value: attribute.to_string(),
            });
            self.emit("cookieunknownfield");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Clock, Config, Event, Linter};
    use chrono::{TimeZone as _, Utc};

    fn keys(value: &str) -> Vec<String> {
        let mut linter = Linter::new(&Config::default()).unwrap();
        linter.set_clock(Clock::Fixed(
            Utc.with_ymd_and_hms(2004, 1, 1, 0, 0, 0).unwrap(),
        ));
        linter.begin("http://example.com/");
        linter.check_header("Set-Cookie", value);
        linter
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Diagnostic(d) => Some(d.key),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn plain_cookie() {
        assert_eq!(keys("a=b"), ["ok"]);
        assert_eq!(keys("a="), ["ok"]);
        assert_eq!(keys("=b"), ["cookiebadnameval"]);
        assert_eq!(keys("a b=c"), ["cookiebadnameval"]);
    }

    #[test]
    fn all_attributes() {
        assert_eq!(
            keys("id=1; expires=Fri, 31-Dec-2010 23:59:59 GMT; path=/; domain=.example.com; secure"),
            ["ok"]
        );
        assert_eq!(keys("id=1; Secure; Path=/app"), ["ok"]);
    }

    #[test]
    fn past_expiry() {
        assert_eq!(
            keys("a=b; expires=Sun, 06-Nov-1994 08:49:37 GMT; path=/"),
            ["cookiepastdate"]
        );
    }

    #[test]
    fn errors_accumulate() {
        assert_eq!(
            keys("a=b; expires=Sun, 06-Nov-1994 08:49:37 GMT; path=x"),
            ["cookiepastdate", "cookiebadpath"]
        );
        assert_eq!(
            keys("a b; expires=Sun, 06 Nov 1994 08:49:37 GMT; httponly"),
            ["cookiebadnameval", "cookiebaddate", "cookieunknownfield"]
        );
    }

    #[test]
    fn trailing_semicolon() {
        assert_eq!(keys("a=b;"), ["ok"]);
        assert_eq!(keys("a=b; path=/;"), ["ok"]);
        assert_eq!(keys("a=b; path=/; "), ["ok"]);
        assert_eq!(keys("a=b; path=x;"), ["cookiebadpath"]);
    }

    #[test]
    fn empty_middle_field() {
        assert_eq!(keys("a=b; ; path=/"), ["cookieunknownfield"]);
        assert_eq!(keys("a=b;;"), ["cookieunknownfield"]);
    }

    #[test]
    fn unknown_fields_are_named() {
        let mut linter = Linter::new(&Config::default()).unwrap();
        linter.begin("http://example.com/");
        linter.check_header("Set-Cookie", "a=b; HttpOnly");
        let notes: Vec<String> = linter
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::Note(note) => Some(note.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(notes, ["Set-Cookie field 'HttpOnly':"]);
    }
}
