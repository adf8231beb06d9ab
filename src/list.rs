//! The `#rule` list construct: `element *( "," element )` with empty elements
//! allowed between commas and linear white space around every separator.

use crate::patterns::unescape;
use regex::{Captures, Regex};
use std::{borrow::Cow, fmt};

/// Allowed number of items in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: Option<usize>,
}

impl Bounds {
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    fn contains(&self, count: usize) -> bool {
        self.min <= count && self.max.is_none_or(|max| count <= max)
    }
}

/// Why a value was rejected as a list. Indexes are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    UnparsableItem { index: usize },
    ExpectedComma { index: usize },
    Count { count: usize, bounds: Bounds },
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::UnparsableItem { index } => write!(f, "Failed to match list item {index}"),
            ListError::ExpectedComma { index } => write!(f, "Expecting , after list item {index}"),
            ListError::Count { count, bounds } => {
                write!(f, "{count} items in list, but there should be ")?;
                match bounds.max {
                    None => write!(f, "at least {}", bounds.min),
                    Some(max) => write!(f, "between {} and {max}", bounds.min),
                }
            }
        }
    }
}

/// One element of a list, as seen by the per-item handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub raw: &'a str,
    pub name: Option<&'a str>,
    pub value: Option<Cow<'a, str>>,
}

impl<'a> ListItem<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let value = match (caps.name("token"), caps.name("quoted")) {
            (Some(token), _) => Some(Cow::Borrowed(token.as_str())),
            (None, Some(quoted)) => Some(Cow::Owned(unescape(quoted.as_str()))),
            (None, None) => None,
        };

        Self {
            raw: caps.get(0).map_or("", |m| m.as_str()),
            name: caps.name("name").map(|m| m.as_str()),
            value,
        }
    }
}

/// Skips optional linear white space, including a single CRLF line fold.
pub fn skip_lws(s: &str) -> &str {
    let s = match s.strip_prefix("\r\n") {
        Some(rest) if rest.starts_with([' ', '\t']) => rest,
        _ => s,
    };
    s.trim_start_matches([' ', '\t'])
}

/// Parses `value` as a list whose elements match `item` (a pattern anchored
/// with `^`). `on_item` sees every element left to right; the item count is
/// checked against `bounds` only once every element parsed.
pub fn parse_list<'a, F>(
    value: &'a str,
    item: &Regex,
    bounds: Bounds,
    mut on_item: F,
) -> Result<usize, ListError>
where
    F: FnMut(ListItem<'a>),
{
    let mut rest = value;
    let mut count = 0;

    loop {
        let caps = item
            .captures(rest)
            .ok_or(ListError::UnparsableItem { index: count + 1 })?;
        let end = caps.get(0).map_or(0, |m| m.end());

        on_item(ListItem::from_captures(&caps));
        count += 1;

        rest = skip_lws(&rest[end..]);
        if rest.is_empty() {
            break;
        }
        if !rest.starts_with(',') {
            return Err(ListError::ExpectedComma { index: count });
        }
        while let Some(after) = rest.strip_prefix(',') {
            rest = skip_lws(after);
        }
        if rest.is_empty() {
            break;
        }
    }

    if !bounds.contains(count) {
        return Err(ListError::Count { count, bounds });
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::Patterns;

    #[test]
    fn items_delivered_in_order() {
        let p = Patterns::new().unwrap();
        let mut names = vec![];
        let count = parse_list("gzip, deflate,identity", &p.token, Bounds::at_least(1), |item| {
            names.push(item.raw)
        });
        assert_eq!(count, Ok(3));
        assert_eq!(names, ["gzip", "deflate", "identity"]);
    }

    #[test]
    fn empty_elements_and_folding_are_skipped() {
        let p = Patterns::new().unwrap();
        let mut names = vec![];
        let count = parse_list("a ,, b,\r\n\tc,", &p.token, Bounds::between(1, 3), |item| {
            names.push(item.raw)
        });
        assert_eq!(count, Ok(3));
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn quoted_values_may_contain_commas() {
        let p = Patterns::new().unwrap();
        let mut items = vec![];
        let count = parse_list(
            r#"private="set-cookie, x\"y", max-age=0"#,
            &p.token_value,
            Bounds::at_least(1),
            |item| items.push((item.name, item.value)),
        );
        assert_eq!(count, Ok(2));
        assert_eq!(items[0].0, Some("private"));
        assert_eq!(items[0].1.as_deref(), Some(r#"set-cookie, x"y"#));
        assert_eq!(items[1].1.as_deref(), Some("0"));
    }

    #[test]
    fn reports_first_bad_item() {
        let p = Patterns::new().unwrap();
        let mut calls = 0;
        let err = parse_list("a, b, ;c", &p.token, Bounds::at_least(1), |_| calls += 1);
        assert_eq!(err, Err(ListError::UnparsableItem { index: 3 }));
        assert_eq!(calls, 2);
    }

    #[test]
    fn reports_missing_comma() {
        let p = Patterns::new().unwrap();
        let err = parse_list("a b", &p.token, Bounds::at_least(1), |_| {});
        assert_eq!(err, Err(ListError::ExpectedComma { index: 1 }));
        assert_eq!(
            err.unwrap_err().to_string(),
            "Expecting , after list item 1"
        );
    }

    #[test]
    fn count_outside_bounds() {
        let p = Patterns::new().unwrap();
        let mut calls = 0;
        let err = parse_list("a, b, c", &p.token, Bounds::between(1, 2), |_| calls += 1);
        assert_eq!(
            err,
            Err(ListError::Count {
                count: 3,
                bounds: Bounds::between(1, 2)
            })
        );
        assert_eq!(calls, 3);
        assert_eq!(
            err.unwrap_err().to_string(),
            "3 items in list, but there should be between 1 and 2"
        );

        let err = parse_list("a", &p.token, Bounds::at_least(2), |_| {}).unwrap_err();
        assert_eq!(err.to_string(), "1 items in list, but there should be at least 2");
    }

    #[test]
    fn empty_value_fails_first_item() {
        let p = Patterns::new().unwrap();
        let err = parse_list("", &p.token, Bounds::at_least(0), |_| {});
        assert_eq!(err, Err(ListError::UnparsableItem { index: 1 }));
    }

    #[test]
    fn lws_skipping() {
        assert_eq!(skip_lws("  \tx"), "x");
        assert_eq!(skip_lws("\r\n x"), "x");
        assert_eq!(skip_lws("\r\nx"), "\r\nx");
    }
}
