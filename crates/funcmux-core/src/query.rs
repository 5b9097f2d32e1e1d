//! Query string parsing utilities.
//!
//! [`QueryParams`] is the owned, ordered multi-map handlers read query
//! parameters from. The router appends captured path variables to the same
//! collection, so a `:id` segment and `?id=` are looked up the same way.
//!
//! # Example
//!
//! ```
//! use funcmux_core::QueryParams;
//!
//! let qs = QueryParams::parse("a=1&b=2&a=3");
//!
//! assert_eq!(qs.get("a"), Some("1"));
//! assert_eq!(qs.get("b"), Some("2"));
//!
//! let a_values: Vec<_> = qs.get_all("a").collect();
//! assert_eq!(a_values, vec!["1", "3"]);
//! ```

use std::borrow::Cow;

/// Ordered collection of decoded query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (without the leading `?`).
    ///
    /// Keys and values are percent-decoded; `+` decodes to a space. Keys
    /// without values (like `?flag`) get an empty value.
    ///
    /// ```
    /// use funcmux_core::QueryParams;
    ///
    /// let qs = QueryParams::parse("msg=hello%20world&flag");
    /// assert_eq!(qs.get("msg"), Some("hello world"));
    /// assert_eq!(qs.get("flag"), Some(""));
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let pairs = raw
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (
                    percent_decode(key).into_owned(),
                    percent_decode(value).into_owned(),
                )
            })
            .collect();
        Self { pairs }
    }

    /// Get the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get all values for a key, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a key exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Append a pair after all existing pairs.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Append every pair of `other`, preserving its order.
    pub fn extend(&mut self, other: QueryParams) {
        self.pairs.extend(other.pairs);
    }

    /// Iterate over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true when there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Percent-decode a query component.
///
/// Returns a `Cow::Borrowed` if no decoding was needed (most common case),
/// or `Cow::Owned` if percent sequences were decoded. Plus signs decode to
/// spaces. Invalid sequences are left as-is.
///
/// ```
/// use funcmux_core::percent_decode;
///
/// let simple = percent_decode("hello");
/// assert!(matches!(simple, std::borrow::Cow::Borrowed(_)));
///
/// assert_eq!(&*percent_decode("hello%20world"), "hello world");
/// assert_eq!(&*percent_decode("hello+world"), "hello world");
/// ```
pub fn percent_decode(s: &str) -> Cow<'_, str> {
    decode(s, true)
}

/// Percent-decode a path segment. Unlike [`percent_decode`], `+` is kept.
pub fn percent_decode_path(s: &str) -> Cow<'_, str> {
    decode(s, false)
}

fn decode(s: &str, plus_as_space: bool) -> Cow<'_, str> {
    // Fast path: no encoding
    if !s.contains('%') && !(plus_as_space && s.contains('+')) {
        return Cow::Borrowed(s);
    }

    let mut result = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                    result.push((hi << 4) | lo);
                    i += 3;
                } else {
                    result.push(b'%');
                    i += 1;
                }
            }
            b'+' if plus_as_space => {
                result.push(b' ');
                i += 1;
            }
            b => {
                result.push(b);
                i += 1;
            }
        }
    }

    // Invalid UTF-8 after decoding is replaced rather than rejected.
    Cow::Owned(String::from_utf8_lossy(&result).into_owned())
}

/// Convert a hex digit to its numeric value.
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
