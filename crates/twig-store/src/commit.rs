//! Commit record codec.
//!
//! A commit payload is a block of `key value` header lines followed by a
//! blank line and a message:
//!
//! ```text
//! tree 025b46d991b8602e229fa477dbc50a98ee050dcf
//! parent a33e731eb4d600b08dcd34fea6fe45cecc7958a0
//! parent f4f16ee537a618502fac0f6a0db822ddd3b45b12
//! gpgsig -----BEGIN PGP SIGNATURE-----
//!  <continuation lines start with one space>
//!
//! Short message
//!
//! Long message body
//! ```
//!
//! [`Commit::parse`] and [`Commit::serialize`] are exact inverses on
//! well-formed input: header order, repeated keys and continuation lines all
//! survive a round trip byte for byte.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use twig_types::{ObjectId, TypeError};

/// Header key holding the parent commit hashes.
pub const PARENT: &str = "parent";
/// Header key holding the author signature.
pub const AUTHOR: &str = "author";

/// The value of a commit header: a scalar, or an ordered list once the key
/// has been seen more than once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// All values in order of appearance.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }

    /// The first value.
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Multi(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values().len()
    }

    /// Returns `true` if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Returns `true` if the key was repeated.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// Append a value, promoting a scalar to a list.
    fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multi(vec![first, value]);
            }
            Self::Multi(values) => values.push(value),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(value) => serializer.serialize_str(value),
            Self::Multi(values) => values.serialize(serializer),
        }
    }
}

/// A parsed commit: ordered header fields plus the short and long message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Commit {
    fields: Vec<(String, FieldValue)>,
    short_msg: Option<String>,
    long_msg: Option<String>,
    /// The payload ends right after the short message, without its newline.
    /// Git writes an empty message this way: headers, then one blank line.
    unterminated: bool,
}

impl Commit {
    /// Create an empty commit record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Builder form setting both message parts.
    pub fn with_message(mut self, short: impl Into<String>, long: Option<String>) -> Self {
        self.short_msg = Some(short.into());
        self.long_msg = long;
        self.unterminated = false;
        self
    }

    /// Append a header value. Insertion order is kept; a repeated key keeps
    /// its original position and its value becomes a list.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.fields.push((key, FieldValue::Single(value))),
        }
    }

    /// Look up a header field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Every value of a header field, empty when the field is absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.get(key).map(FieldValue::values).unwrap_or(&[])
    }

    /// Returns `true` if the header field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Header fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First line of the message.
    pub fn short_msg(&self) -> Option<&str> {
        self.short_msg.as_deref()
    }

    /// Message body after the short message.
    pub fn long_msg(&self) -> Option<&str> {
        self.long_msg.as_deref()
    }

    /// Parent hashes in stored order. Empty for a root commit.
    pub fn parents(&self) -> Result<Vec<ObjectId>, TypeError> {
        self.get_all(PARENT)
            .iter()
            .map(|hex| ObjectId::from_hex(hex))
            .collect()
    }

    /// Parse a commit payload.
    pub fn parse(text: &str) -> Self {
        let mut commit = Self::new();
        let mut segments = split_segments(text).into_iter();

        // Header phase ends at the first empty segment.
        for segment in segments.by_ref() {
            if segment.is_empty() {
                break;
            }
            let (key, value) = segment.split_once(' ').unwrap_or((segment, ""));
            commit.push(key, value.replace("\n ", "\n"));
        }

        if let Some(short) = segments.next() {
            commit.short_msg = Some(short.trim().to_string());

            let mut body = segments.peekable();
            commit.unterminated = body.peek().is_none();
            // One blank separator between the short and the long message.
            if body.peek().is_some_and(|s| s.is_empty()) {
                body.next();
            }
            let lines: Vec<&str> = body.collect();
            if !lines.is_empty() {
                commit.long_msg = Some(lines.join("\n"));
            }
        }

        commit
    }

    /// Serialize back to the payload text.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.fields {
            for v in value.values() {
                out.push_str(key);
                out.push(' ');
                out.push_str(&v.replace('\n', "\n "));
                out.push('\n');
            }
        }
        if let Some(short) = &self.short_msg {
            out.push('\n');
            out.push_str(short);
            if !self.unterminated {
                out.push('\n');
            }
        }
        if let Some(long) = &self.long_msg {
            out.push('\n');
            out.push_str(long);
        }
        out
    }
}

impl Serialize for Commit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(short) = &self.short_msg {
            map.serialize_entry("short_msg", short)?;
        }
        if let Some(long) = &self.long_msg {
            map.serialize_entry("long_msg", long)?;
        }
        map.end()
    }
}

/// Split at every newline that is not followed by a space.
fn split_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'\n' && bytes.get(i + 1) != Some(&b' ') {
            segments.push(&text[start..i]);
            start = i + 1;
        }
    }
    segments.push(&text[start..]);
    segments
}
