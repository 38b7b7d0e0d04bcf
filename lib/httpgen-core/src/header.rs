//! User-supplied header lines.
//!
//! Header lines arrive as raw `"Name: Value"` strings, duplicates allowed and
//! order preserved. [`Headers`] keeps the parsed form and answers the shape
//! questions the dispatch classifier asks.

use http::header::CONTENT_TYPE;
use serde::Serialize;

use crate::warning::{self, Warning};

/// One parsed `Name: Value` header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderLine {
    /// Header name, trimmed, original case.
    pub name: String,
    /// Header value, trimmed.
    pub value: String,
}

impl HeaderLine {
    /// Create a header line.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Split a raw line on its first `:`.
    ///
    /// Returns `None` when there is no `:` at all.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let (name, value) = line.split_once(':')?;
        Some(Self::new(name.trim(), value.trim()))
    }

    /// Returns `true` if the name is `Content-Type`, ignoring case.
    #[must_use]
    pub fn is_content_type(&self) -> bool {
        self.has_name(CONTENT_TYPE.as_str())
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Headers sharing a case-insensitive name, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderGroup {
    /// Name as first written by the user.
    pub name: String,
    /// Values in original order.
    pub values: Vec<String>,
}

/// Parsed user header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    lines: Vec<HeaderLine>,
    warnings: Vec<Warning>,
}

impl Headers {
    /// Parse raw header lines; lines without `:` become warnings.
    #[must_use]
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut headers = Self::default();
        for line in raw {
            let line = line.as_ref();
            match HeaderLine::parse(line) {
                Some(header) => headers.lines.push(header),
                None => warning::report(
                    &mut headers.warnings,
                    Warning::MalformedHeader(line.to_string()),
                ),
            }
        }
        headers
    }

    /// The well-formed lines, in order.
    #[must_use]
    pub fn lines(&self) -> &[HeaderLine] {
        &self.lines
    }

    /// Warnings produced while parsing.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Returns `true` if there are no well-formed header lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `true` iff there is no header, or exactly one and it is `Content-Type`.
    #[must_use]
    pub fn only_has_content_type(&self) -> bool {
        match self.lines.as_slice() {
            [] => true,
            [single] => single.is_content_type(),
            _ => false,
        }
    }

    /// Value of the first `Content-Type` header, if any.
    #[must_use]
    pub fn find_content_type(&self) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.is_content_type())
            .map(|line| line.value.as_str())
    }

    /// Group headers by case-insensitive name, preserving first-seen order.
    #[must_use]
    pub fn grouped(&self) -> Vec<HeaderGroup> {
        let mut groups: Vec<HeaderGroup> = Vec::new();
        for line in &self.lines {
            match groups
                .iter_mut()
                .find(|group| group.name.eq_ignore_ascii_case(&line.name))
            {
                Some(group) => group.values.push(line.value.clone()),
                None => groups.push(HeaderGroup {
                    name: line.name.clone(),
                    values: vec![line.value.clone()],
                }),
            }
        }
        groups
    }
}
