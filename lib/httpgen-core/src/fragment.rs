//! Payload fragment classification.
//!
//! Each `-d`-family or `-F`-family occurrence is turned into a typed
//! fragment: where its content comes from (literal text or a file), how
//! that content is encoded, and for form fields which multipart role it
//! plays.

use serde::Serialize;

use crate::content_type::ContentTypeSource;
use crate::multipart::{Part, basename};
use crate::options::{RawFragment, RawFragmentKind};
use crate::query::{self, FormMap};
use crate::warning::{self, Warning};
use crate::{Error, Result};

/// Where a fragment's content comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Source {
    /// Text given on the command line.
    Literal(String),
    /// A file read by the generated code.
    File(String),
}

/// How a fragment's content is transformed before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentEncoding {
    /// `\n` characters are removed (`-d`).
    StripNewlines,
    /// Sent as-is (`--data-binary`, form pairs).
    Verbatim,
    /// Form-style percent-encoding of the whole content (`--data-urlencode`).
    PercentEncoded,
}

impl FragmentEncoding {
    /// The encoding curl applies to a data kind.
    #[must_use]
    pub const fn for_kind(kind: RawFragmentKind) -> Self {
        match kind {
            RawFragmentKind::AsciiData => Self::StripNewlines,
            RawFragmentKind::UrlEncodedData => Self::PercentEncoded,
            RawFragmentKind::BinaryData
            | RawFragmentKind::FormField
            | RawFragmentKind::FormStringField => Self::Verbatim,
        }
    }

    /// Apply the encoding to some content.
    #[must_use]
    pub fn apply(self, content: &str) -> String {
        match self {
            Self::StripNewlines => content.replace('\n', ""),
            Self::Verbatim => content.to_string(),
            Self::PercentEncoded => query::form_escape(content),
        }
    }
}

/// A piece of a concatenated body or query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyFragment {
    /// Option the fragment came from.
    pub kind: RawFragmentKind,
    /// Literal text or file path.
    pub source: Source,
    /// Encoding applied to the content.
    pub encoding: FragmentEncoding,
}

impl BodyFragment {
    /// The encoded text, for literal sources.
    #[must_use]
    pub fn literal(&self) -> Option<String> {
        match &self.source {
            Source::Literal(text) => Some(self.encoding.apply(text)),
            Source::File(_) => None,
        }
    }

    /// The referenced file, for file sources.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Literal(_) => None,
        }
    }
}

/// What a classified fragment contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A `-d`-family fragment.
    Data(BodyFragment),
    /// A `-F`-family fragment.
    Form(Part),
}

/// A raw fragment together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFragment {
    raw: RawFragment,
    payload: Payload,
}

impl ClassifiedFragment {
    /// The fragment as typed by the user.
    #[must_use]
    pub const fn raw(&self) -> &RawFragment {
        &self.raw
    }

    /// The classified payload.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns `true` if the content is read from a file.
    #[must_use]
    pub fn references_file(&self) -> bool {
        match &self.payload {
            Payload::Data(fragment) => fragment.file().is_some(),
            Payload::Form(part) => part.path().is_some(),
        }
    }

    /// The fragment as a form map, if it is simple-form-compatible.
    ///
    /// Compatible means: no file reference, and the encoded content parses
    /// as a non-empty query string in which no value is empty. A form field
    /// value is taken verbatim, so one holding `&`, `+` or `%` is not
    /// compatible.
    #[must_use]
    pub fn simple_form(&self) -> Option<FormMap> {
        let text = match &self.payload {
            Payload::Data(fragment) => fragment.literal()?,
            Payload::Form(Part::Field { value, .. }) if value.contains(['&', '+', '%']) => {
                return None;
            }
            Payload::Form(Part::Field { .. }) => self.raw.value.clone(),
            Payload::Form(_) => return None,
        };
        query::parse_query(&text).filter(|map| !map.is_empty() && !map.has_empty_value())
    }

    /// The fragment as a piece of a concatenated body or query.
    ///
    /// Form fields contribute their verbatim `name=value` text. Form file
    /// references cannot be flattened and yield `None`.
    #[must_use]
    pub fn concatenated(&self) -> Option<BodyFragment> {
        match &self.payload {
            Payload::Data(fragment) => Some(fragment.clone()),
            Payload::Form(Part::Field { .. }) => Some(BodyFragment {
                kind: self.raw.kind,
                source: Source::Literal(self.raw.value.clone()),
                encoding: FragmentEncoding::Verbatim,
            }),
            Payload::Form(_) => None,
        }
    }

    /// The multipart part, for form fragments.
    #[must_use]
    pub const fn form_part(&self) -> Option<&Part> {
        match &self.payload {
            Payload::Form(part) => Some(part),
            Payload::Data(_) => None,
        }
    }
}

/// Classify every fragment, in order.
///
/// # Errors
///
/// See [`classify`].
pub fn classify_all(
    fragments: &[RawFragment],
    warnings: &mut Vec<Warning>,
) -> Result<Vec<ClassifiedFragment>> {
    fragments
        .iter()
        .map(|fragment| classify(fragment, warnings))
        .collect()
}

/// Classify one fragment.
///
/// # Errors
///
/// Returns [`Error::MalformedField`] for a form fragment without `=`, and a
/// configuration error for an `@` or `<` with no file name.
pub fn classify(fragment: &RawFragment, warnings: &mut Vec<Warning>) -> Result<ClassifiedFragment> {
    let payload = if fragment.kind.is_form() {
        Payload::Form(classify_form(fragment, warnings)?)
    } else {
        Payload::Data(classify_data(fragment)?)
    };
    tracing::debug!(kind = ?fragment.kind, ?payload, "classified fragment");
    Ok(ClassifiedFragment {
        raw: fragment.clone(),
        payload,
    })
}

fn classify_data(fragment: &RawFragment) -> Result<BodyFragment> {
    let source = match fragment.value.strip_prefix('@') {
        Some("") => return Err(no_file_name('@', &fragment.value)),
        Some(path) => Source::File(path.to_string()),
        None => Source::Literal(fragment.value.clone()),
    };
    Ok(BodyFragment {
        kind: fragment.kind,
        source,
        encoding: FragmentEncoding::for_kind(fragment.kind),
    })
}

fn classify_form(fragment: &RawFragment, warnings: &mut Vec<Warning>) -> Result<Part> {
    let (name, value) = fragment
        .value
        .split_once('=')
        .ok_or_else(|| Error::malformed_field(&fragment.value))?;

    if fragment.kind == RawFragmentKind::FormStringField {
        return Ok(Part::field(name, value));
    }

    if let Some(reference) = value.strip_prefix('@') {
        let reference = FileReference::parse(reference, warnings);
        if reference.path.is_empty() {
            return Err(no_file_name('@', &fragment.value));
        }
        let path = reference.path;
        return Ok(Part::File {
            name: name.to_string(),
            filename: reference
                .filename
                .unwrap_or_else(|| basename(&path).to_string()),
            content_type: reference.content_type.map_or_else(
                || ContentTypeSource::InferFromPath(path.clone()),
                ContentTypeSource::Explicit,
            ),
            path,
        });
    }

    if let Some(reference) = value.strip_prefix('<') {
        let reference = FileReference::parse(reference, warnings);
        if reference.path.is_empty() {
            return Err(no_file_name('<', &fragment.value));
        }
        if let Some(filename) = reference.filename {
            warning::report(
                warnings,
                Warning::UnknownFormParameter(format!("filename={filename}")),
            );
        }
        return Ok(Part::InlineFile {
            name: name.to_string(),
            path: reference.path,
            content_type: reference.content_type,
        });
    }

    Ok(Part::field(name, value))
}

fn no_file_name(marker: char, value: &str) -> Error {
    Error::configuration(format!("no file name after '{marker}' in '{value}'"))
}

/// `path[;filename=F][;type=T]`
struct FileReference {
    path: String,
    filename: Option<String>,
    content_type: Option<String>,
}

impl FileReference {
    fn parse(reference: &str, warnings: &mut Vec<Warning>) -> Self {
        let mut segments = reference.split(';');
        let path = segments.next().unwrap_or_default().to_string();
        let mut parsed = Self {
            path,
            filename: None,
            content_type: None,
        };
        for param in segments {
            match param.trim().split_once('=') {
                Some(("filename", value)) => parsed.filename = Some(value.to_string()),
                Some(("type", value)) => parsed.content_type = Some(value.to_string()),
                _ => warning::report(warnings, Warning::UnknownFormParameter(param.to_string())),
            }
        }
        parsed
    }
}
