//! Content negotiation.
//!
//! A `Content-Type` written by the user is authoritative. Otherwise exactly
//! one default is inserted, chosen from the body encoding. Multipart bodies
//! always get a `boundary=` parameter that matches the encoder.

use serde::Serialize;

use crate::mime;

/// `application/x-www-form-urlencoded`.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// `multipart/form-data`.
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Where a file's content type comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum ContentTypeSource {
    /// Given by the user (`;type=` or a `Content-Type` header).
    Explicit(String),
    /// To be inferred from the file extension by the target.
    InferFromPath(String),
}

impl ContentTypeSource {
    /// Resolve with the shared extension table.
    ///
    /// `None` means the renderer's own default applies.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Explicit(value) => Some(value.clone()),
            Self::InferFromPath(path) => mime::guess_from_path(path).map(str::to_string),
        }
    }
}

/// The body encoding a default content type is chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// Concatenated or simple-form bodies.
    FormUrlEncoded,
    /// Multipart bodies.
    Multipart,
}

impl BodyEncoding {
    /// The default media type for this encoding.
    #[must_use]
    pub const fn default_media_type(self) -> &'static str {
        match self {
            Self::FormUrlEncoded => FORM_URLENCODED,
            Self::Multipart => MULTIPART_FORM_DATA,
        }
    }
}

/// The negotiated `Content-Type` for a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    /// Media type text, without any boundary parameter.
    pub media_type: String,
    /// Boundary token, for multipart bodies only.
    pub boundary: Option<String>,
    /// `true` if the user wrote the header.
    pub explicit: bool,
}

impl Negotiated {
    /// The header value as sent.
    #[must_use]
    pub fn value(&self) -> String {
        match &self.boundary {
            Some(boundary) => format!("{}; boundary={boundary}", self.media_type),
            None => self.media_type.clone(),
        }
    }
}

/// Resolve the content type for a body.
///
/// `boundary` is only used for [`BodyEncoding::Multipart`].
#[must_use]
pub fn negotiate(user: Option<&str>, encoding: BodyEncoding, boundary: &str) -> Negotiated {
    match (user, encoding) {
        (Some(value), BodyEncoding::FormUrlEncoded) => Negotiated {
            media_type: value.to_string(),
            boundary: None,
            explicit: true,
        },
        (Some(value), BodyEncoding::Multipart) => {
            let media_type = strip_boundary(value);
            Negotiated {
                media_type: if media_type.is_empty() {
                    MULTIPART_FORM_DATA.to_string()
                } else {
                    media_type
                },
                boundary: Some(boundary.to_string()),
                explicit: true,
            }
        }
        (None, encoding) => Negotiated {
            media_type: encoding.default_media_type().to_string(),
            boundary: (encoding == BodyEncoding::Multipart).then(|| boundary.to_string()),
            explicit: false,
        },
    }
}

/// The `boundary=` parameter of a content type, unquoted.
#[must_use]
pub fn boundary_param(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("boundary")
            .then(|| value.trim().trim_matches('"'))
            .filter(|value| !value.is_empty())
    })
}

/// The media type without parameters, lower-cased.
#[must_use]
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Returns `true` for `application/x-www-form-urlencoded` (any parameters).
#[must_use]
pub fn is_form_urlencoded(content_type: &str) -> bool {
    essence(content_type) == FORM_URLENCODED
}

fn strip_boundary(content_type: &str) -> String {
    let mut params = content_type.split(';').map(str::trim);
    let mut kept: Vec<&str> = params.next().into_iter().collect();
    kept.extend(params.filter(|param| {
        let name = param.split_once('=').map_or(*param, |(name, _)| name);
        !param.is_empty() && !name.trim().eq_ignore_ascii_case("boundary")
    }));
    kept.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_inserted_when_absent() {
        let negotiated = negotiate(None, BodyEncoding::FormUrlEncoded, "b");
        assert_eq!(negotiated.value(), FORM_URLENCODED);
        assert!(!negotiated.explicit);

        let negotiated = negotiate(None, BodyEncoding::Multipart, "b0");
        assert_eq!(negotiated.value(), "multipart/form-data; boundary=b0");
    }

    #[test]
    fn user_value_is_authoritative() {
        let negotiated = negotiate(Some("text/plain"), BodyEncoding::FormUrlEncoded, "b");
        assert_eq!(negotiated.value(), "text/plain");
        assert!(negotiated.explicit);
    }

    #[test]
    fn multipart_keeps_user_media_type() {
        let negotiated = negotiate(
            Some("multipart/mixed; charset=utf-8"),
            BodyEncoding::Multipart,
            "xyz",
        );
        assert_eq!(negotiated.value(), "multipart/mixed; charset=utf-8; boundary=xyz");
    }

    #[test]
    fn multipart_replaces_user_boundary_param() {
        let negotiated = negotiate(
            Some("multipart/form-data; boundary=old"),
            BodyEncoding::Multipart,
            "old",
        );
        assert_eq!(negotiated.value(), "multipart/form-data; boundary=old");
    }

    #[test]
    fn multipart_substitutes_empty_user_value() {
        let negotiated = negotiate(Some(""), BodyEncoding::Multipart, "b");
        assert_eq!(negotiated.value(), "multipart/form-data; boundary=b");
    }

    #[test]
    fn boundary_param_parsing() {
        assert_eq!(
            boundary_param("multipart/form-data; boundary=\"abc\""),
            Some("abc")
        );
        assert_eq!(boundary_param("multipart/form-data; BOUNDARY=x1"), Some("x1"));
        assert_eq!(boundary_param("multipart/form-data"), None);
        assert_eq!(boundary_param("multipart/form-data; boundary="), None);
    }

    #[test]
    fn form_urlencoded_detection() {
        assert!(is_form_urlencoded("Application/X-WWW-Form-Urlencoded; charset=utf-8"));
        assert!(!is_form_urlencoded("application/json"));
    }

    #[test]
    fn source_resolution() {
        assert_eq!(
            ContentTypeSource::InferFromPath("/tmp/a.png".to_string()).resolve(),
            Some("image/png".to_string())
        );
        assert_eq!(
            ContentTypeSource::InferFromPath("/tmp/a.unknown".to_string()).resolve(),
            None
        );
        assert_eq!(
            ContentTypeSource::Explicit("text/x".to_string()).resolve(),
            Some("text/x".to_string())
        );
    }
}
