//! Dispatch classification.
//!
//! Maps (method, header shape, payload shape) to exactly one [`Variant`].
//! The checks run in a fixed order: the full-feature escape hatch first,
//! then POST with bare headers, then GET, then body-less methods.

use derive_more::Display;
use serde::Serialize;

use crate::content_type;
use crate::fragment::ClassifiedFragment;
use crate::{Error, Method, RawOptions, Result};

/// The request shape a renderer selects its template by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Every header, cookie and auth mechanism rendered individually.
    #[display("full")]
    Full,
    /// POST with `-G`: data goes to the query string, no body.
    #[display("post_data_as_url_query")]
    PostDataAsUrlQuery,
    /// POST streaming one file as the body.
    #[display("post_single_file_body")]
    PostSingleFileBody,
    /// POST with concatenated data fragments.
    #[display("post_concatenated_body")]
    PostConcatenatedBody,
    /// POST with a native form map.
    #[display("post_simple_form")]
    PostSimpleForm,
    /// POST with form fields that cannot be a native map.
    #[display("post_multipart_or_concatenated")]
    PostMultipartOrConcatenated,
    /// POST without a body.
    #[display("simple_post")]
    SimplePost,
    /// GET with data in the query string.
    #[display("get_data_as_url_query")]
    GetDataAsUrlQuery,
    /// GET without data.
    #[display("simple_get")]
    SimpleGet,
    /// Any other method, no body.
    #[display("simple_method")]
    SimpleMethod,
}

impl Variant {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Full,
        Self::PostDataAsUrlQuery,
        Self::PostSingleFileBody,
        Self::PostConcatenatedBody,
        Self::PostSimpleForm,
        Self::PostMultipartOrConcatenated,
        Self::SimplePost,
        Self::GetDataAsUrlQuery,
        Self::SimpleGet,
        Self::SimpleMethod,
    ];

    /// Returns `true` if the variant never carries a body.
    #[must_use]
    pub const fn is_bodyless(self) -> bool {
        matches!(
            self,
            Self::PostDataAsUrlQuery
                | Self::SimplePost
                | Self::GetDataAsUrlQuery
                | Self::SimpleGet
                | Self::SimpleMethod
        )
    }
}

/// Select the variant for a request.
///
/// # Errors
///
/// Returns [`Error::UnsupportedRequestShape`] when a payload is present but
/// no variant handles the method and header combination.
pub fn classify(options: &RawOptions, fragments: &[ClassifiedFragment]) -> Result<Variant> {
    let method = options.method();
    let variant = select(options, &method, fragments)?;
    tracing::debug!(%method, %variant, fragments = fragments.len(), "dispatched request");
    Ok(variant)
}

fn select(
    options: &RawOptions,
    method: &Method,
    fragments: &[ClassifiedFragment],
) -> Result<Variant> {
    let bare_headers = options.only_has_content_type_header();

    if options.has_transport_features()
        || (!bare_headers && !method.is_get() && !method.is_post())
    {
        return Ok(Variant::Full);
    }

    if method.is_post() && bare_headers {
        let variant = if options.has_raw_data() {
            if options.get_with_data() {
                Variant::PostDataAsUrlQuery
            } else if is_single_file(fragments) {
                Variant::PostSingleFileBody
            } else if is_simple_form(options, fragments) {
                Variant::PostSimpleForm
            } else {
                Variant::PostConcatenatedBody
            }
        } else if options.has_form() {
            if is_simple_form(options, fragments) {
                Variant::PostSimpleForm
            } else {
                Variant::PostMultipartOrConcatenated
            }
        } else {
            Variant::SimplePost
        };
        return Ok(variant);
    }

    if method.is_get() {
        return Ok(if fragments.is_empty() {
            Variant::SimpleGet
        } else {
            Variant::GetDataAsUrlQuery
        });
    }

    if fragments.is_empty() {
        return Ok(if method.is_post() {
            Variant::SimplePost
        } else {
            Variant::SimpleMethod
        });
    }

    Err(Error::unsupported_shape(
        method.to_string(),
        "a payload is only supported with GET, POST, or the full-feature form",
    ))
}

fn is_single_file(fragments: &[ClassifiedFragment]) -> bool {
    matches!(fragments, [single] if single.references_file())
}

/// Every fragment flattens into a form map and the body is form-encoded.
fn is_simple_form(options: &RawOptions, fragments: &[ClassifiedFragment]) -> bool {
    let form_content_type = options
        .find_content_type_header()
        .is_none_or(content_type::is_form_urlencoded);
    form_content_type
        && !fragments.is_empty()
        && fragments.iter().all(|f| f.simple_form().is_some())
}
