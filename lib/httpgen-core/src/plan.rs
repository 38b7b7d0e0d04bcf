//! The resolved request plan.
//!
//! [`build_plan`] runs the whole pipeline: fragment classification, dispatch,
//! content negotiation, computed headers and AWS V2 signing. The returned
//! [`ResolvedPlan`] is the only thing renderers look at.
//!
//! # Example
//!
//! ```
//! use httpgen_core::prelude::*;
//!
//! let options = RawOptions::builder("http://x/search")
//!     .get(true)
//!     .data("q=test")
//!     .build()
//!     .expect("valid options");
//! let plan = build_plan(&options, &PlanConfig::default()).expect("plan");
//!
//! assert_eq!(plan.variant(), Variant::GetDataAsUrlQuery);
//! assert_eq!(plan.effective_url().literal(), Some("http://x/search?q=test"));
//! assert!(plan.body().is_none());
//! ```

use std::collections::BTreeSet;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::aws::{self, AwsV2Helper, Credentials, SigningInput};
use crate::content_type::{self, BodyEncoding, ContentTypeSource};
use crate::dispatch::{self, Variant};
use crate::fragment::{self, BodyFragment, ClassifiedFragment, FragmentEncoding, Source};
use crate::multipart::{MultipartBody, Part};
use crate::query::FormMap;
use crate::{Error, Method, PlanConfig, RawOptions, Result, Warning, mime};

/// A feature the generated code needs from its target runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Native form map encoding.
    FormEncoding,
    /// Percent-encoding of data.
    PercentEncoding,
    /// Multipart body encoding.
    Multipart,
    /// Reading local files.
    FileRead,
    /// Base64 encoding.
    Base64,
    /// Cookie handling.
    Cookies,
    /// Proxy configuration.
    Proxy,
    /// Disabling TLS verification.
    InsecureTls,
    /// HMAC-SHA1 for AWS V2 signing.
    HmacSha1,
    /// Reading the current time.
    Clock,
    /// MIME type lookup by extension.
    MimeLookup,
}

/// Where a header entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderOrigin {
    /// Written by the user.
    User,
    /// Inserted by content negotiation.
    ContentType,
    /// From `-u`.
    BasicAuth,
    /// From `-b`.
    Cookie,
    /// AWS V2 `Date`.
    AwsDate,
    /// AWS V2 `Authorization`.
    AwsAuthorization,
}

/// A header value, either literal or computed by the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeaderValue {
    /// Text sent as-is.
    Literal {
        /// The value.
        value: String,
    },
    /// A multipart content type qualified with its boundary.
    MultipartContentType {
        /// Media type text.
        media_type: String,
        /// Boundary token.
        boundary: String,
    },
    /// Content type inferred from a file extension.
    MimeFromPath {
        /// The file path.
        path: String,
    },
    /// `Basic` credentials.
    BasicAuth {
        /// User name.
        username: String,
        /// Password, if given.
        password: Option<String>,
    },
    /// One cookie.
    Cookie {
        /// Cookie name.
        name: String,
        /// Cookie value.
        value: String,
    },
}

impl HeaderValue {
    /// Create a literal value.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
        }
    }

    /// The text sent on the wire.
    ///
    /// `None` when a MIME lookup finds nothing; the target default applies.
    #[must_use]
    pub fn resolve(&self) -> Option<String> {
        match self {
            Self::Literal { value } => Some(value.clone()),
            Self::MultipartContentType {
                media_type,
                boundary,
            } => Some(format!("{media_type}; boundary={boundary}")),
            Self::MimeFromPath { path } => mime::guess_from_path(path).map(str::to_string),
            Self::BasicAuth { username, password } => {
                let credentials = match password {
                    Some(password) => format!("{username}:{password}"),
                    None => username.clone(),
                };
                Some(format!("Basic {}", STANDARD.encode(credentials)))
            }
            Self::Cookie { name, value } => Some(format!("{name}={value}")),
        }
    }
}

/// One header name with its ordered values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    /// Header name as written.
    pub name: String,
    /// Values, in order.
    pub values: Vec<HeaderValue>,
    /// Where the entry comes from.
    pub origin: HeaderOrigin,
}

impl HeaderEntry {
    fn new(name: impl Into<String>, origin: HeaderOrigin, values: Vec<HeaderValue>) -> Self {
        Self {
            name: name.into(),
            values,
            origin,
        }
    }

    /// Returns `true` if the name is `Content-Type`, ignoring case.
    #[must_use]
    pub fn is_content_type(&self) -> bool {
        self.name.eq_ignore_ascii_case(http::header::CONTENT_TYPE.as_str())
    }

    /// Resolved values, skipping those left to the target.
    #[must_use]
    pub fn resolved_values(&self) -> Vec<String> {
        self.values.iter().filter_map(HeaderValue::resolve).collect()
    }

    /// All resolved values on one line (`; ` for cookies, `, ` otherwise).
    #[must_use]
    pub fn joined(&self) -> Option<String> {
        let values = self.resolved_values();
        if values.is_empty() {
            return None;
        }
        let separator = if self.origin == HeaderOrigin::Cookie {
            "; "
        } else {
            ", "
        };
        Some(values.join(separator))
    }
}

/// Data placed in the URL query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryPlan {
    /// A native form map.
    Form(FormMap),
    /// `&`-joined fragments.
    Fragments(Vec<BodyFragment>),
}

/// The request URL with its generated query suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveUrl {
    base: String,
    query: Option<QueryPlan>,
    literal: Option<String>,
}

impl EffectiveUrl {
    fn new(base: String, query: Option<QueryPlan>) -> Result<Self> {
        let literal = match &query {
            None => Some(base.clone()),
            Some(QueryPlan::Form(map)) => Some(join_query(&base, &map.encode()?)),
            Some(QueryPlan::Fragments(fragments)) => {
                concatenated_literal(fragments).map(|suffix| join_query(&base, &suffix))
            }
        };
        Ok(Self {
            base,
            query,
            literal,
        })
    }

    /// URL as given by the user.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Generated query suffix, if any.
    #[must_use]
    pub const fn query(&self) -> Option<&QueryPlan> {
        self.query.as_ref()
    }

    /// The full URL, when the query contains no file reference.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }
}

fn join_query(base: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        base.to_string()
    } else if base.contains('?') {
        format!("{base}&{suffix}")
    } else {
        format!("{base}?{suffix}")
    }
}

fn concatenated_literal(fragments: &[BodyFragment]) -> Option<String> {
    let parts: Option<Vec<String>> = fragments.iter().map(BodyFragment::literal).collect();
    parts.map(|parts| parts.join("&"))
}

/// How the request body is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BodyPlan {
    /// No body.
    None,
    /// One fragment sent as the whole body.
    SingleLiteralOrFile(BodyFragment),
    /// Fragments joined with `&`.
    ConcatenatedFragments(Vec<BodyFragment>),
    /// A native form map.
    SimpleFormMap(FormMap),
    /// A multipart body.
    Multipart(MultipartBody),
}

impl BodyPlan {
    /// Returns `true` for [`BodyPlan::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The full body text, when it contains no file reference.
    ///
    /// # Errors
    ///
    /// Returns an error if form encoding fails.
    pub fn literal(&self) -> Result<Option<String>> {
        Ok(match self {
            Self::None => Some(String::new()),
            Self::SingleLiteralOrFile(fragment) => fragment.literal(),
            Self::ConcatenatedFragments(fragments) => concatenated_literal(fragments),
            Self::SimpleFormMap(map) => Some(map.encode()?),
            Self::Multipart(_) => None,
        })
    }

    /// Returns `true` if this body may be carried by `variant`.
    #[must_use]
    pub const fn fits(&self, variant: Variant) -> bool {
        match variant {
            Variant::Full => !matches!(self, Self::SingleLiteralOrFile(_) | Self::SimpleFormMap(_)),
            Variant::PostSingleFileBody => matches!(self, Self::SingleLiteralOrFile(_)),
            Variant::PostConcatenatedBody => matches!(self, Self::ConcatenatedFragments(_)),
            Variant::PostSimpleForm => matches!(self, Self::SimpleFormMap(_)),
            Variant::PostMultipartOrConcatenated => {
                matches!(self, Self::Multipart(_) | Self::ConcatenatedFragments(_))
            }
            Variant::PostDataAsUrlQuery
            | Variant::SimplePost
            | Variant::GetDataAsUrlQuery
            | Variant::SimpleGet
            | Variant::SimpleMethod => self.is_none(),
        }
    }
}

/// Connection-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transport {
    /// Proxy URL.
    pub proxy: Option<String>,
    /// TLS verification disabled.
    pub insecure_tls: bool,
}

/// The normalized, renderer-agnostic request description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlan {
    method: Method,
    effective_url: EffectiveUrl,
    headers: Vec<HeaderEntry>,
    body: BodyPlan,
    variant: Variant,
    transport: Transport,
    capabilities: BTreeSet<Capability>,
    aws_helper: Option<AwsV2Helper>,
    warnings: Vec<Warning>,
}

impl ResolvedPlan {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// URL and generated query.
    #[must_use]
    pub const fn effective_url(&self) -> &EffectiveUrl {
        &self.effective_url
    }

    /// Header entries, in send order.
    #[must_use]
    pub fn headers(&self) -> &[HeaderEntry] {
        &self.headers
    }

    /// First header entry with this name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&HeaderEntry> {
        self.headers
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    /// The `Content-Type` entry, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&HeaderEntry> {
        self.headers.iter().find(|entry| entry.is_content_type())
    }

    /// Body instructions.
    #[must_use]
    pub const fn body(&self) -> &BodyPlan {
        &self.body
    }

    /// Selected request shape.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Proxy and TLS settings.
    #[must_use]
    pub const fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Runtime features the generated code needs.
    #[must_use]
    pub const fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    /// Returns `true` if the capability is needed.
    #[must_use]
    pub fn needs(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// AWS V2 signing inputs, when `--awsv2` is used.
    #[must_use]
    pub const fn aws_helper(&self) -> Option<&AwsV2Helper> {
        self.aws_helper.as_ref()
    }

    /// Non-fatal problems found in the input.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of file uploads in a multipart body.
    #[must_use]
    pub fn file_upload_count(&self) -> usize {
        match &self.body {
            BodyPlan::Multipart(body) => body.files().count(),
            _ => 0,
        }
    }
}

/// Build the plan for a set of options.
///
/// # Errors
///
/// - [`Error::MalformedField`] for a form fragment without `=`.
/// - [`Error::Configuration`] for malformed AWS V2 credentials or an empty
///   `@` file name.
/// - [`Error::UnsupportedRequestShape`] when no variant applies or a form
///   file reference must be flattened.
pub fn build_plan(options: &RawOptions, config: &PlanConfig) -> Result<ResolvedPlan> {
    let credentials = options.aws_v2().map(Credentials::parse).transpose()?;

    let mut warnings = options.warnings();
    let fragments = fragment::classify_all(options.fragments(), &mut warnings)?;
    let variant = dispatch::classify(options, &fragments)?;
    let method = options.method();

    let mut query = None;
    let body = if is_query_bound(options, &method, variant, &fragments) {
        query = Some(query_plan(&method, &fragments)?);
        BodyPlan::None
    } else {
        body_plan(options, &method, variant, &fragments, config)?
    };
    let effective_url = EffectiveUrl::new(options.url().to_string(), query)?;

    let mut headers = user_headers(options, &body);
    append_computed_headers(options, &mut headers);

    let aws_helper = match credentials {
        Some(credentials) => Some(sign(
            &credentials,
            &method,
            options.url(),
            config,
            &mut headers,
        )?),
        None => None,
    };

    let capabilities = capabilities(options, &effective_url, &body, &headers);

    tracing::debug!(
        %method,
        %variant,
        headers = headers.len(),
        warnings = warnings.len(),
        "built request plan"
    );

    Ok(ResolvedPlan {
        method,
        effective_url,
        headers,
        body,
        variant,
        transport: Transport {
            proxy: options.proxy().map(str::to_string),
            insecure_tls: options.insecure_tls(),
        },
        capabilities,
        aws_helper,
        warnings,
    })
}

fn is_query_bound(
    options: &RawOptions,
    method: &Method,
    variant: Variant,
    fragments: &[ClassifiedFragment],
) -> bool {
    match variant {
        Variant::GetDataAsUrlQuery | Variant::PostDataAsUrlQuery => true,
        Variant::Full => !fragments.is_empty() && (options.get_with_data() || method.is_get()),
        _ => false,
    }
}

fn query_plan(method: &Method, fragments: &[ClassifiedFragment]) -> Result<QueryPlan> {
    match simple_form_map(fragments) {
        Some(map) => Ok(QueryPlan::Form(map)),
        None => Ok(QueryPlan::Fragments(flatten(method, fragments)?)),
    }
}

fn simple_form_map(fragments: &[ClassifiedFragment]) -> Option<FormMap> {
    if fragments.is_empty() {
        return None;
    }
    let mut merged = FormMap::new();
    for fragment in fragments {
        merged.extend(fragment.simple_form()?);
    }
    Some(merged)
}

fn flatten(method: &Method, fragments: &[ClassifiedFragment]) -> Result<Vec<BodyFragment>> {
    fragments
        .iter()
        .map(|fragment| {
            fragment.concatenated().ok_or_else(|| {
                Error::unsupported_shape(
                    method.to_string(),
                    format!(
                        "form file reference '{}' cannot be sent as flat data",
                        fragment.raw().value
                    ),
                )
            })
        })
        .collect()
}

fn body_plan(
    options: &RawOptions,
    method: &Method,
    variant: Variant,
    fragments: &[ClassifiedFragment],
    config: &PlanConfig,
) -> Result<BodyPlan> {
    if fragments.is_empty() {
        return Ok(BodyPlan::None);
    }
    let body = match variant {
        Variant::PostSingleFileBody => {
            let mut flat = flatten(method, fragments)?;
            match flat.pop() {
                Some(fragment) => BodyPlan::SingleLiteralOrFile(fragment),
                None => BodyPlan::None,
            }
        }
        Variant::PostSimpleForm => {
            simple_form_map(fragments).map_or(BodyPlan::None, BodyPlan::SimpleFormMap)
        }
        Variant::PostMultipartOrConcatenated
            if fragments.iter().any(ClassifiedFragment::references_file) =>
        {
            BodyPlan::Multipart(multipart(options, fragments, config))
        }
        Variant::Full if !options.has_raw_data() => {
            BodyPlan::Multipart(multipart(options, fragments, config))
        }
        Variant::PostConcatenatedBody | Variant::PostMultipartOrConcatenated | Variant::Full => {
            BodyPlan::ConcatenatedFragments(flatten(method, fragments)?)
        }
        Variant::PostDataAsUrlQuery
        | Variant::SimplePost
        | Variant::GetDataAsUrlQuery
        | Variant::SimpleGet
        | Variant::SimpleMethod => BodyPlan::None,
    };
    Ok(body)
}

fn multipart(
    options: &RawOptions,
    fragments: &[ClassifiedFragment],
    config: &PlanConfig,
) -> MultipartBody {
    let boundary = options
        .find_content_type_header()
        .and_then(content_type::boundary_param)
        .unwrap_or(&config.boundary);
    let mut body = MultipartBody::new(boundary);
    for part in fragments.iter().filter_map(ClassifiedFragment::form_part) {
        body.push(part.clone());
    }
    body
}

/// User headers grouped by name, with `Content-Type` reconciled against the
/// body.
fn user_headers(options: &RawOptions, body: &BodyPlan) -> Vec<HeaderEntry> {
    let negotiated = negotiated_content_type(options.find_content_type_header(), body);

    let mut headers: Vec<HeaderEntry> = options
        .grouped_headers()
        .into_iter()
        .map(|group| {
            let is_content_type = group
                .name
                .eq_ignore_ascii_case(http::header::CONTENT_TYPE.as_str());
            let values = match (&negotiated, is_content_type) {
                (Some(value), true) => vec![value.clone()],
                _ => group.values.into_iter().map(HeaderValue::literal).collect(),
            };
            HeaderEntry::new(group.name, HeaderOrigin::User, values)
        })
        .collect();

    if let Some(value) = negotiated
        && !headers.iter().any(HeaderEntry::is_content_type)
    {
        headers.push(HeaderEntry::new(
            "Content-Type",
            HeaderOrigin::ContentType,
            vec![value],
        ));
    }
    headers
}

fn negotiated_content_type(user: Option<&str>, body: &BodyPlan) -> Option<HeaderValue> {
    let encoding = match body {
        BodyPlan::None => return None,
        BodyPlan::SingleLiteralOrFile(fragment) => {
            return Some(match (user, fragment.file()) {
                (Some(value), _) => HeaderValue::literal(value),
                (None, Some(path)) => HeaderValue::MimeFromPath {
                    path: path.to_string(),
                },
                (None, None) => HeaderValue::literal(content_type::FORM_URLENCODED),
            });
        }
        BodyPlan::ConcatenatedFragments(_) | BodyPlan::SimpleFormMap(_) => {
            BodyEncoding::FormUrlEncoded
        }
        BodyPlan::Multipart(_) => BodyEncoding::Multipart,
    };
    let boundary = match body {
        BodyPlan::Multipart(multipart) => multipart.boundary(),
        _ => "",
    };
    let negotiated = content_type::negotiate(user, encoding, boundary);
    Some(match negotiated.boundary {
        Some(boundary) => HeaderValue::MultipartContentType {
            media_type: negotiated.media_type,
            boundary,
        },
        None => HeaderValue::literal(negotiated.media_type),
    })
}

fn append_computed_headers(options: &RawOptions, headers: &mut Vec<HeaderEntry>) {
    if let Some(user) = options.user() {
        let (username, password) = match user.split_once(':') {
            Some((username, password)) => (username.to_string(), Some(password.to_string())),
            None => (user.to_string(), None),
        };
        headers.push(HeaderEntry::new(
            "Authorization",
            HeaderOrigin::BasicAuth,
            vec![HeaderValue::BasicAuth { username, password }],
        ));
    }

    if !options.cookies().is_empty() {
        let values = options
            .cookies()
            .iter()
            .map(|cookie| HeaderValue::Cookie {
                name: cookie.name.clone(),
                value: cookie.value.clone(),
            })
            .collect();
        headers.push(HeaderEntry::new("Cookie", HeaderOrigin::Cookie, values));
    }
}

fn sign(
    credentials: &Credentials,
    method: &Method,
    url: &str,
    config: &PlanConfig,
    headers: &mut Vec<HeaderEntry>,
) -> Result<AwsV2Helper> {
    let content_type = headers
        .iter()
        .find(|entry| entry.is_content_type())
        .and_then(|entry| entry.values.first())
        .and_then(HeaderValue::resolve)
        .unwrap_or_default();
    let path = aws::url_path(url);
    let input = SigningInput {
        method,
        content_md5: "",
        content_type: &content_type,
        path: &path,
    };
    let signature = aws::sign(credentials, &input, config.clock.as_ref())?;

    headers.push(HeaderEntry::new(
        "Date",
        HeaderOrigin::AwsDate,
        vec![HeaderValue::literal(signature.date)],
    ));
    headers.push(HeaderEntry::new(
        "Authorization",
        HeaderOrigin::AwsAuthorization,
        vec![HeaderValue::literal(signature.authorization)],
    ));

    Ok(AwsV2Helper {
        access_key: credentials.access_key().to_string(),
        secret_key: credentials.secret_key().to_string(),
        content_md5: String::new(),
        content_type,
        path,
    })
}

fn capabilities(
    options: &RawOptions,
    url: &EffectiveUrl,
    body: &BodyPlan,
    headers: &[HeaderEntry],
) -> BTreeSet<Capability> {
    let mut needed = BTreeSet::new();

    let mut flat: Vec<&BodyFragment> = Vec::new();
    match url.query() {
        Some(QueryPlan::Form(_)) => {
            needed.insert(Capability::FormEncoding);
        }
        Some(QueryPlan::Fragments(fragments)) => flat.extend(fragments),
        None => {}
    }
    match body {
        BodyPlan::None => {}
        BodyPlan::SingleLiteralOrFile(fragment) => flat.push(fragment),
        BodyPlan::ConcatenatedFragments(fragments) => flat.extend(fragments),
        BodyPlan::SimpleFormMap(_) => {
            needed.insert(Capability::FormEncoding);
        }
        BodyPlan::Multipart(multipart) => {
            needed.insert(Capability::Multipart);
            for part in multipart.parts() {
                if part.path().is_some() {
                    needed.insert(Capability::FileRead);
                }
                if let Part::File {
                    content_type: ContentTypeSource::InferFromPath(_),
                    ..
                } = part
                {
                    needed.insert(Capability::MimeLookup);
                }
            }
        }
    }
    for fragment in flat {
        if fragment.encoding == FragmentEncoding::PercentEncoded {
            needed.insert(Capability::PercentEncoding);
        }
        if matches!(fragment.source, Source::File(_)) {
            needed.insert(Capability::FileRead);
        }
    }

    for value in headers.iter().flat_map(|entry| &entry.values) {
        match value {
            HeaderValue::MimeFromPath { .. } => {
                needed.insert(Capability::MimeLookup);
            }
            HeaderValue::BasicAuth { .. } => {
                needed.insert(Capability::Base64);
            }
            HeaderValue::Cookie { .. } => {
                needed.insert(Capability::Cookies);
            }
            HeaderValue::Literal { .. } | HeaderValue::MultipartContentType { .. } => {}
        }
    }

    if options.proxy().is_some() {
        needed.insert(Capability::Proxy);
    }
    if options.insecure_tls() {
        needed.insert(Capability::InsecureTls);
    }
    if options.aws_v2().is_some() {
        needed.extend([Capability::HmacSha1, Capability::Base64, Capability::Clock]);
    }
    needed
}
