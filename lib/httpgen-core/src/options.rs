//! The option model: everything the user supplied on the command line.
//!
//! [`RawOptions`] is built once per invocation with [`RawOptions::builder`]
//! and never mutated afterwards. Plan construction works on local copies.
//!
//! # Example
//!
//! ```
//! use httpgen_core::{Method, RawOptions};
//!
//! let options = RawOptions::builder("http://x/")
//!     .data("a=1")
//!     .data("b=2")
//!     .build()
//!     .expect("valid options");
//!
//! assert_eq!(options.method(), Method::Post);
//! assert!(options.only_has_content_type_header());
//! ```

use serde::Serialize;

use crate::header::{HeaderGroup, Headers};
use crate::warning::{self, Warning};
use crate::{Error, Method, Result};

/// Which curl option produced a payload fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RawFragmentKind {
    /// `-d`, `--data`, `--data-ascii`.
    AsciiData,
    /// `--data-binary` (and `-T`).
    BinaryData,
    /// `--data-urlencode`.
    UrlEncodedData,
    /// `-F`, `--form`.
    FormField,
    /// `--form-string`.
    FormStringField,
}

impl RawFragmentKind {
    /// Returns `true` for the `-d` family.
    #[must_use]
    pub const fn is_raw_data(self) -> bool {
        matches!(
            self,
            Self::AsciiData | Self::BinaryData | Self::UrlEncodedData
        )
    }

    /// Returns `true` for `-F` and `--form-string`.
    #[must_use]
    pub const fn is_form(self) -> bool {
        matches!(self, Self::FormField | Self::FormStringField)
    }
}

/// One payload-contributing option occurrence, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFragment {
    /// The option kind.
    pub kind: RawFragmentKind,
    /// The option value, verbatim.
    pub value: String,
}

impl RawFragment {
    /// Create a fragment.
    #[must_use]
    pub fn new(kind: RawFragmentKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// A `name=value` cookie from `-b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

/// Everything the user supplied, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOptions {
    method: Option<Method>,
    url: String,
    headers: Headers,
    cookies: Vec<Cookie>,
    user: Option<String>,
    proxy: Option<String>,
    insecure_tls: bool,
    aws_v2: Option<String>,
    get_with_data: bool,
    head: bool,
    upload_file: Option<String>,
    fragments: Vec<RawFragment>,
    warnings: Vec<Warning>,
}

impl RawOptions {
    /// Creates a new [`RawOptionsBuilder`] for the given URL.
    #[must_use]
    pub fn builder(url: impl Into<String>) -> RawOptionsBuilder {
        RawOptionsBuilder::new(url)
    }

    /// The effective method.
    ///
    /// Precedence: explicit `-X` > `-T` (PUT) > `--get` (GET) > `--head`
    /// (HEAD) > any payload fragment (POST) > GET.
    #[must_use]
    pub fn method(&self) -> Method {
        if let Some(method) = &self.method {
            return method.clone();
        }
        if self.upload_file.is_some() {
            return Method::Put;
        }
        if self.get_with_data {
            return Method::Get;
        }
        if self.head {
            return Method::Head;
        }
        if self.has_any_payload() {
            return Method::Post;
        }
        Method::Get
    }

    /// The explicit `-X` override, if any.
    #[must_use]
    pub const fn explicit_method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Parsed user headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// `true` iff the header list is empty or is a single `Content-Type`.
    #[must_use]
    pub fn only_has_content_type_header(&self) -> bool {
        self.headers.only_has_content_type()
    }

    /// Value of the first user `Content-Type` header.
    #[must_use]
    pub fn find_content_type_header(&self) -> Option<&str> {
        self.headers.find_content_type()
    }

    /// Headers grouped by case-insensitive name.
    #[must_use]
    pub fn grouped_headers(&self) -> Vec<HeaderGroup> {
        self.headers.grouped()
    }

    /// Cookies from `-b`.
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// `user[:password]` from `-u`.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Proxy URL from `-x`.
    #[must_use]
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// `-k`: TLS verification disabled.
    #[must_use]
    pub const fn insecure_tls(&self) -> bool {
        self.insecure_tls
    }

    /// `accessKey:secretKey` from `--awsv2`.
    #[must_use]
    pub fn aws_v2(&self) -> Option<&str> {
        self.aws_v2.as_deref()
    }

    /// `-G`: send data as a URL query.
    #[must_use]
    pub const fn get_with_data(&self) -> bool {
        self.get_with_data
    }

    /// `-I`: HEAD request.
    #[must_use]
    pub const fn head(&self) -> bool {
        self.head
    }

    /// `-T` file, if any.
    #[must_use]
    pub fn upload_file(&self) -> Option<&str> {
        self.upload_file.as_deref()
    }

    /// Payload fragments in command-line order.
    #[must_use]
    pub fn fragments(&self) -> &[RawFragment] {
        &self.fragments
    }

    /// Returns `true` if any fragment was given.
    #[must_use]
    pub fn has_any_payload(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// Returns `true` if any `-d`-family fragment was given.
    #[must_use]
    pub fn has_raw_data(&self) -> bool {
        self.fragments.iter().any(|f| f.kind.is_raw_data())
    }

    /// Returns `true` if any `-F`/`--form-string` fragment was given.
    #[must_use]
    pub fn has_form(&self) -> bool {
        self.fragments.iter().any(|f| f.kind.is_form())
    }

    /// Returns `true` if any option forces the full-feature variant.
    #[must_use]
    pub fn has_transport_features(&self) -> bool {
        self.insecure_tls
            || self.proxy.is_some()
            || self.user.is_some()
            || !self.cookies.is_empty()
            || self.aws_v2.is_some()
    }

    /// Warnings from header and cookie parsing.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.headers
            .warnings()
            .iter()
            .chain(&self.warnings)
            .cloned()
            .collect()
    }
}

/// Builder for constructing [`RawOptions`] instances.
#[derive(Debug, Clone, Default)]
pub struct RawOptionsBuilder {
    method: Option<String>,
    url: String,
    headers: Vec<String>,
    cookies: Vec<String>,
    user: Option<String>,
    proxy: Option<String>,
    insecure_tls: bool,
    aws_v2: Option<String>,
    get_with_data: bool,
    head: bool,
    upload_file: Option<String>,
    fragments: Vec<RawFragment>,
}

impl RawOptionsBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Replaces the URL (`--url`).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the explicit method (`-X`).
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Appends a raw `Name: Value` header line (`-H`).
    #[must_use]
    pub fn header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    /// `--compressed`: asks for deflate and gzip.
    #[must_use]
    pub fn compressed(self) -> Self {
        self.header("Accept-Encoding: deflate")
            .header("Accept-Encoding: gzip")
    }

    /// `-A`: sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(self, agent: &str) -> Self {
        self.header(format!("User-Agent: {agent}"))
    }

    /// `-e`: sets the `Referer` header.
    #[must_use]
    pub fn referer(self, referer: &str) -> Self {
        self.header(format!("Referer: {referer}"))
    }

    /// `--tr-encoding`: asks for a compressed transfer encoding.
    #[must_use]
    pub fn tr_encoding(self) -> Self {
        self.header("Te: gzip")
    }

    /// Appends a `-b` cookie string (`name=value[; name=value...]`).
    #[must_use]
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookies.push(cookie.into());
        self
    }

    /// Sets `-u user[:password]`.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Sets `-x proxy`.
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Sets `-k`.
    #[must_use]
    pub const fn insecure(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    /// Sets `--awsv2 accessKey:secretKey`.
    #[must_use]
    pub fn aws_v2(mut self, credentials: impl Into<String>) -> Self {
        self.aws_v2 = Some(credentials.into());
        self
    }

    /// Sets `-G`.
    #[must_use]
    pub const fn get(mut self, get: bool) -> Self {
        self.get_with_data = get;
        self
    }

    /// Sets `-I`.
    #[must_use]
    pub const fn head(mut self, head: bool) -> Self {
        self.head = head;
        self
    }

    /// `-T file`: uploads the file as the body and implies PUT.
    #[must_use]
    pub fn upload_file(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.fragments.push(RawFragment::new(
            RawFragmentKind::BinaryData,
            format!("@{path}"),
        ));
        self.upload_file = Some(path);
        self
    }

    /// Appends a fragment of the given kind.
    #[must_use]
    pub fn fragment(mut self, kind: RawFragmentKind, value: impl Into<String>) -> Self {
        self.fragments.push(RawFragment::new(kind, value));
        self
    }

    /// `-d` / `--data` / `--data-ascii`.
    #[must_use]
    pub fn data(self, value: impl Into<String>) -> Self {
        self.fragment(RawFragmentKind::AsciiData, value)
    }

    /// `--data-binary`.
    #[must_use]
    pub fn data_binary(self, value: impl Into<String>) -> Self {
        self.fragment(RawFragmentKind::BinaryData, value)
    }

    /// `--data-urlencode`.
    #[must_use]
    pub fn data_urlencode(self, value: impl Into<String>) -> Self {
        self.fragment(RawFragmentKind::UrlEncodedData, value)
    }

    /// `-F` / `--form`.
    #[must_use]
    pub fn form(self, value: impl Into<String>) -> Self {
        self.fragment(RawFragmentKind::FormField, value)
    }

    /// `--form-string`.
    #[must_use]
    pub fn form_string(self, value: impl Into<String>) -> Self {
        self.fragment(RawFragmentKind::FormStringField, value)
    }

    /// Builds the [`RawOptions`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is empty or the explicit
    /// method is not a valid HTTP token.
    pub fn build(self) -> Result<RawOptions> {
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(Error::configuration("no URL specified"));
        }

        let method = self
            .method
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(Method::parse)
            .transpose()?;

        let mut warnings = Vec::new();
        let cookies = parse_cookies(&self.cookies, &mut warnings);

        Ok(RawOptions {
            method,
            url,
            headers: Headers::parse(&self.headers),
            cookies,
            user: self.user,
            proxy: self.proxy.filter(|p| !p.is_empty()),
            insecure_tls: self.insecure_tls,
            aws_v2: self.aws_v2,
            get_with_data: self.get_with_data,
            head: self.head,
            upload_file: self.upload_file,
            fragments: self.fragments,
            warnings,
        })
    }
}

fn parse_cookies(raw: &[String], warnings: &mut Vec<Warning>) -> Vec<Cookie> {
    let mut cookies = Vec::new();
    for pair in raw.iter().flat_map(|cookie| cookie.split(';')) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((name, value)) => cookies.push(Cookie {
                name: name.trim().to_string(),
                value: value.trim().to_string(),
            }),
            None => warning::report(warnings, Warning::MalformedCookie(pair.to_string())),
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(builder: RawOptionsBuilder) -> RawOptions {
        builder.build().expect("valid options")
    }

    #[test]
    fn method_defaults_to_get() {
        assert_eq!(options(RawOptions::builder("http://x/")).method(), Method::Get);
    }

    #[test]
    fn method_is_post_with_payload() {
        let opts = options(RawOptions::builder("http://x/").data("a=1"));
        assert_eq!(opts.method(), Method::Post);
        let opts = options(RawOptions::builder("http://x/").form("a=1"));
        assert_eq!(opts.method(), Method::Post);
    }

    #[test]
    fn method_get_flag_beats_payload() {
        let opts = options(RawOptions::builder("http://x/").get(true).data("a=1"));
        assert_eq!(opts.method(), Method::Get);
    }

    #[test]
    fn method_get_flag_beats_head() {
        let opts = options(RawOptions::builder("http://x/").get(true).head(true));
        assert_eq!(opts.method(), Method::Get);
        let opts = options(RawOptions::builder("http://x/").head(true).data("a"));
        assert_eq!(opts.method(), Method::Head);
    }

    #[test]
    fn method_explicit_is_highest() {
        let opts = options(
            RawOptions::builder("http://x/")
                .method("delete")
                .get(true)
                .upload_file("a.bin"),
        );
        assert_eq!(opts.method(), Method::Delete);
    }

    #[test]
    fn method_upload_file_implies_put() {
        let opts = options(RawOptions::builder("http://x/").get(true).upload_file("a.bin"));
        assert_eq!(opts.method(), Method::Put);
        assert_eq!(
            opts.fragments(),
            &[RawFragment::new(RawFragmentKind::BinaryData, "@a.bin")]
        );
    }

    #[test]
    fn empty_explicit_method_is_ignored() {
        let opts = options(RawOptions::builder("http://x/").method(""));
        assert_eq!(opts.explicit_method(), None);
    }

    #[test]
    fn invalid_method_is_configuration_error() {
        let err = RawOptions::builder("http://x/")
            .method("BAD METHOD")
            .build()
            .expect_err("invalid token");
        assert!(err.is_configuration());
    }

    #[test]
    fn empty_url_is_configuration_error() {
        let err = RawOptions::builder("  ").build().expect_err("empty url");
        assert!(err.is_configuration());
    }

    #[test]
    fn header_shorthands_append_in_order() {
        let opts = options(
            RawOptions::builder("http://x/")
                .compressed()
                .user_agent("httpgen/1")
                .referer("http://r/")
                .tr_encoding(),
        );
        let names: Vec<_> = opts
            .headers()
            .lines()
            .iter()
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Accept-Encoding", "Accept-Encoding", "User-Agent", "Referer", "Te"]
        );
        assert!(!opts.only_has_content_type_header());
    }

    #[test]
    fn cookies_split_on_semicolons() {
        let opts = options(
            RawOptions::builder("http://x/")
                .cookie("a=1; b=2")
                .cookie("jar.txt"),
        );
        assert_eq!(
            opts.cookies(),
            &[
                Cookie {
                    name: "a".to_string(),
                    value: "1".to_string()
                },
                Cookie {
                    name: "b".to_string(),
                    value: "2".to_string()
                },
            ]
        );
        assert_eq!(
            opts.warnings(),
            vec![Warning::MalformedCookie("jar.txt".to_string())]
        );
        assert!(opts.has_transport_features());
    }

    #[test]
    fn payload_shape_queries() {
        let opts = options(RawOptions::builder("http://x/").data("a").form_string("b=c"));
        assert!(opts.has_raw_data());
        assert!(opts.has_form());
        assert!(opts.has_any_payload());

        let opts = options(RawOptions::builder("http://x/"));
        assert!(!opts.has_raw_data());
        assert!(!opts.has_form());
        assert!(!opts.has_transport_features());
    }
}
