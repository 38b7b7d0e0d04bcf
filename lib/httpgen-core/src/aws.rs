//! AWS signature version 2.
//!
//! The `Date` header is produced when the plan is built, through a
//! [`Clock`], so repeated renders of one plan agree and tests can pin the
//! time with [`FixedClock`].

use std::fmt::Debug;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha1::Sha1;

use crate::{Error, Method, Result};

/// RFC 1123 with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 +0000`.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Source of the current time.
pub trait Clock: Debug + Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// `accessKey:secretKey` from `--awsv2`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key: String,
    secret_key: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Parse `accessKey:secretKey`, splitting on the first `:`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when there is no `:`.
    pub fn parse(value: &str) -> Result<Self> {
        let (access_key, secret_key) = value.split_once(':').ok_or_else(|| {
            Error::configuration("AWS V2 credentials must be 'accessKey:secretKey'")
        })?;
        Ok(Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    /// The access key.
    #[must_use]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// The secret key.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

/// The request attributes covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInput<'a> {
    /// HTTP method.
    pub method: &'a Method,
    /// `Content-MD5` value, or empty.
    pub content_md5: &'a str,
    /// `Content-Type` value, or empty.
    pub content_type: &'a str,
    /// URL path.
    pub path: &'a str,
}

/// `Date` and `Authorization` header values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// `Date` header value.
    pub date: String,
    /// `Authorization` header value.
    pub authorization: String,
}

/// Values a renderer needs to inline a runtime signing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwsV2Helper {
    /// Access key.
    pub access_key: String,
    /// Secret key.
    pub secret_key: String,
    /// `Content-MD5` value, or empty.
    pub content_md5: String,
    /// Signed content type, or empty.
    pub content_type: String,
    /// Signed URL path.
    pub path: String,
}

/// The string to sign: method, MD5, content type, date and path joined with
/// `\n`, with no trailing newline.
#[must_use]
pub fn string_to_sign(input: &SigningInput<'_>, date: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        input.method, input.content_md5, input.content_type, date, input.path
    )
}

/// Sign a request at the clock's current time.
///
/// # Errors
///
/// Returns a configuration error if the HMAC key is rejected.
pub fn sign(
    credentials: &Credentials,
    input: &SigningInput<'_>,
    clock: &dyn Clock,
) -> Result<Signature> {
    let date = clock.now().format(DATE_FORMAT).to_string();
    let message = string_to_sign(input, &date);

    let mut mac = Hmac::<Sha1>::new_from_slice(credentials.secret_key.as_bytes())
        .map_err(|err| Error::configuration(format!("invalid AWS V2 secret key: {err}")))?;
    mac.update(message.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    tracing::debug!(%date, access_key = %credentials.access_key, "signed request with AWS V2");
    Ok(Signature {
        date,
        authorization: format!("AWS {}:{signature}", credentials.access_key),
    })
}

/// The path component of a URL, `/` when empty.
///
/// URLs without a scheme are read as `http://`.
#[must_use]
pub fn url_path(url: &str) -> String {
    let parsed = url::Url::parse(url)
        .ok()
        .filter(|parsed| !parsed.cannot_be_a_base())
        .or_else(|| url::Url::parse(&format!("http://{url}")).ok());
    match parsed {
        Some(parsed) if !parsed.path().is_empty() => parsed.path().to_string(),
        _ => "/".to_string(),
    }
}
