//! HTTP method types.

use derive_more::Display;
use serde::{Serialize, Serializer};

/// HTTP request method.
///
/// curl accepts any token after `-X`, so anything outside the well-known set
/// is kept verbatim (upper-cased) in [`Method::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET method - retrieve a resource.
    #[display("GET")]
    Get,
    /// POST method - create a resource.
    #[display("POST")]
    Post,
    /// PUT method - replace a resource.
    #[display("PUT")]
    Put,
    /// DELETE method - remove a resource.
    #[display("DELETE")]
    Delete,
    /// PATCH method - partially update a resource.
    #[display("PATCH")]
    Patch,
    /// HEAD method - retrieve headers only.
    #[display("HEAD")]
    Head,
    /// OPTIONS method - retrieve allowed methods.
    #[display("OPTIONS")]
    Options,
    /// Any other method token.
    #[display("{_0}")]
    Custom(String),
}

impl Method {
    /// Parse a method token the way `-X` does: case-insensitive, upper-cased.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the token is empty or is not a valid
    /// HTTP method token.
    pub fn parse(token: &str) -> crate::Result<Self> {
        let upper = token.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Err(crate::Error::configuration("empty HTTP method"));
        }
        let method = http::Method::from_bytes(upper.as_bytes()).map_err(|_| {
            crate::Error::configuration(format!("invalid HTTP method: {token}"))
        })?;
        Ok(Self::from(method))
    }

    /// Returns `true` for GET.
    #[must_use]
    pub const fn is_get(&self) -> bool {
        matches!(self, Self::Get)
    }

    /// Returns `true` for POST.
    #[must_use]
    pub const fn is_post(&self) -> bool {
        matches!(self, Self::Post)
    }

    /// Returns `true` if the method is safe (does not modify resources).
    #[must_use]
    pub const fn is_safe(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

impl Serialize for Method {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<&Method> for http::Method {
    type Error = crate::Error;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match method {
            Method::Get => Ok(Self::GET),
            Method::Post => Ok(Self::POST),
            Method::Put => Ok(Self::PUT),
            Method::Delete => Ok(Self::DELETE),
            Method::Patch => Ok(Self::PATCH),
            Method::Head => Ok(Self::HEAD),
            Method::Options => Ok(Self::OPTIONS),
            Method::Custom(token) => Self::from_bytes(token.as_bytes()).map_err(|_| {
                crate::Error::configuration(format!("invalid HTTP method: {token}"))
            }),
        }
    }
}

impl From<http::Method> for Method {
    fn from(method: http::Method) -> Self {
        match method {
            http::Method::GET => Self::Get,
            http::Method::POST => Self::Post,
            http::Method::PUT => Self::Put,
            http::Method::DELETE => Self::Delete,
            http::Method::PATCH => Self::Patch,
            http::Method::HEAD => Self::Head,
            http::Method::OPTIONS => Self::Options,
            other => Self::Custom(other.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Head.to_string(), "HEAD");
        assert_eq!(Method::Options.to_string(), "OPTIONS");
        assert_eq!(Method::Custom("PURGE".to_string()).to_string(), "PURGE");
    }

    #[test]
    fn method_parse_is_case_insensitive() {
        assert_eq!(Method::parse("post").expect("post"), Method::Post);
        assert_eq!(Method::parse(" Put ").expect("put"), Method::Put);
        assert_eq!(
            Method::parse("purge").expect("purge"),
            Method::Custom("PURGE".to_string())
        );
    }

    #[test]
    fn method_parse_rejects_invalid_tokens() {
        assert!(Method::parse("").expect_err("empty").is_configuration());
        assert!(Method::parse("GE T").expect_err("space").is_configuration());
    }

    #[test]
    fn method_is_safe() {
        assert!(Method::Get.is_safe());
        assert!(Method::Head.is_safe());
        assert!(!Method::Post.is_safe());
        assert!(!Method::Custom("PURGE".to_string()).is_safe());
    }

    #[test]
    fn method_into_http() {
        assert_eq!(
            http::Method::try_from(&Method::Get).expect("GET"),
            http::Method::GET
        );
        assert_eq!(
            http::Method::try_from(&Method::Custom("PURGE".to_string()))
                .expect("PURGE")
                .as_str(),
            "PURGE"
        );
    }

    #[test]
    fn method_from_http() {
        assert_eq!(Method::from(http::Method::POST), Method::Post);
        assert_eq!(
            Method::from(http::Method::CONNECT),
            Method::Custom("CONNECT".to_string())
        );
    }

    #[test]
    fn method_serializes_as_string() {
        let json = serde_json::to_string(&Method::Patch).expect("json");
        assert_eq!(json, "\"PATCH\"");
    }
}
