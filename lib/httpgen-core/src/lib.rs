//! Normalization and dispatch engine for httpgen.
//!
//! Turns a curl-style option set into a [`ResolvedPlan`]: a normalized,
//! renderer-agnostic description of the HTTP request to synthesize.
//!
//! The pipeline, leaf-first:
//! - [`RawOptions`] - everything the user supplied, immutable once built
//! - [`classify`] - typed payload fragments (source, encoding, form role)
//! - [`content_type`] - content negotiation and multipart boundaries
//! - [`Variant`] - the request shape selected by the dispatch classifier
//! - [`build_plan`] - the resolved plan, with computed headers
//! - [`aws`] - the AWS V2 signer
//!
//! The core performs no I/O and holds no shared state; every entry point can
//! be called concurrently for different inputs.
//!
//! # Example
//!
//! ```
//! use httpgen_core::prelude::*;
//!
//! let options = RawOptions::builder("http://x/")
//!     .data("a=1")
//!     .data("b=2")
//!     .build()
//!     .expect("valid options");
//! let plan = build_plan(&options, &PlanConfig::default()).expect("plan");
//!
//! assert_eq!(plan.method(), &Method::Post);
//! assert_eq!(plan.variant(), Variant::PostSimpleForm);
//! ```

pub mod aws;
mod config;
pub mod content_type;
mod dispatch;
mod error;
mod fragment;
mod header;
mod method;
pub mod mime;
mod multipart;
mod options;
mod plan;
pub mod prelude;
mod query;
mod warning;

pub use aws::{AwsV2Helper, Clock, FixedClock, SystemClock};
pub use config::{DEFAULT_BOUNDARY, PlanConfig, PlanConfigBuilder};
pub use content_type::ContentTypeSource;
pub use dispatch::Variant;
pub use error::{Error, Result};
pub use fragment::{
    BodyFragment, ClassifiedFragment, FragmentEncoding, Payload, Source, classify, classify_all,
};
pub use header::{HeaderGroup, HeaderLine, Headers};
pub use method::Method;
pub use multipart::{MultipartBody, OCTET_STREAM, Part, basename};
pub use options::{Cookie, RawFragment, RawFragmentKind, RawOptions, RawOptionsBuilder};
pub use plan::{
    BodyPlan, Capability, EffectiveUrl, HeaderEntry, HeaderOrigin, HeaderValue, QueryPlan,
    ResolvedPlan, Transport, build_plan,
};
pub use query::{FormMap, form_escape, parse_query};
pub use warning::Warning;
