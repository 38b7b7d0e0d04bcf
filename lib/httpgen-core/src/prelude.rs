//! Prelude module for convenient imports.
//!
//! ```
//! use httpgen_core::prelude::*;
//! ```

pub use crate::{
    BodyPlan, Capability, Error, FixedClock, HeaderEntry, HeaderValue, Method, PlanConfig,
    RawFragmentKind, RawOptions, ResolvedPlan, Result, Variant, Warning, build_plan,
};
