//! Prelude module for convenient imports.
//!
//! ```
//! use httpgen::prelude::*;
//! ```

pub use crate::{
    CurlArgs, Error, PlanConfig, Renderer, ResolvedPlan, Result, TargetRegistry, Variant,
    build_plan, generate, parse_args, parse_command,
};
