//! Generate HTTP client code from curl command lines.
//!
//! The heavy lifting lives in [`httpgen_core`]: this crate parses curl
//! arguments into [`RawOptions`], resolves them into a [`ResolvedPlan`], and
//! hands the plan to a [`Renderer`] picked from a [`TargetRegistry`].
//!
//! # Example
//!
//! ```
//! use httpgen::prelude::*;
//!
//! let output = generate(
//!     ["curl", "-d", "a=1", "http://x/"],
//!     "curl",
//!     &TargetRegistry::default(),
//!     &PlanConfig::default(),
//! )
//! .expect("rendered");
//!
//! assert_eq!(output, "curl \\\n  http://x/ \\\n  -H 'Content-Type: application/x-www-form-urlencoded' \\\n  -d a=1");
//! ```

pub mod args;
pub mod prelude;
pub mod render;

pub use args::{CurlArgs, parse_args, parse_command, tokenize};
pub use render::{CurlRenderer, JsonRenderer, Renderer, TargetRegistry};

pub use httpgen_core::{
    Error, PlanConfig, PlanConfigBuilder, RawOptions, ResolvedPlan, Result, Variant, build_plan,
};

/// Parse curl arguments, build the plan, and render it with `target`.
///
/// # Errors
///
/// Returns the first error from argument parsing, plan construction, or
/// rendering.
pub fn generate<I, S>(
    args: I,
    target: &str,
    registry: &TargetRegistry,
    config: &PlanConfig,
) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let CurlArgs { options, ignored } = parse_args(args)?;
    if !ignored.is_empty() {
        tracing::debug!(?ignored, "skipped curl arguments");
    }
    let plan = build_plan(&options, config)?;
    registry.render(target, &plan)
}
