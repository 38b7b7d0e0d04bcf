//! Output targets.
//!
//! A [`Renderer`] turns a [`ResolvedPlan`] into text. Renderers are looked
//! up by name (or alias) in a [`TargetRegistry`]; the registry refuses to
//! hand a plan to a renderer that does not support its variant.

use std::collections::BTreeMap;
use std::fmt;

use httpgen_core::{Error, ResolvedPlan, Result, Variant};

mod curl;
mod json;

pub use self::curl::CurlRenderer;
pub use self::json::JsonRenderer;

/// Renders a resolved plan for one target.
pub trait Renderer: Send + Sync {
    /// Primary target name.
    fn name(&self) -> &'static str;

    /// Returns `true` if the renderer has a template for `variant`.
    fn supports(&self, variant: Variant) -> bool {
        let _ = variant;
        true
    }

    /// Render the plan.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan cannot be expressed in the target.
    fn render(&self, plan: &ResolvedPlan) -> Result<String>;
}

/// Renderers indexed by name and alias.
pub struct TargetRegistry {
    renderers: Vec<Box<dyn Renderer>>,
    aliases: BTreeMap<String, usize>,
}

impl fmt::Debug for TargetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetRegistry")
            .field("targets", &self.names())
            .field("aliases", &self.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new()
            .register(&["json", "plan"], JsonRenderer)
            .register(&["curl", "sh"], CurlRenderer)
    }
}

impl TargetRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            renderers: Vec::new(),
            aliases: BTreeMap::new(),
        }
    }

    /// Add a renderer under its name and extra aliases.
    ///
    /// Aliases are matched case-insensitively; a later registration replaces
    /// an earlier one for the same alias.
    #[must_use]
    pub fn register<R>(mut self, aliases: &[&str], renderer: R) -> Self
    where
        R: Renderer + 'static,
    {
        let index = self.renderers.len();
        let name = renderer.name().to_ascii_lowercase();
        for alias in aliases.iter().map(|alias| alias.to_ascii_lowercase()).chain([name]) {
            self.aliases.insert(alias, index);
        }
        self.renderers.push(Box::new(renderer));
        self
    }

    /// Look up a renderer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTarget`] when nothing is registered under
    /// `target`.
    pub fn get(&self, target: &str) -> Result<&dyn Renderer> {
        self.aliases
            .get(&target.trim().to_ascii_lowercase())
            .and_then(|index| self.renderers.get(*index))
            .map(|renderer| renderer.as_ref())
            .ok_or_else(|| Error::unknown_target(target, self.names().join(", ")))
    }

    /// Primary names of the registered renderers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.renderers.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Render a plan with the named target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTarget`] for an unregistered target,
    /// [`Error::RendererUnsupported`] when the renderer has no template for
    /// the plan's variant, or whatever the renderer itself reports.
    pub fn render(&self, target: &str, plan: &ResolvedPlan) -> Result<String> {
        let renderer = self.get(target)?;
        let variant = plan.variant();
        if !renderer.supports(variant) {
            return Err(Error::renderer_unsupported(
                renderer.name(),
                format!("no template for the {variant} variant"),
            ));
        }
        tracing::debug!(renderer = renderer.name(), %variant, "rendering plan");
        renderer.render(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_targets_and_aliases() {
        let registry = TargetRegistry::default();
        assert_eq!(registry.names(), ["curl", "json"]);
        assert_eq!(registry.get("sh").expect("alias").name(), "curl");
        assert_eq!(registry.get(" PLAN ").expect("alias").name(), "json");
    }

    #[test]
    fn unknown_target_lists_available() {
        let registry = TargetRegistry::default();
        let err = registry.get("cobol").err().expect("unknown");
        assert_eq!(
            err.to_string(),
            "'cobol' is not supported as a target (available: curl, json)"
        );
    }

    #[test]
    fn later_registration_wins() {
        let registry = TargetRegistry::default().register(&["sh"], JsonRenderer);
        assert_eq!(registry.get("sh").expect("alias").name(), "json");
        assert_eq!(registry.get("curl").expect("name").name(), "curl");
    }
}
