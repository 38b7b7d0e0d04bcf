use httpgen_core::{ResolvedPlan, Result};

use super::Renderer;

/// Dumps the resolved plan as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, plan: &ResolvedPlan) -> Result<String> {
        Ok(serde_json::to_string_pretty(plan)?)
    }
}
