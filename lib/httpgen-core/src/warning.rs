//! Non-fatal diagnostics collected while building a plan.

use derive_more::Display;
use serde::Serialize;

/// A problem that is reported but does not abort plan construction.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(tag = "kind", content = "input", rename_all = "snake_case")]
pub enum Warning {
    /// A header line without a `:` separator; it is skipped.
    #[display("'{_0}' is a wrong style header, skipped")]
    MalformedHeader(String),
    /// A cookie pair without `=`; it is skipped.
    #[display("'{_0}' is not a name=value cookie, skipped")]
    MalformedCookie(String),
    /// An unknown `;key=value` parameter after a form file reference.
    #[display("unknown form file parameter '{_0}', ignored")]
    UnknownFormParameter(String),
}

/// Emit a warning through `tracing` and keep it for the plan.
pub(crate) fn report(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(%warning, "ignoring part of the input");
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_display() {
        assert_eq!(
            Warning::MalformedHeader("Accept".to_string()).to_string(),
            "'Accept' is a wrong style header, skipped"
        );
        assert_eq!(
            Warning::MalformedCookie("session".to_string()).to_string(),
            "'session' is not a name=value cookie, skipped"
        );
    }

    #[test]
    fn report_collects() {
        let mut warnings = Vec::new();
        report(&mut warnings, Warning::UnknownFormParameter("x=1".to_string()));
        assert_eq!(warnings.len(), 1);
    }
}
