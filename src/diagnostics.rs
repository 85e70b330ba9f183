// ABOUTME: Diagnostics accumulator for non-fatal warnings while running tasks.
// ABOUTME: Collects warnings that shouldn't fail a deploy but should be shown to users.

/// Collects non-fatal warnings during task execution.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn hook_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HookFailed,
            message: message.into(),
        }
    }

    pub fn target_skipped(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TargetSkipped,
            message: message.into(),
        }
    }

    pub fn ssh_disconnect(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::SshDisconnect,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A before or after hook exited non-zero or could not be run.
    HookFailed,
    /// The engine is not configured for a target.
    TargetSkipped,
    /// Failed to cleanly disconnect an SSH session.
    SshDisconnect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::target_skipped("web1 has no deployer settings"));
        diag.warn(Warning::hook_failed("after_script exited 1"));
        diag.warn(Warning::ssh_disconnect("connection reset"));

        let kinds: Vec<_> = diag.warnings().iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WarningKind::TargetSkipped,
                WarningKind::HookFailed,
                WarningKind::SshDisconnect
            ]
        );
    }
}
