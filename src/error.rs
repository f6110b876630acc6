// Runtime error taxonomy
//
// Configuration and unsupported-resource errors are fatal and raised
// synchronously to the nearest caller. Handler errors never appear here:
// they are contained per-handler at the task boundary (see events.rs).

/// Errors surfaced by the view runtime
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// `render()` was called but no mount target was ever supplied
    #[error("render() called with no mount target ever supplied")]
    NoMountTarget,

    /// The composed view chain lacks a required hook
    #[error("view is missing required `{0}` hook")]
    MissingHook(&'static str),

    /// A loader was asked to resolve a descriptor kind it does not support
    #[error("unsupported resource descriptor: {0}")]
    UnsupportedResource(String),

    /// A resource failed to load; fails the whole batch
    #[error("resource load failed for `{name}`: {reason}")]
    LoadFailed { name: String, reason: String },
}

impl RuntimeError {
    /// Shorthand for load failures coming out of transport or parse errors
    pub fn load_failed(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        RuntimeError::LoadFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
