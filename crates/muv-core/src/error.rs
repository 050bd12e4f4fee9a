//! Construction-time errors.
//!
//! The error taxonomy is deliberately small: structural problems at view
//! construction are fatal and abort creation; render-time data problems
//! (unknown model keys, malformed directives) are recovered locally and
//! never surface here.

use std::fmt;

/// Fatal errors raised while constructing a bound view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// No render target was supplied in the configuration.
    MissingTarget,
    /// The supplied render target is not a live element in the document.
    TargetNotFound {
        /// Raw arena index of the offending node handle.
        node: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "view configuration has no render target element"),
            Self::TargetNotFound { node } => {
                write!(f, "render target node {node} is not a live document element")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
