#![forbid(unsafe_code)]

//! Core types for muv: view identity, model values, event directives,
//! configuration errors, and the broadcast dispatch bus.
//!
//! Everything in this crate sits below the DOM substrate and the runtime:
//! it knows nothing about documents, nodes, or render passes. The directive
//! parser is generic over its callback type for exactly that reason.

pub mod directive;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod value;

pub use directive::{EventDirective, parse_directives};
pub use dispatch::{Dispatch, RENDER_EVENT, RenderNotice, Subscription};
pub use error::ConfigError;
pub use id::ViewId;
pub use value::Value;
