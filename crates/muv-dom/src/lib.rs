#![forbid(unsafe_code)]

//! DOM substrate for muv.
//!
//! Rust has no ambient browser document, so this crate provides the mutable
//! surface the render engine reconciles: an arena-backed document with a
//! markup parser, a CSS-subset selector engine, attribute/value/src sinks,
//! and an event-listener registry with replace-on-rebind discipline.
//!
//! The [`Document`] handle is cheaply cloneable; clones share state. All of
//! it is single-threaded (`Rc<RefCell<..>>` inside), matching the
//! cooperative event-loop model of the runtime.

pub mod document;
pub mod node;
pub mod parse;
pub mod selector;

pub use document::{Document, EventHandler};
pub use node::{NodeId, supports_src, supports_value};
pub use parse::{MarkupNode, parse_fragment};
pub use selector::Selector;
