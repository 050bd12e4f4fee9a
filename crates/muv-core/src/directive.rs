//! Event directive parsing.
//!
//! A directive maps a declarative `"<eventType> <selector>"` key to a named
//! callback from the caller's handler bag. Parsing happens once at view
//! construction; the resulting list is immutable and re-applied on every
//! render pass.
//!
//! # Invariants
//!
//! 1. Output order matches input order for every entry that parses.
//! 2. A malformed key (not exactly two space-separated, non-empty tokens)
//!    is skipped without aborting the remaining entries.
//! 3. A callback name missing from the handler bag is skipped the same way.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Malformed key | zero, one, or three+ tokens | Entry skipped silently |
//! | Empty token | leading/trailing/double space | Entry skipped silently |
//! | Unknown callback | name not in the bag | Entry skipped silently |

use ahash::AHashMap;

/// One parsed event directive: an event type, a selector, and the callback
/// to attach. Built once at construction; immutable thereafter.
#[derive(Clone, Debug)]
pub struct EventDirective<C> {
    /// Event type to listen for (e.g. `"click"`).
    pub event_type: String,
    /// Selector resolved against the live document on every render pass.
    pub selector: String,
    /// Callback attached to each matching element.
    pub callback: C,
}

/// Parse an ordered list of (`"<eventType> <selector>"`, callback-name)
/// entries against a handler bag.
///
/// Entries that do not split into exactly two non-empty tokens on a single
/// space, or whose callback name does not resolve, are dropped. Remaining
/// directives preserve input order.
///
/// # Example
///
/// ```
/// use ahash::AHashMap;
/// use muv_core::parse_directives;
///
/// let mut handlers: AHashMap<String, &'static str> = AHashMap::new();
/// handlers.insert("onSave".into(), "save-handler");
///
/// let entries = vec![
///     ("click .save".to_string(), "onSave".to_string()),
///     ("not-a-directive".to_string(), "onSave".to_string()),
///     ("click .other".to_string(), "missing".to_string()),
/// ];
/// let parsed = parse_directives(&entries, &handlers);
/// assert_eq!(parsed.len(), 1);
/// assert_eq!(parsed[0].event_type, "click");
/// assert_eq!(parsed[0].selector, ".save");
/// ```
pub fn parse_directives<C: Clone>(
    entries: &[(String, String)],
    handlers: &AHashMap<String, C>,
) -> Vec<EventDirective<C>> {
    let mut parsed = Vec::new();
    for (key, name) in entries {
        let mut tokens = key.trim().split(' ');
        let (Some(event_type), Some(selector), None) =
            (tokens.next(), tokens.next(), tokens.next())
        else {
            continue;
        };
        if event_type.is_empty() || selector.is_empty() {
            continue;
        }
        let Some(callback) = handlers.get(name) else {
            continue;
        };
        parsed.push(EventDirective {
            event_type: event_type.to_owned(),
            selector: selector.to_owned(),
            callback: callback.clone(),
        });
    }
    parsed
}
