//! Minimal markup parser for templates and bound-value injection.
//!
//! Parses the HTML subset templates actually use: elements with quoted,
//! bare, or boolean attributes, void elements, self-closing syntax, text,
//! and comments (skipped). Tag and attribute names are lowercased.
//!
//! # Invariants
//!
//! 1. Parsing never fails: malformed input degrades. Stray `<` becomes
//!    text, unmatched close tags are ignored, unclosed elements are closed
//!    at end of input. Render-time data errors must never abort a pass.
//! 2. Output order is source order.
//! 3. The named entities `&amp; &lt; &gt; &quot; &apos;` and `&#39;` are
//!    decoded in text and attribute values; anything else is left verbatim.

/// A parsed markup tree, detached from any document.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkupNode {
    /// An element with its attributes (source order) and children.
    Element {
        /// Lowercased tag name.
        tag: String,
        /// Attributes in source order; boolean attributes get `""`.
        attrs: Vec<(String, String)>,
        /// Child nodes.
        children: Vec<MarkupNode>,
    },
    /// A run of character data, entities decoded.
    Text(String),
}

/// Parse a markup fragment into a list of top-level nodes.
#[must_use]
pub fn parse_fragment(input: &str) -> Vec<MarkupNode> {
    Parser::new(input).run()
}

struct OpenElement {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// Completed top-level nodes.
    done: Vec<MarkupNode>,
    /// Open-element stack; children accumulate on the top frame.
    stack: Vec<OpenElement>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
            done: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<MarkupNode> {
        let mut text_start = self.pos;
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos] != b'<' {
                self.pos += 1;
                continue;
            }
            // Decide whether this '<' opens real markup; if not, it stays text.
            if let Some(consumed_to) = self.try_markup(text_start) {
                text_start = consumed_to;
                self.pos = consumed_to;
            } else {
                self.pos += 1;
            }
        }
        self.flush_text(text_start, self.bytes.len());
        // Unclosed elements: close everything at end of input.
        while let Some(frame) = self.stack.pop() {
            self.attach(element_node(frame));
        }
        self.done
    }

    /// Try to consume a tag/comment/close starting at `self.pos`. Returns
    /// the position after the construct, or `None` when the `<` is literal
    /// text.
    fn try_markup(&mut self, text_start: usize) -> Option<usize> {
        let start = self.pos;
        let rest = &self.bytes[start..];
        if rest.starts_with(b"<!--") {
            self.flush_text(text_start, start);
            let end = find_subslice(self.bytes, b"-->", start + 4)
                .map_or(self.bytes.len(), |i| i + 3);
            return Some(end);
        }
        if rest.starts_with(b"</") {
            // A close marker with no terminating '>' is literal text.
            let close = find_byte(self.bytes, b'>', start + 2)?;
            self.flush_text(text_start, start);
            let name = std::str::from_utf8(&self.bytes[start + 2..close])
                .unwrap_or("")
                .trim()
                .to_ascii_lowercase();
            self.close_element(&name);
            return Some(close + 1);
        }
        if rest.starts_with(b"<!") || rest.starts_with(b"<?") {
            self.flush_text(text_start, start);
            let end = find_byte(self.bytes, b'>', start + 2).map_or(self.bytes.len(), |i| i + 1);
            return Some(end);
        }
        if rest.len() > 1 && rest[1].is_ascii_alphabetic() {
            self.flush_text(text_start, start);
            return Some(self.open_tag(start + 1));
        }
        None
    }

    /// Parse a start tag beginning at the first byte of the tag name.
    /// Returns the position after the closing `>`.
    fn open_tag(&mut self, mut pos: usize) -> usize {
        let name_start = pos;
        while pos < self.bytes.len()
            && (self.bytes[pos].is_ascii_alphanumeric() || self.bytes[pos] == b'-')
        {
            pos += 1;
        }
        let tag = std::str::from_utf8(&self.bytes[name_start..pos])
            .unwrap_or("")
            .to_ascii_lowercase();

        let mut attrs = Vec::new();
        let mut self_closing = false;
        loop {
            pos = skip_whitespace(self.bytes, pos);
            if pos >= self.bytes.len() {
                break;
            }
            match self.bytes[pos] {
                b'>' => {
                    pos += 1;
                    break;
                }
                b'/' => {
                    self_closing = true;
                    pos += 1;
                }
                _ => {
                    let (attr, next) = parse_attribute(self.bytes, pos);
                    if let Some(attr) = attr {
                        attrs.push(attr);
                    }
                    // Guard against a stuck cursor on unparsable bytes.
                    pos = next.max(pos + 1);
                }
            }
        }

        if self_closing || crate::node::is_void(&tag) {
            self.attach(MarkupNode::Element {
                tag,
                attrs,
                children: Vec::new(),
            });
        } else {
            self.stack.push(OpenElement {
                tag,
                attrs,
                children: Vec::new(),
            });
        }
        pos
    }

    /// Pop the stack down to (and including) the innermost open element with
    /// this tag name. Unmatched close tags are ignored.
    fn close_element(&mut self, name: &str) {
        let Some(depth) = self.stack.iter().rposition(|f| f.tag == name) else {
            return;
        };
        while self.stack.len() > depth {
            let frame = self.stack.pop().expect("depth bounded by stack length");
            self.attach(element_node(frame));
        }
    }

    fn flush_text(&mut self, from: usize, to: usize) {
        if from >= to {
            return;
        }
        let raw = std::str::from_utf8(&self.bytes[from..to]).unwrap_or("");
        if raw.is_empty() {
            return;
        }
        self.attach(MarkupNode::Text(decode_entities(raw)));
    }

    fn attach(&mut self, node: MarkupNode) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.done.push(node),
        }
    }
}

fn element_node(frame: OpenElement) -> MarkupNode {
    MarkupNode::Element {
        tag: frame.tag,
        attrs: frame.attrs,
        children: frame.children,
    }
}

/// Parse one attribute starting at `pos` (first byte of the name).
/// Returns the attribute (if a name was present) and the next position.
fn parse_attribute(bytes: &[u8], mut pos: usize) -> (Option<(String, String)>, usize) {
    let name_start = pos;
    while pos < bytes.len() && !matches!(bytes[pos], b'=' | b'>' | b'/' | b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    if pos == name_start {
        return (None, pos);
    }
    let name = std::str::from_utf8(&bytes[name_start..pos])
        .unwrap_or("")
        .to_ascii_lowercase();

    pos = skip_whitespace(bytes, pos);
    if pos >= bytes.len() || bytes[pos] != b'=' {
        // Boolean attribute.
        return (Some((name, String::new())), pos);
    }
    pos = skip_whitespace(bytes, pos + 1);
    if pos >= bytes.len() {
        return (Some((name, String::new())), pos);
    }

    let value = match bytes[pos] {
        quote @ (b'"' | b'\'') => {
            let value_start = pos + 1;
            let end = find_byte(bytes, quote, value_start).unwrap_or(bytes.len());
            let raw = std::str::from_utf8(&bytes[value_start..end]).unwrap_or("");
            pos = (end + 1).min(bytes.len());
            decode_entities(raw)
        }
        _ => {
            let value_start = pos;
            while pos < bytes.len() && !matches!(bytes[pos], b'>' | b' ' | b'\t' | b'\n' | b'\r') {
                pos += 1;
            }
            let raw = std::str::from_utf8(&bytes[value_start..pos]).unwrap_or("");
            decode_entities(raw)
        }
    };
    (Some((name, value)), pos)
}

fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }
    pos
}

fn find_byte(bytes: &[u8], needle: u8, from: usize) -> Option<usize> {
    bytes.get(from..)?.iter().position(|&b| b == needle).map(|i| from + i)
}

fn find_subslice(bytes: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_owned();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(i) = rest.find('&') {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        let mut matched = false;
        for (entity, ch) in [
            ("&amp;", '&'),
            ("&lt;", '<'),
            ("&gt;", '>'),
            ("&quot;", '"'),
            ("&apos;", '\''),
            ("&#39;", '\''),
        ] {
            if rest.starts_with(entity) {
                out.push(ch);
                rest = &rest[entity.len()..];
                matched = true;
                break;
            }
        }
        if !matched {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, attrs: &[(&str, &str)], children: Vec<MarkupNode>) -> MarkupNode {
        MarkupNode::Element {
            tag: tag.to_owned(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            children,
        }
    }

    fn text(s: &str) -> MarkupNode {
        MarkupNode::Text(s.to_owned())
    }

    #[test]
    fn plain_text() {
        assert_eq!(parse_fragment("hello"), vec![text("hello")]);
    }

    #[test]
    fn single_element_with_text() {
        assert_eq!(
            parse_fragment("<p>hi</p>"),
            vec![el("p", &[], vec![text("hi")])]
        );
    }

    #[test]
    fn nested_elements() {
        assert_eq!(
            parse_fragment("<div><span>a</span>b</div>"),
            vec![el(
                "div",
                &[],
                vec![el("span", &[], vec![text("a")]), text("b")]
            )]
        );
    }

    #[test]
    fn quoted_attributes() {
        assert_eq!(
            parse_fragment(r#"<p data-model="name" class='big'></p>"#),
            vec![el("p", &[("data-model", "name"), ("class", "big")], vec![])]
        );
    }

    #[test]
    fn bare_and_boolean_attributes() {
        assert_eq!(
            parse_fragment("<input type=text disabled>"),
            vec![el("input", &[("type", "text"), ("disabled", "")], vec![])]
        );
    }

    #[test]
    fn void_element_takes_no_children() {
        assert_eq!(
            parse_fragment("<img src=\"x.png\">after"),
            vec![el("img", &[("src", "x.png")], vec![]), text("after")]
        );
    }

    #[test]
    fn self_closing_syntax() {
        assert_eq!(
            parse_fragment("<br/><span/>tail"),
            vec![el("br", &[], vec![]), el("span", &[], vec![]), text("tail")]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            parse_fragment("a<!-- ignore <b> -->c"),
            vec![text("a"), text("c")]
        );
    }

    #[test]
    fn tag_names_lowercased() {
        assert_eq!(
            parse_fragment("<DIV CLASS=\"x\"></DIV>"),
            vec![el("div", &[("class", "x")], vec![])]
        );
    }

    #[test]
    fn entities_decoded_in_text_and_attrs() {
        assert_eq!(
            parse_fragment("<p title=\"a &amp; b\">1 &lt; 2</p>"),
            vec![el("p", &[("title", "a & b")], vec![text("1 < 2")])]
        );
    }

    #[test]
    fn unknown_entity_left_verbatim() {
        assert_eq!(parse_fragment("&nope; x"), vec![text("&nope; x")]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        assert_eq!(parse_fragment("1 < 2"), vec![text("1 < 2")]);
    }

    #[test]
    fn unmatched_close_tag_ignored() {
        assert_eq!(parse_fragment("a</div>b"), vec![text("a"), text("b")]);
    }

    #[test]
    fn close_marker_without_terminator_is_text() {
        assert_eq!(parse_fragment("oops</"), vec![text("oops</")]);
        assert_eq!(parse_fragment("</"), vec![text("</")]);
        assert_eq!(parse_fragment("a</ab"), vec![text("a</ab")]);
    }

    #[test]
    fn unterminated_close_marker_inside_element() {
        assert_eq!(
            parse_fragment("<div>x</"),
            vec![el("div", &[], vec![text("x</")])]
        );
    }

    #[test]
    fn unclosed_element_closed_at_eof() {
        assert_eq!(
            parse_fragment("<div>open"),
            vec![el("div", &[], vec![text("open")])]
        );
    }

    #[test]
    fn close_pops_intervening_elements() {
        // </div> closes both the span (implicitly) and the div.
        assert_eq!(
            parse_fragment("<div><span>x</div>y"),
            vec![
                el("div", &[], vec![el("span", &[], vec![text("x")])]),
                text("y")
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(parse_fragment("").is_empty());
    }

    #[test]
    fn doctype_skipped() {
        assert_eq!(parse_fragment("<!DOCTYPE html><p>x</p>"), vec![el("p", &[], vec![text("x")])]);
    }
}
