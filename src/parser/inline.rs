//! Inline markdown tokenizer shared by both document converters.
//!
//! Single left-to-right scan over a flat grammar: no nested emphasis, no
//! backtracking. Unmatched delimiters fall through to literal text, so the
//! scan is O(n) and can never fail.

/// One inline token. The grammar is flat; styled nodes hold plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    Text(String),
    Strong(String),
    Em(String),
    Code(String),
    Strike(String),
    Link { text: String, href: String },
}

/// Tokenize one line of text into inline nodes.
///
/// At each position the scanner tries, in order: `**bold**`, `*italic*`
/// (only when the `*` is not part of a bold delimiter), `` `code` ``,
/// `[text](url)`, `~~strike~~`. Anything else accumulates as literal text.
pub fn parse_inline(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];

        if let Some((node, consumed)) = match_delimited(rest) {
            if !literal.is_empty() {
                nodes.push(InlineNode::Text(std::mem::take(&mut literal)));
            }
            nodes.push(node);
            i += consumed;
            continue;
        }

        let ch = rest.chars().next().unwrap_or('\0');
        literal.push(ch);
        i += ch.len_utf8();
    }

    if !literal.is_empty() {
        nodes.push(InlineNode::Text(literal));
    }

    nodes
}

/// Try each delimiter form at the start of `rest`. Returns the parsed node
/// and the number of bytes consumed, or None when nothing matches here.
fn match_delimited(rest: &str) -> Option<(InlineNode, usize)> {
    if let Some(inner) = delimited(rest, "**", "**") {
        return Some((
            InlineNode::Strong(inner.to_string()),
            inner.len() + 4,
        ));
    }

    // A single '*' here cannot be a bold opener (checked above).
    if rest.starts_with('*') && !rest.starts_with("**") {
        if let Some(inner) = delimited(rest, "*", "*") {
            return Some((InlineNode::Em(inner.to_string()), inner.len() + 2));
        }
    }

    if let Some(inner) = delimited(rest, "`", "`") {
        return Some((InlineNode::Code(inner.to_string()), inner.len() + 2));
    }

    if rest.starts_with('[') {
        if let Some((text, href, consumed)) = match_link(rest) {
            return Some((InlineNode::Link { text, href }, consumed));
        }
    }

    if let Some(inner) = delimited(rest, "~~", "~~") {
        return Some((InlineNode::Strike(inner.to_string()), inner.len() + 4));
    }

    None
}

/// Match `open…close` at the start of `s` with non-empty inner text.
fn delimited<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let body = s.strip_prefix(open)?;
    let end = body.find(close)?;
    if end == 0 {
        return None;
    }
    Some(&body[..end])
}

/// Match `[text](url)` at the start of `s`.
fn match_link(s: &str) -> Option<(String, String, usize)> {
    let body = &s[1..];
    let text_end = body.find("](")?;
    let after_text = &body[text_end + 2..];
    let href_end = after_text.find(')')?;
    let text = &body[..text_end];
    let href = &after_text[..href_end];
    if text.is_empty() {
        return None;
    }
    // "[" + text + "](" + href + ")"
    let consumed = 1 + text_end + 2 + href_end + 1;
    Some((text.to_string(), href.to_string(), consumed))
}

/// Render inline nodes back to markdown delimiters.
pub fn render_inline(nodes: &[InlineNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            InlineNode::Text(t) => out.push_str(t),
            InlineNode::Strong(t) => {
                out.push_str("**");
                out.push_str(t);
                out.push_str("**");
            }
            InlineNode::Em(t) => {
                out.push('*');
                out.push_str(t);
                out.push('*');
            }
            InlineNode::Code(t) => {
                out.push('`');
                out.push_str(t);
                out.push('`');
            }
            InlineNode::Strike(t) => {
                out.push_str("~~");
                out.push_str(t);
                out.push_str("~~");
            }
            InlineNode::Link { text, href } => {
                out.push('[');
                out.push_str(text);
                out.push_str("](");
                out.push_str(href);
                out.push(')');
            }
        }
    }
    out
}
