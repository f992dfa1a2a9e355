//! Markdown ⇄ rich document tree conversion.
//!
//! The forward path feeds issue descriptions to the tracker's document API;
//! the reverse path turns remote documents back into markdown for conflict
//! detection. The reverse path is lossy for exotic documents: remote content
//! is informational input, not a faithful archive. Inbound JSON is converted
//! at the edge with [`nodes_from_json`], which drops unknown or malformed
//! nodes rather than failing a pull.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::parser::inline::{parse_inline, render_inline, InlineNode};

/// Wire wrapper for the tracker's document format:
/// `{version: 1, type: "doc", content: [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichDoc {
    pub version: u8,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub content: Vec<RichNode>,
}

impl RichDoc {
    pub fn new(content: Vec<RichNode>) -> Self {
        Self {
            version: 1,
            doc_type: "doc".to_string(),
            content,
        }
    }
}

/// One node of the rich document tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RichNode {
    Heading {
        attrs: HeadingAttrs,
        content: Vec<RichNode>,
    },
    Paragraph {
        content: Vec<RichNode>,
    },
    CodeBlock {
        #[serde(skip_serializing_if = "Option::is_none")]
        attrs: Option<CodeBlockAttrs>,
        content: Vec<RichNode>,
    },
    BulletList {
        content: Vec<RichNode>,
    },
    OrderedList {
        content: Vec<RichNode>,
    },
    ListItem {
        content: Vec<RichNode>,
    },
    Blockquote {
        content: Vec<RichNode>,
    },
    Rule,
    Text {
        text: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlockAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Strong,
    Em,
    Code,
    Strike,
    Link { attrs: LinkAttrs },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkAttrs {
    pub href: String,
}

impl RichNode {
    fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        RichNode::Text {
            text: text.into(),
            marks,
        }
    }
}

/// Convert markdown to a rich document tree.
///
/// Line-oriented scan: each line dispatches on its leading characters to a
/// fence, heading, blockquote, rule, list, or paragraph handler. Blank lines
/// separate blocks and never emit nodes. Unterminated code fences consume to
/// end of input rather than erroring.
pub fn to_rich_document(markdown: &str) -> RichDoc {
    let rule_re = Regex::new(r"^[-*_]{3,}$").expect("Invalid regex pattern");
    let bullet_re =
        Regex::new(r"^[-*+]\s+(.*)$").expect("Invalid regex pattern");
    let ordered_re =
        Regex::new(r"^\d+\.\s+(.*)$").expect("Invalid regex pattern");

    let lines: Vec<&str> = markdown.lines().collect();
    let mut nodes = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, &mut nodes);
            i += 1;
            continue;
        }

        if let Some(fence_rest) = trimmed.strip_prefix("```") {
            flush_paragraph(&mut paragraph, &mut nodes);
            let language = {
                let lang = fence_rest.trim();
                if lang.is_empty() {
                    None
                } else {
                    Some(lang.to_string())
                }
            };
            let mut body: Vec<&str> = Vec::new();
            i += 1;
            while i < lines.len() && lines[i].trim() != "```" {
                body.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence if one exists; otherwise we consumed
            // to end of input.
            if i < lines.len() {
                i += 1;
            }
            nodes.push(RichNode::CodeBlock {
                attrs: Some(CodeBlockAttrs { language }),
                content: vec![RichNode::text(body.join("\n"), Vec::new())],
            });
            continue;
        }

        if trimmed.starts_with('#') {
            flush_paragraph(&mut paragraph, &mut nodes);
            let level = trimmed.chars().take_while(|&c| c == '#').count().min(6) as u8;
            let text = trimmed.trim_start_matches('#').trim();
            nodes.push(RichNode::Heading {
                attrs: HeadingAttrs { level },
                content: inline_text_nodes(text),
            });
            i += 1;
            continue;
        }

        if rule_re.is_match(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            nodes.push(RichNode::Rule);
            i += 1;
            continue;
        }

        if trimmed.starts_with('>') {
            flush_paragraph(&mut paragraph, &mut nodes);
            let mut quoted: Vec<&str> = Vec::new();
            while i < lines.len() {
                let t = lines[i].trim();
                let Some(rest) = t.strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.trim());
                i += 1;
            }
            nodes.push(RichNode::Blockquote {
                content: vec![RichNode::Paragraph {
                    content: inline_text_nodes(&quoted.join(" ")),
                }],
            });
            continue;
        }

        if bullet_re.is_match(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            let items = collect_list_items(&lines, &mut i, &bullet_re);
            nodes.push(RichNode::BulletList { content: items });
            continue;
        }

        if ordered_re.is_match(trimmed) {
            flush_paragraph(&mut paragraph, &mut nodes);
            let items = collect_list_items(&lines, &mut i, &ordered_re);
            nodes.push(RichNode::OrderedList { content: items });
            continue;
        }

        paragraph.push(trimmed.to_string());
        i += 1;
    }

    flush_paragraph(&mut paragraph, &mut nodes);
    RichDoc::new(nodes)
}

fn flush_paragraph(paragraph: &mut Vec<String>, nodes: &mut Vec<RichNode>) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join(" ");
    paragraph.clear();
    nodes.push(RichNode::Paragraph {
        content: inline_text_nodes(&text),
    });
}

fn collect_list_items(lines: &[&str], i: &mut usize, item_re: &Regex) -> Vec<RichNode> {
    let mut items = Vec::new();
    while *i < lines.len() {
        let trimmed = lines[*i].trim();
        let Some(caps) = item_re.captures(trimmed) else {
            break;
        };
        let rest = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        items.push(RichNode::ListItem {
            content: vec![RichNode::Paragraph {
                content: inline_text_nodes(rest),
            }],
        });
        *i += 1;
    }
    items
}

/// Map inline tokens to text runs with marks.
fn inline_text_nodes(text: &str) -> Vec<RichNode> {
    parse_inline(text)
        .into_iter()
        .map(|node| match node {
            InlineNode::Text(t) => RichNode::text(t, Vec::new()),
            InlineNode::Strong(t) => RichNode::text(t, vec![Mark::Strong]),
            InlineNode::Em(t) => RichNode::text(t, vec![Mark::Em]),
            InlineNode::Code(t) => RichNode::text(t, vec![Mark::Code]),
            InlineNode::Strike(t) => RichNode::text(t, vec![Mark::Strike]),
            InlineNode::Link { text, href } => RichNode::text(
                text,
                vec![Mark::Link {
                    attrs: LinkAttrs { href },
                }],
            ),
        })
        .collect()
}

/// Convert a rich document tree back to markdown.
///
/// Handles the node types a remote document can reasonably contain;
/// list items keep only their first paragraph (deeper nesting is dropped).
pub fn from_rich_document(nodes: &[RichNode]) -> String {
    let mut blocks: Vec<String> = Vec::new();
    for node in nodes {
        match node {
            RichNode::Paragraph { content } => {
                let text = render_text_content(content);
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
            RichNode::Heading { attrs, content } => {
                let hashes = "#".repeat(attrs.level.clamp(1, 6) as usize);
                blocks.push(format!("{hashes} {}", render_text_content(content)));
            }
            RichNode::CodeBlock { attrs, content } => {
                let language = attrs
                    .as_ref()
                    .and_then(|a| a.language.as_deref())
                    .unwrap_or("");
                let body = render_text_content(content);
                blocks.push(format!("```{language}\n{body}\n```"));
            }
            RichNode::BulletList { content } => {
                blocks.push(render_list(content, |_| "- ".to_string()));
            }
            RichNode::OrderedList { content } => {
                blocks.push(render_list(content, |idx| format!("{}. ", idx + 1)));
            }
            RichNode::Blockquote { content } => {
                let inner = from_rich_document(content).replace("\n\n", " ");
                blocks.push(format!("> {inner}"));
            }
            RichNode::Rule => blocks.push("---".to_string()),
            // A bare text run outside a block container.
            RichNode::Text { .. } => {
                let text = render_text_content(std::slice::from_ref(node));
                if !text.is_empty() {
                    blocks.push(text);
                }
            }
            RichNode::ListItem { content } => {
                blocks.push(format!("- {}", list_item_text(content)));
            }
        }
    }
    blocks.join("\n\n")
}

fn render_list(items: &[RichNode], marker: impl Fn(usize) -> String) -> String {
    let mut lines = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        if let RichNode::ListItem { content } = item {
            lines.push(format!("{}{}", marker(idx), list_item_text(content)));
        }
    }
    lines.join("\n")
}

/// First paragraph of a list item; anything nested deeper is dropped.
fn list_item_text(content: &[RichNode]) -> String {
    for child in content {
        if let RichNode::Paragraph { content } = child {
            return render_text_content(content);
        }
    }
    render_text_content(content)
}

/// Concatenate text runs, re-applying their marks as markdown delimiters.
fn render_text_content(nodes: &[RichNode]) -> String {
    let inline: Vec<InlineNode> = nodes
        .iter()
        .filter_map(|node| {
            let RichNode::Text { text, marks } = node else {
                return None;
            };
            Some(match marks.first() {
                None => InlineNode::Text(text.clone()),
                Some(Mark::Strong) => InlineNode::Strong(text.clone()),
                Some(Mark::Em) => InlineNode::Em(text.clone()),
                Some(Mark::Code) => InlineNode::Code(text.clone()),
                Some(Mark::Strike) => InlineNode::Strike(text.clone()),
                Some(Mark::Link { attrs }) => InlineNode::Link {
                    text: text.clone(),
                    href: attrs.href.clone(),
                },
            })
        })
        .collect();
    render_inline(&inline)
}

/// Tolerant edge conversion from an inbound document JSON value.
///
/// Accepts either a `{type:"doc", content:[...]}` wrapper or a bare node
/// array. Unknown node types and malformed nodes are dropped, never an
/// error: a pull must not fail because the remote document contains
/// something this subset does not model.
pub fn nodes_from_json(value: &Value) -> Vec<RichNode> {
    let content = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => value
            .get("content")
            .and_then(Value::as_array)
            .map(|v| v.as_slice())
            .unwrap_or(&[]),
        _ => &[],
    };
    content.iter().filter_map(node_from_json).collect()
}

fn node_from_json(value: &Value) -> Option<RichNode> {
    let node_type = value.get("type")?.as_str()?;
    let children = || {
        value
            .get("content")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(node_from_json).collect())
            .unwrap_or_default()
    };

    match node_type {
        "heading" => {
            let level = value
                .pointer("/attrs/level")
                .and_then(Value::as_u64)
                .unwrap_or(1)
                .clamp(1, 6) as u8;
            Some(RichNode::Heading {
                attrs: HeadingAttrs { level },
                content: children(),
            })
        }
        "paragraph" => Some(RichNode::Paragraph {
            content: children(),
        }),
        "codeBlock" => {
            let language = value
                .pointer("/attrs/language")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(RichNode::CodeBlock {
                attrs: Some(CodeBlockAttrs { language }),
                content: children(),
            })
        }
        "bulletList" => Some(RichNode::BulletList {
            content: children(),
        }),
        "orderedList" => Some(RichNode::OrderedList {
            content: children(),
        }),
        "listItem" => Some(RichNode::ListItem {
            content: children(),
        }),
        "blockquote" => Some(RichNode::Blockquote {
            content: children(),
        }),
        "rule" => Some(RichNode::Rule),
        "text" => {
            let text = value.get("text")?.as_str()?.to_string();
            let marks = value
                .get("marks")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(mark_from_json).collect())
                .unwrap_or_default();
            Some(RichNode::Text { text, marks })
        }
        _ => None,
    }
}

fn mark_from_json(value: &Value) -> Option<Mark> {
    match value.get("type")?.as_str()? {
        "strong" => Some(Mark::Strong),
        "em" => Some(Mark::Em),
        "code" => Some(Mark::Code),
        "strike" => Some(Mark::Strike),
        "link" => {
            let href = value
                .pointer("/attrs/href")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            Some(Mark::Link {
                attrs: LinkAttrs { href },
            })
        }
        _ => None,
    }
}
