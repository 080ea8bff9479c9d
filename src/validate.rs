//! Page schema validation.
//!
//! The authoritative page schema lives with the target CMS; callers that have
//! it plug it in through [`SchemaValidator`]. [`BuiltinValidator`] checks the
//! block structure this crate produces: known block types, required fields,
//! non-empty content, the node types prose may hold, heading levels and card
//! fields.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::options::Options;

/// Outcome of validating a page document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl Validation {
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a serialized page document against the page schema.
pub trait SchemaValidator {
    fn validate(&self, page: &Value) -> Validation;
}

/// Structural checks of the page document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinValidator {
    pub min_heading_level: u8,
    pub max_heading_level: u8,
}

impl Default for BuiltinValidator {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

/// Node types a prose block may hold at its top level.
const PROSE_TOP_LEVEL: &[&str] = &[
    "paragraph", "heading", "orderedList", "unorderedList", "table", "divider",
];

/// Node types allowed anywhere below the top level of prose.
const PROSE_NESTED: &[&str] = &[
    "paragraph", "heading", "orderedList", "unorderedList", "listItem", "table",
    "tableRow", "tableHeader", "tableCell", "text", "hardBreak", "divider",
];

impl BuiltinValidator {
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            min_heading_level: options.min_heading_level,
            max_heading_level: options.max_heading_level,
        }
    }

    fn check_block(&self, block: &Value, path: &str, errors: &mut Vec<String>) {
        let Some(obj) = block.as_object() else {
            errors.push(format!("{path}: block must be an object"));
            return;
        };
        let kind = obj.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "prose" => self.check_prose(obj.get("content"), path, errors),
            "image" => {
                require_str(obj, "src", path, errors);
                require_str(obj, "alt", path, errors);
            }
            "video" | "map" => {
                require_present_str(obj, "title", path, errors);
                require_str(obj, "url", path, errors);
            }
            "infobar" => {
                require_str(obj, "title", path, errors);
                require_str(obj, "buttonLabel", path, errors);
                require_str(obj, "buttonUrl", path, errors);
            }
            "contentpic" => {
                require_str(obj, "src", path, errors);
                require_str(obj, "alt", path, errors);
                self.check_prose(obj.get("content"), path, errors);
            }
            "cards" | "infocards" => check_cards(obj, kind == "cards", path, errors),
            "iframe" => {
                require_present_str(obj, "title", path, errors);
                let content = obj.get("content").and_then(Value::as_str).unwrap_or_default();
                if !content.trim_start().starts_with("<iframe") {
                    errors.push(format!("{path}.content: must be <iframe> markup"));
                }
            }
            "" => errors.push(format!("{path}.type: missing")),
            other => errors.push(format!("{path}.type: unknown block type {other:?}")),
        }
    }

    fn check_prose(&self, content: Option<&Value>, path: &str, errors: &mut Vec<String>) {
        let Some(nodes) = content.and_then(Value::as_array) else {
            errors.push(format!("{path}.content: required array"));
            return;
        };
        if nodes.is_empty() {
            errors.push(format!("{path}.content: must not be empty"));
        }
        for (i, node) in nodes.iter().enumerate() {
            self.check_node(node, &format!("{path}.content[{i}]"), PROSE_TOP_LEVEL, errors);
        }
    }

    fn check_node(&self, node: &Value, path: &str, allowed: &[&str], errors: &mut Vec<String>) {
        let kind = node.get("type").and_then(Value::as_str).unwrap_or_default();
        if !allowed.contains(&kind) {
            errors.push(format!("{path}.type: {kind:?} not allowed here"));
            return;
        }
        if kind == "heading" {
            let level = node
                .pointer("/attrs/level")
                .and_then(Value::as_u64)
                .unwrap_or_default();
            if level < u64::from(self.min_heading_level) || level > u64::from(self.max_heading_level) {
                errors.push(format!("{path}.attrs.level: {level} out of range"));
            }
        }
        if kind == "text" && node.get("text").and_then(Value::as_str).is_none_or(str::is_empty) {
            errors.push(format!("{path}.text: must not be empty"));
        }
        if let Some(children) = node.get("content").and_then(Value::as_array) {
            for (i, child) in children.iter().enumerate() {
                self.check_node(child, &format!("{path}.content[{i}]"), PROSE_NESTED, errors);
            }
        }
    }
}

impl SchemaValidator for BuiltinValidator {
    fn validate(&self, page: &Value) -> Validation {
        let mut errors = Vec::new();

        for field in ["version", "layout"] {
            if page.get(field).and_then(Value::as_str).is_none_or(str::is_empty) {
                errors.push(format!("{field}: required"));
            }
        }
        if page
            .pointer("/page/title")
            .and_then(Value::as_str)
            .is_none_or(|t| t.trim().is_empty())
        {
            errors.push("page.title: required".to_string());
        }
        match page.pointer("/page/permalink").and_then(Value::as_str) {
            Some(p) if p.starts_with('/') => {}
            _ => errors.push("page.permalink: must start with '/'".to_string()),
        }

        match page.get("content").and_then(Value::as_array) {
            Some(blocks) => {
                for (i, block) in blocks.iter().enumerate() {
                    self.check_block(block, &format!("content[{i}]"), &mut errors);
                }
            }
            None => errors.push("content: required array".to_string()),
        }

        Validation::from_errors(errors)
    }
}

fn require_str(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    if obj.get(field).and_then(Value::as_str).is_none_or(|s| s.trim().is_empty()) {
        errors.push(format!("{path}.{field}: required"));
    }
}

/// The field must be a string, possibly empty.
fn require_present_str(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    if obj.get(field).and_then(Value::as_str).is_none() {
        errors.push(format!("{path}.{field}: required"));
    }
}

fn check_cards(obj: &Map<String, Value>, with_images: bool, path: &str, errors: &mut Vec<String>) {
    let Some(cards) = obj.get("cards").and_then(Value::as_array) else {
        errors.push(format!("{path}.cards: required array"));
        return;
    };
    if cards.is_empty() {
        errors.push(format!("{path}.cards: must not be empty"));
    }
    for (i, card) in cards.iter().enumerate() {
        let card_path = format!("{path}.cards[{i}]");
        let Some(card) = card.as_object() else {
            errors.push(format!("{card_path}: card must be an object"));
            continue;
        };
        require_str(card, "title", &card_path, errors);
        if with_images {
            require_str(card, "image", &card_path, errors);
        } else if card.contains_key("image") {
            errors.push(format!("{card_path}.image: not allowed in infocards"));
        }
    }
}
