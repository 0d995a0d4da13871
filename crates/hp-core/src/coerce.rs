use serde::{Deserialize, Serialize};

use crate::error::HoneyPotError;
use crate::path::Path;
use crate::value::{HpValue, LeafType};

/// Source syntax of the environment behind the evaluation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    #[default]
    JavaScript,
    Rhai,
}

impl Dialect {
    fn quote_char(self) -> char {
        match self {
            Self::JavaScript => '\'',
            Self::Rhai => '"',
        }
    }

    pub fn null_literal(self) -> &'static str {
        match self {
            Self::JavaScript => "null",
            Self::Rhai => "()",
        }
    }

    /// Quoted string literal that evaluates back to `text` exactly.
    pub fn quote(self, text: &str) -> String {
        let quote = self.quote_char();
        let mut out = String::with_capacity(text.len() + 2);
        out.push(quote);
        for ch in text.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                ch if ch == quote => {
                    out.push('\\');
                    out.push(ch);
                }
                ch => out.push(ch),
            }
        }
        out.push(quote);
        out
    }

    /// `['a']['0']` for JavaScript. Rhai indexes arrays with a bare integer
    /// and object maps with a string, so each segment follows its step.
    /// Segments past the end of `steps` are treated as keys.
    pub fn index_chain(self, path: &Path, steps: &[Step]) -> String {
        path.segments()
            .enumerate()
            .map(|(at, segment)| {
                let step = steps.get(at).copied().unwrap_or(Step::Key);
                match self {
                    Self::Rhai if step == Step::Index && is_index_segment(segment) => {
                        format!("[{}]", segment)
                    }
                    _ => format!("[{}]", self.quote(segment)),
                }
            })
            .collect()
    }

    pub fn access(self, root_expression: &str, path: &Path, steps: &[Step]) -> String {
        format!("{}{}", root_expression, self.index_chain(path, steps))
    }

    pub fn assignment(
        self,
        root_expression: &str,
        path: &Path,
        steps: &[Step],
        literal: &str,
    ) -> String {
        format!("{} = {};", self.access(root_expression, path, steps), literal)
    }

    /// Wraps a discovery probe so a missing global yields null instead of an error.
    pub fn guard(self, expression: &str) -> String {
        match self {
            Self::JavaScript => format!("try{{{}}}catch(e){{null}}", expression),
            Self::Rhai => expression.to_string(),
        }
    }
}

/// How one path segment reaches into its parent container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Key,
    Index,
}

fn is_index_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|ch| ch.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Numeric,
    Check,
    Text,
}

impl EditorKind {
    pub fn input_type(self) -> &'static str {
        match self {
            Self::Numeric => "number",
            Self::Check => "checkbox",
            Self::Text => "text",
        }
    }
}

pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

/// Plain text form of any value, the way the runtime would stringify it.
pub fn display_text(value: &HpValue) -> String {
    match value {
        HpValue::Null => "null".to_string(),
        HpValue::Bool(value) => value.to_string(),
        HpValue::Number(value) => format_number(*value),
        HpValue::Integer(value) => value.to_string(),
        HpValue::String(value) => value.clone(),
        HpValue::Array(items) => items
            .iter()
            .map(display_text)
            .collect::<Vec<_>>()
            .join(","),
        HpValue::Map(_) => "[object Object]".to_string(),
        HpValue::Opaque(name) => format!("({})", name),
    }
}

fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}

/// Base-10 integer, narrowing decimal text toward zero.
fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| value.trunc() as i64)
}

fn as_integer(value: &HpValue) -> Option<i64> {
    match value {
        HpValue::Integer(value) => Some(*value),
        HpValue::Number(value) if value.is_finite() => Some(value.trunc() as i64),
        HpValue::String(text) => parse_integer(text),
        _ => None,
    }
}

fn as_number(value: &HpValue) -> Option<f64> {
    match value {
        HpValue::Number(value) => Some(*value),
        HpValue::Integer(value) => Some(*value as f64),
        HpValue::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn invalid_text(leaf_type: LeafType, text: &str) -> HoneyPotError {
    HoneyPotError::new(
        "COERCE_INVALID_TEXT",
        format!("\"{}\" is not a valid {} value.", text, leaf_type.as_str()),
    )
}

impl LeafType {
    pub fn editor_kind(self) -> EditorKind {
        match self {
            Self::Integer64 | Self::Number => EditorKind::Numeric,
            Self::Boolean => EditorKind::Check,
            Self::String => EditorKind::Text,
        }
    }

    pub fn to_editor_text(self, value: &HpValue) -> String {
        match self {
            Self::Boolean => parse_bool(&display_text(value)).to_string(),
            Self::Integer64 | Self::Number | Self::String => display_text(value),
        }
    }

    pub fn from_editor_text(self, text: &str) -> Result<HpValue, HoneyPotError> {
        match self {
            Self::Integer64 => parse_integer(text)
                .map(HpValue::Integer)
                .ok_or_else(|| invalid_text(self, text)),
            Self::Number => text
                .trim()
                .parse::<f64>()
                .map(HpValue::Number)
                .map_err(|_| invalid_text(self, text)),
            Self::Boolean => Ok(HpValue::Bool(parse_bool(text))),
            Self::String => Ok(HpValue::String(text.to_string())),
        }
    }

    /// Literal safe to splice into an assignment expression for `dialect`.
    pub fn to_source_literal(
        self,
        dialect: Dialect,
        value: &HpValue,
    ) -> Result<String, HoneyPotError> {
        if value.is_null() {
            return Ok(dialect.null_literal().to_string());
        }
        match self {
            Self::Integer64 => as_integer(value)
                .map(|value| value.to_string())
                .ok_or_else(|| invalid_text(self, &display_text(value))),
            Self::Number => {
                let number =
                    as_number(value).ok_or_else(|| invalid_text(self, &display_text(value)))?;
                if number.is_finite() {
                    let mut literal = number.to_string();
                    if !literal.contains('.') {
                        literal.push_str(".0");
                    }
                    return Ok(literal);
                }
                match dialect {
                    Dialect::JavaScript => Ok(format_number(number)),
                    Dialect::Rhai => Err(HoneyPotError::new(
                        "COERCE_NON_FINITE",
                        format!("{} has no rhai literal form.", format_number(number)),
                    )),
                }
            }
            Self::Boolean => Ok(match value {
                HpValue::Bool(value) => value.to_string(),
                other => parse_bool(&display_text(other)).to_string(),
            }),
            Self::String => Ok(dialect.quote(&display_text(value))),
        }
    }

    pub fn to_boolean_view(self, value: &HpValue) -> bool {
        match self {
            Self::Integer64 => as_integer(value) == Some(0),
            Self::Number => as_number(value) == Some(0.0),
            Self::Boolean => match value {
                HpValue::Bool(value) => *value,
                other => parse_bool(&display_text(other)),
            },
            Self::String => {
                let text = display_text(value);
                text == "true" || text == "1"
            }
        }
    }

    /// Aligns an observed scalar with this category's stored form, so hosts
    /// that separate ints from floats do not look like they changed.
    pub fn normalize(self, observed: HpValue) -> HpValue {
        match (self, observed) {
            (Self::Number, HpValue::Integer(value)) => HpValue::Number(value as f64),
            (Self::Integer64, HpValue::Number(value))
                if value.is_finite() && value.fract() == 0.0 =>
            {
                HpValue::Integer(value as i64)
            }
            (_, observed) => observed,
        }
    }
}
