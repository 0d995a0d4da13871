use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root-relative address of one value, e.g. `.player.stats.hp`.
///
/// The root itself is the empty path. Segments are kept exactly as the
/// external structure spells them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(String);

impl Path {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Accepts `.a.b`, `a.b` or `a.b.`; empty segments are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut out = String::new();
        for segment in raw.split('.').map(str::trim).filter(|s| !s.is_empty()) {
            out.push('.');
            out.push_str(segment);
        }
        Self(out)
    }

    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self(format!("{}.{}", self.0, segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').skip(1)
    }

    pub fn last_segment(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit('.').next()
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Renderer-facing identifier: lowercase, every `.` turned into `-`.
    pub fn identifier(&self) -> String {
        self.0.replace('.', "-").to_lowercase()
    }

    pub fn row_id(&self) -> String {
        format!("path-{}", self.identifier())
    }

    pub fn container_id(&self) -> String {
        format!("object-{}", self.identifier())
    }

    pub fn lock_id(&self) -> String {
        format!("lock_{}", self.row_id())
    }

    pub fn tooltip(&self) -> String {
        self.segments()
            .map(humanize_segment)
            .collect::<Vec<_>>()
            .join(": ")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn camel_boundary() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[A-Z]").expect("camel case regex must compile"))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn split_camel(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut last = 0usize;
    for found in camel_boundary().find_iter(word) {
        if found.start() == 0 {
            continue;
        }
        out.push_str(&word[last..found.start()]);
        out.push(' ');
        last = found.start();
    }
    out.push_str(&word[last..]);
    out
}

/// Display label for an object key: `max_hp` -> `Max Hp`, `goldCoins` -> `Gold Coins`.
pub fn humanize_label(key: &str) -> String {
    key.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| split_camel(&capitalize(part)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn humanize_segment(segment: &str) -> String {
    split_camel(&capitalize(segment)).replace('_', " ")
}
