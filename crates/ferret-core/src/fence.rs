//! Fenced code block detection.
//!
//! Text is split on triple backticks; even-indexed parts are prose and
//! odd-indexed parts are code. An unbalanced fence is not repaired: whatever
//! follows the last opening fence is treated as code.

use regex::Regex;
use std::sync::OnceLock;

pub const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    Code {
        language: Option<String>,
        code: String,
    },
}

impl Segment {
    pub fn is_code(&self) -> bool {
        matches!(self, Segment::Code { .. })
    }
}

fn language_tag() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("static regex"))
}

/// Split `text` into prose and code segments
pub fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();

    for (i, part) in text.split(FENCE).enumerate() {
        if i % 2 == 0 {
            if !part.is_empty() {
                out.push(Segment::Plain(part.to_string()));
            }
        } else {
            out.push(code_segment(part));
        }
    }

    out
}

fn code_segment(part: &str) -> Segment {
    let mut lines: Vec<&str> = part.split('\n').collect();

    let language = match lines.first() {
        Some(first) if language_tag().is_match(first) => {
            let tag = first.to_string();
            lines.remove(0);
            Some(tag)
        }
        _ => None,
    };

    let mut code = lines.join("\n");
    // newline that sat in front of the closing fence
    if code.ends_with('\n') {
        code.pop();
    }

    Segment::Code { language, code }
}

/// Code contents only, in order of appearance
pub fn code_blocks(text: &str) -> Vec<String> {
    segments(text)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Code { code, .. } => Some(code),
            Segment::Plain(_) => None,
        })
        .collect()
}
