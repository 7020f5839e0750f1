//! Protocol response parsing
//!
//! The query tool dumps every matching entity as a block of attribute lines:
//!
//! ```text
//! I: ---------------------------
//! I: Find Response: 1 (Pending)
//! I: (0008,0020) DA [20230101]                              #   8, 1 StudyDate
//! I: (0020,000d) UI [1.2.840.113619.2.55.3]                 #  22, 1 StudyInstanceUID
//! ```
//!
//! Everything before the first separator is the echo of the request and is
//! discarded. Each remaining block becomes one [`AttributeRecord`].

pub mod study;

pub use study::{FieldError, StudySummary};

use crate::domain::tag::DicomTag;
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;

static BLOCK_SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"I: *-+[\r\n]+I: Find Response:.*").expect("block separator pattern is valid")
});

static ATTRIBUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([0-9A-Fa-f]{4},[0-9A-Fa-f]{4})\)\s+\w{2}\s+\[([^\]]*)\]")
        .expect("attribute pattern is valid")
});

static PENDING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^.*Response.*\(Pending\).*$").expect("pending pattern is valid")
});

/// Attributes of one matched entity, in the order they were printed
///
/// Keys are normalized tags, so lookups do not depend on whether the tool
/// printed hex digits in upper or lower case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    attributes: IndexMap<DicomTag, String>,
}

impl AttributeRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. A repeated tag keeps its first position.
    pub fn insert(&mut self, tag: DicomTag, value: impl Into<String>) {
        self.attributes.insert(tag, value.into());
    }

    /// Value of a tag, if present
    pub fn get(&self, tag: &DicomTag) -> Option<&str> {
        self.attributes.get(tag).map(String::as_str)
    }

    /// Value of a tag given as text, e.g. `"0020,000d"`
    pub fn get_str(&self, tag: &str) -> Option<&str> {
        tag.parse::<DicomTag>().ok().and_then(|t| self.get(&t))
    }

    /// The entity identifier (Study Instance UID), if present and non-empty
    pub fn entity_identifier(&self) -> Option<&str> {
        self.get(&DicomTag::STUDY_INSTANCE_UID)
            .filter(|value| !value.is_empty())
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the block contained no attribute lines
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate attributes in print order
    pub fn iter(&self) -> impl Iterator<Item = (&DicomTag, &str)> {
        self.attributes.iter().map(|(tag, value)| (tag, value.as_str()))
    }
}

impl FromIterator<(DicomTag, String)> for AttributeRecord {
    fn from_iter<I: IntoIterator<Item = (DicomTag, String)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}

/// Parse raw query output into one record per response block
///
/// Never fails: text without any response block yields an empty sequence and
/// a block without attribute lines yields an empty record.
pub fn parse_responses(raw_text: &str) -> Vec<AttributeRecord> {
    BLOCK_SEPARATOR_RE
        .split(raw_text)
        .skip(1)
        .map(parse_block)
        .collect()
}

fn parse_block(block: &str) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    for captures in ATTRIBUTE_RE.captures_iter(block) {
        let (Some(tag), Some(value)) = (captures.get(1), captures.get(2)) else {
            continue;
        };
        // The pattern only admits 4,4 hex digits, so this cannot fail
        if let Ok(tag) = tag.as_str().parse::<DicomTag>() {
            let value = value
                .as_str()
                .trim_matches(|c: char| c.is_whitespace() || c == '\0');
            record.insert(tag, value);
        }
    }
    record
}

/// Count the pending responses reported in transfer output
///
/// Each sub-operation progress report of a transfer is printed as a
/// `... Response ... (Pending)` line; the final response is not counted.
pub fn count_pending_responses(raw_text: &str) -> usize {
    PENDING_RE.find_iter(raw_text).count()
}
