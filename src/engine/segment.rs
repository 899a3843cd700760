use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("invalid percent range {lower}-{upper}: need 0 <= lower < upper <= 100")]
    InvalidRange { lower: u8, upper: u8 },
}

/// A window into a question bank, in whole percent of its length.
/// The bank is ordered oldest first, so `0-20` is the oldest fifth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PercentRange {
    lower: u8,
    upper: u8,
}

impl PercentRange {
    pub const fn new(lower: u8, upper: u8) -> Result<Self, SegmentError> {
        if lower < upper && upper <= 100 {
            Ok(Self { lower, upper })
        } else {
            Err(SegmentError::InvalidRange { lower, upper })
        }
    }

    pub fn lower(&self) -> u8 {
        self.lower
    }

    pub fn upper(&self) -> u8 {
        self.upper
    }

    pub fn is_full(&self) -> bool {
        self.lower == 0 && self.upper == 100
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeSegment {
    pub key: &'static str,
    pub label: &'static str,
    pub range: Option<PercentRange>,
}

const fn segment(key: &'static str, label: &'static str, lower: u8, upper: u8) -> RangeSegment {
    let range = match PercentRange::new(lower, upper) {
        Ok(range) => range,
        Err(_) => panic!("segment table holds an invalid range"),
    };
    RangeSegment {
        key,
        label,
        range: Some(range),
    }
}

pub const DEFAULT_SEGMENT_KEY: &str = "all";

pub const SEGMENTS: &[RangeSegment] = &[
    RangeSegment {
        key: DEFAULT_SEGMENT_KEY,
        label: "全範囲から出題する",
        range: None,
    },
    segment("0-20", "問題セットの0-20%から出題", 0, 20),
    segment("20-40", "問題セットの20-40%から出題", 20, 40),
    segment("40-60", "問題セットの40-60%から出題", 40, 60),
    segment("60-80", "問題セットの60-80%から出題", 60, 80),
    segment("80-100", "問題セットの80-100%から出題", 80, 100),
];

pub fn default_segment() -> &'static RangeSegment {
    &SEGMENTS[0]
}

/// Look up a segment by key. Unknown or empty keys select the whole bank.
pub fn segment_for_key(key: &str) -> &'static RangeSegment {
    let key = key.trim().to_lowercase();
    SEGMENTS
        .iter()
        .find(|s| s.key == key)
        .unwrap_or_else(default_segment)
}

pub fn is_known_key(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    SEGMENTS.iter().any(|s| s.key == key)
}

pub fn segment_index(key: &str) -> usize {
    let seg = segment_for_key(key);
    SEGMENTS.iter().position(|s| s.key == seg.key).unwrap_or(0)
}
