use serde::{Deserialize, Serialize};

use crate::types::{AlignmentPoint, MatchType};

pub const PRODUCTION_READY_SCORE: f64 = 0.95;
pub const MINOR_EDITS_SCORE: f64 = 0.85;
pub const REVIEW_SCORE: f64 = 0.70;
/// Reference words shown on each side of an error.
pub const ERROR_CONTEXT_WORDS: usize = 5;

const SCORE_EPSILON: f64 = 1e-9;

/// `value >= threshold`, tolerant of accumulated float error.
pub(crate) fn meets(value: f64, threshold: f64) -> bool {
    value + SCORE_EPSILON >= threshold
}

/// Per-point contribution to a segment score.
pub fn point_score(match_type: MatchType) -> f64 {
    match match_type {
        MatchType::Exact => 1.0,
        MatchType::Normalized => 0.95,
        MatchType::Phonetic => 0.8,
        MatchType::Mismatch | MatchType::Missing | MatchType::Extra => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    ProductionReady,
    NeedsMinorEdits,
    NeedsReview,
    NeedsRerecording,
}

impl SegmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductionReady => "production_ready",
            Self::NeedsMinorEdits => "needs_minor_edits",
            Self::NeedsReview => "needs_review",
            Self::NeedsRerecording => "needs_rerecording",
        }
    }
}

/// Missing content always rules out `production_ready`.
pub fn classify_segment(quality_score: f64, missing_words: usize) -> SegmentStatus {
    if missing_words == 0 && meets(quality_score, PRODUCTION_READY_SCORE) {
        SegmentStatus::ProductionReady
    } else if meets(quality_score, MINOR_EDITS_SCORE) {
        SegmentStatus::NeedsMinorEdits
    } else if meets(quality_score, REVIEW_SCORE) {
        SegmentStatus::NeedsReview
    } else {
        SegmentStatus::NeedsRerecording
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    pub exact: usize,
    pub normalized: usize,
    pub phonetic: usize,
    pub mismatch: usize,
    pub missing: usize,
    pub extra: usize,
}

impl MatchCounts {
    pub fn from_points(points: &[AlignmentPoint]) -> Self {
        let mut counts = Self::default();
        for point in points {
            counts.add(point.match_type);
        }
        counts
    }

    pub fn add(&mut self, match_type: MatchType) {
        match match_type {
            MatchType::Exact => self.exact += 1,
            MatchType::Normalized => self.normalized += 1,
            MatchType::Phonetic => self.phonetic += 1,
            MatchType::Mismatch => self.mismatch += 1,
            MatchType::Missing => self.missing += 1,
            MatchType::Extra => self.extra += 1,
        }
    }

    pub fn matched(&self) -> usize {
        self.exact + self.normalized + self.phonetic
    }

    pub fn errors(&self) -> usize {
        self.mismatch + self.missing + self.extra
    }

    pub fn total(&self) -> usize {
        self.matched() + self.errors()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    #[serde(flatten)]
    pub counts: MatchCounts,
    pub reference_words: usize,
    pub transcript_words: usize,
    /// Matched share of the segment's reference words.
    pub accuracy: f64,
}

/// One non-matching alignment point, with surrounding reference text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub error_type: MatchType,
    pub reference_word: Option<String>,
    pub transcript_word: Option<String>,
    pub reference_index: Option<usize>,
    pub transcript_index: Option<usize>,
    pub timestamp: Option<f64>,
    pub context_before: String,
    pub context_after: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySegment {
    pub segment_id: usize,
    /// Half-open range of alignment points in the segment.
    pub point_start: usize,
    pub point_end: usize,
    pub reference_start_index: Option<usize>,
    pub reference_end_index: Option<usize>,
    pub reference_text: String,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub quality_score: f64,
    pub status: SegmentStatus,
    pub metrics: SegmentMetrics,
    pub errors: Vec<ErrorDetail>,
}

/// Score consecutive chunks of `segment_size` alignment points.
pub fn score_segments(points: &[AlignmentPoint], segment_size: usize) -> Vec<QualitySegment> {
    let size = segment_size.max(1);
    let segments: Vec<QualitySegment> = points
        .chunks(size)
        .enumerate()
        .map(|(segment_id, chunk)| score_segment(points, segment_id, segment_id * size, chunk))
        .collect();
    tracing::debug!(segments = segments.len(), segment_size = size, "quality: segments scored");
    segments
}

fn score_segment(
    points: &[AlignmentPoint],
    segment_id: usize,
    point_start: usize,
    chunk: &[AlignmentPoint],
) -> QualitySegment {
    let counts = MatchCounts::from_points(chunk);
    let total: f64 = chunk.iter().map(|point| point_score(point.match_type)).sum();
    let quality_score = total / chunk.len() as f64;

    let reference_words: Vec<&str> = chunk
        .iter()
        .filter_map(|point| point.reference_word.as_deref())
        .collect();
    let transcript_words = chunk.iter().filter(|point| point.has_transcript()).count();
    let accuracy = if reference_words.is_empty() {
        0.0
    } else {
        counts.matched() as f64 / reference_words.len() as f64
    };

    let times = chunk
        .iter()
        .filter(|point| point.has_transcript())
        .filter_map(|point| point.timestamp);
    let (start_time, end_time) = times.fold((None, None), |(lo, hi): (Option<f64>, Option<f64>), t| {
        (
            Some(lo.map_or(t, |lo| lo.min(t))),
            Some(hi.map_or(t, |hi| hi.max(t))),
        )
    });

    let errors = chunk
        .iter()
        .enumerate()
        .filter(|(_, point)| point.match_type.is_error())
        .map(|(offset, point)| error_detail(points, point_start + offset, point))
        .collect();

    QualitySegment {
        segment_id,
        point_start,
        point_end: point_start + chunk.len(),
        reference_start_index: chunk.iter().find_map(|point| point.reference_index),
        reference_end_index: chunk.iter().rev().find_map(|point| point.reference_index),
        reference_text: reference_words.join(" "),
        start_time,
        end_time,
        quality_score,
        status: classify_segment(quality_score, counts.missing),
        metrics: SegmentMetrics {
            counts,
            reference_words: reference_words.len(),
            transcript_words,
            accuracy,
        },
        errors,
    }
}

fn error_detail(points: &[AlignmentPoint], position: usize, point: &AlignmentPoint) -> ErrorDetail {
    let mut before: Vec<&str> = points[..position]
        .iter()
        .rev()
        .filter_map(|p| p.reference_word.as_deref())
        .take(ERROR_CONTEXT_WORDS)
        .collect();
    before.reverse();
    let after: Vec<&str> = points[position + 1..]
        .iter()
        .filter_map(|p| p.reference_word.as_deref())
        .take(ERROR_CONTEXT_WORDS)
        .collect();

    ErrorDetail {
        error_type: point.match_type,
        reference_word: point.reference_word.clone(),
        transcript_word: point.transcript_word.clone(),
        reference_index: point.reference_index,
        transcript_index: point.transcript_index,
        timestamp: point.timestamp,
        context_before: before.join(" "),
        context_after: after.join(" "),
    }
}
