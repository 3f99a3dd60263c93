use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alignment::gaps::MissingSection;
use crate::alignment::localization::{AlignmentOutcome, Localization};
use crate::alignment::quality::{
    meets, MatchCounts, QualitySegment, SegmentStatus, MINOR_EDITS_SCORE, PRODUCTION_READY_SCORE,
};
use crate::alignment::repetition::{Occurrence, Repetition};
use crate::alignment::timecode::{estimated_read_seconds, format_duration, format_timestamp};
use crate::types::AlignmentPoint;

pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    #[serde(rename = "PRODUCTION READY")]
    ProductionReady,
    #[serde(rename = "NEEDS MINOR EDITING")]
    NeedsMinorEditing,
    #[serde(rename = "NEEDS SIGNIFICANT WORK")]
    NeedsSignificantWork,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductionReady => "PRODUCTION READY",
            Self::NeedsMinorEditing => "NEEDS MINOR EDITING",
            Self::NeedsSignificantWork => "NEEDS SIGNIFICANT WORK",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checklist tiers. Declaration order is urgency order, so `Ord` sorts the
/// most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistAction {
    Record,
    Rerecord,
    Delete,
    Review,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub priority: Priority,
    pub action: ChecklistAction,
    pub title: String,
    pub details: String,
    /// Position in the recording, `MM:SS` based.
    pub location: Option<String>,
    /// Text to record, re-record or cut.
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeTimestamp {
    /// 1-based take number in chronological order.
    pub take: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration_seconds: f64,
    pub timestamp: String,
    pub is_keeper: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionAnalysis {
    pub surface_text: String,
    pub length_in_words: usize,
    pub occurrence_count: usize,
    pub total_time_seconds: f64,
    /// Time spent on takes that will be cut.
    pub wasted_time_seconds: f64,
    pub wasted_time: String,
    pub occurrences: Vec<TakeTimestamp>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub production_ready: usize,
    pub needs_minor_edits: usize,
    pub needs_review: usize,
    pub needs_rerecording: usize,
}

impl StatusCounts {
    pub fn from_segments(segments: &[QualitySegment]) -> Self {
        let mut counts = Self::default();
        for segment in segments {
            match segment.status {
                SegmentStatus::ProductionReady => counts.production_ready += 1,
                SegmentStatus::NeedsMinorEdits => counts.needs_minor_edits += 1,
                SegmentStatus::NeedsReview => counts.needs_review += 1,
                SegmentStatus::NeedsRerecording => counts.needs_rerecording += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub reference_word_count: usize,
    pub transcript_word_count: usize,
    pub final_transcript_word_count: usize,
    pub excluded_word_count: usize,
    pub aligned_reference_start: usize,
    pub aligned_reference_end: usize,
    pub dp_reference_words: usize,
    pub localization: Localization,
    pub alignment_point_count: usize,
    pub match_counts: MatchCounts,
    /// Matched share of aligned reference words.
    pub accuracy: f64,
    pub repetition_count: usize,
    pub wasted_time_seconds: f64,
    pub missing_section_count: usize,
    pub missing_word_count: usize,
    pub estimated_recording_seconds: f64,
    pub estimated_recording_time: String,
    pub segment_status_counts: StatusCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionReport {
    pub schema_version: u32,
    pub summary: ReportSummary,
    pub repetitions: Vec<RepetitionAnalysis>,
    pub quality_segments: Vec<QualitySegment>,
    pub missing_sections: Vec<MissingSection>,
    pub checklist: Vec<ChecklistItem>,
    pub overall_status: OverallStatus,
    pub overall_score: f64,
}

/// Everything the report is assembled from.
pub struct ReportInputs<'a> {
    pub reference_word_count: usize,
    pub transcript_word_count: usize,
    pub final_transcript_word_count: usize,
    pub excluded_word_count: usize,
    pub repetitions: &'a [Repetition],
    pub alignment: &'a AlignmentOutcome,
    pub quality_segments: Vec<QualitySegment>,
    pub missing_sections: Vec<MissingSection>,
    pub words_per_minute: f64,
}

pub fn generate_report(inputs: ReportInputs<'_>) -> ProductionReport {
    let overall_score = overall_score(&inputs.quality_segments);
    let overall_status =
        overall_status(overall_score, &inputs.quality_segments, &inputs.missing_sections);
    let repetitions: Vec<RepetitionAnalysis> =
        inputs.repetitions.iter().map(analyze_repetition).collect();
    // Nothing to compare against: one entry instead of a re-record per segment.
    let checklist = match unmatched_narration(&inputs.alignment.points) {
        Some(item) => vec![item],
        None => build_checklist(
            &inputs.missing_sections,
            &inputs.quality_segments,
            inputs.repetitions,
        ),
    };

    let points = &inputs.alignment.points;
    let match_counts = MatchCounts::from_points(points);
    let aligned_reference_words = points
        .iter()
        .filter(|point| point.reference_index.is_some())
        .count();
    let accuracy = if aligned_reference_words == 0 {
        0.0
    } else {
        match_counts.matched() as f64 / aligned_reference_words as f64
    };
    let missing_word_count: usize = inputs
        .missing_sections
        .iter()
        .map(|section| section.word_count)
        .sum();
    let estimated_recording_seconds =
        estimated_read_seconds(missing_word_count, inputs.words_per_minute);

    let summary = ReportSummary {
        reference_word_count: inputs.reference_word_count,
        transcript_word_count: inputs.transcript_word_count,
        final_transcript_word_count: inputs.final_transcript_word_count,
        excluded_word_count: inputs.excluded_word_count,
        aligned_reference_start: inputs.alignment.reference_start,
        aligned_reference_end: inputs.alignment.reference_end,
        dp_reference_words: inputs.alignment.dp_reference_words,
        localization: inputs.alignment.localization,
        alignment_point_count: points.len(),
        match_counts,
        accuracy,
        repetition_count: repetitions.len(),
        wasted_time_seconds: repetitions
            .iter()
            .map(|repetition| repetition.wasted_time_seconds)
            .sum(),
        missing_section_count: inputs.missing_sections.len(),
        missing_word_count,
        estimated_recording_seconds,
        estimated_recording_time: format_duration(estimated_recording_seconds),
        segment_status_counts: StatusCounts::from_segments(&inputs.quality_segments),
    };

    tracing::debug!(
        overall_score,
        overall_status = overall_status.as_str(),
        checklist_items = checklist.len(),
        "report: assembled"
    );

    ProductionReport {
        schema_version: REPORT_SCHEMA_VERSION,
        summary,
        repetitions,
        quality_segments: inputs.quality_segments,
        missing_sections: inputs.missing_sections,
        checklist,
        overall_status,
        overall_score,
    }
}

/// Mean segment score, `0.0` without segments.
pub fn overall_score(segments: &[QualitySegment]) -> f64 {
    if segments.is_empty() {
        return 0.0;
    }
    segments
        .iter()
        .map(|segment| segment.quality_score)
        .sum::<f64>()
        / segments.len() as f64
}

pub fn overall_status(
    overall_score: f64,
    segments: &[QualitySegment],
    missing_sections: &[MissingSection],
) -> OverallStatus {
    let counts = StatusCounts::from_segments(segments);
    // More than a fifth of the segments under review.
    let review_heavy = counts.needs_review * 5 > segments.len();
    if !missing_sections.is_empty() || counts.needs_rerecording > 0 || review_heavy {
        OverallStatus::NeedsSignificantWork
    } else if meets(overall_score, PRODUCTION_READY_SCORE) {
        OverallStatus::ProductionReady
    } else if meets(overall_score, MINOR_EDITS_SCORE) {
        OverallStatus::NeedsMinorEditing
    } else {
        OverallStatus::NeedsSignificantWork
    }
}

pub fn analyze_repetition(repetition: &Repetition) -> RepetitionAnalysis {
    let occurrences: Vec<TakeTimestamp> = repetition
        .occurrences
        .iter()
        .enumerate()
        .map(|(position, occurrence)| TakeTimestamp {
            take: position + 1,
            start_index: occurrence.start_index,
            end_index: occurrence.end_index,
            start_time: occurrence.start_time,
            end_time: occurrence.end_time,
            duration_seconds: occurrence.duration(),
            timestamp: format_timestamp(occurrence.start_time),
            is_keeper: occurrence.is_keeper,
        })
        .collect();
    let total_time_seconds = repetition.occurrences.iter().map(Occurrence::duration).sum();
    let wasted_time_seconds = repetition.non_keepers().map(Occurrence::duration).sum();

    RepetitionAnalysis {
        surface_text: repetition.surface_text.clone(),
        length_in_words: repetition.length_in_words,
        occurrence_count: repetition.occurrences.len(),
        total_time_seconds,
        wasted_time_seconds,
        wasted_time: format_duration(wasted_time_seconds),
        occurrences,
    }
}

/// Critical, high, medium and low items, each tier in input order.
pub fn build_checklist(
    missing_sections: &[MissingSection],
    segments: &[QualitySegment],
    repetitions: &[Repetition],
) -> Vec<ChecklistItem> {
    [
        critical_items(missing_sections),
        high_items(segments),
        medium_items(repetitions),
        low_items(segments),
    ]
    .concat()
}

/// Single delete item covering every transcript word, for an alignment with
/// no reference words at all. `None` otherwise.
pub fn unmatched_narration(points: &[AlignmentPoint]) -> Option<ChecklistItem> {
    if points.is_empty() || points.iter().any(|point| point.reference_index.is_some()) {
        return None;
    }
    let words: Vec<&str> = points
        .iter()
        .filter_map(|point| point.transcript_word.as_deref())
        .collect();
    let mut times = points.iter().filter_map(|point| point.timestamp);
    let location = times.next().map(|first| {
        let (start, end) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        time_span(start, end)
    });
    Some(ChecklistItem {
        priority: Priority::High,
        action: ChecklistAction::Delete,
        title: format!("Remove unmatched narration ({} words)", words.len()),
        details: "The reference has no words to align against; all narration is extra".to_string(),
        location,
        text: Some(words.join(" ")),
    })
}

fn critical_items(missing_sections: &[MissingSection]) -> Vec<ChecklistItem> {
    missing_sections
        .iter()
        .map(|section| ChecklistItem {
            priority: Priority::Critical,
            action: ChecklistAction::Record,
            title: format!(
                "Record missing content ({} words, ~{})",
                section.word_count, section.estimated_duration
            ),
            details: format!(
                "Reference words {}-{}. Context: ...{} [MISSING] {}...",
                section.reference_start_index,
                section.reference_end_index,
                section.context_before,
                section.context_after
            ),
            location: section.timestamp_context.clone(),
            text: Some(section.text.clone()),
        })
        .collect()
}

fn high_items(segments: &[QualitySegment]) -> Vec<ChecklistItem> {
    segments
        .iter()
        .filter(|segment| segment.status == SegmentStatus::NeedsRerecording)
        .map(|segment| ChecklistItem {
            priority: Priority::High,
            action: ChecklistAction::Rerecord,
            title: format!(
                "Re-record segment {} (quality {})",
                segment.segment_id,
                percent(segment.quality_score)
            ),
            details: error_breakdown(segment),
            location: segment_location(segment),
            text: Some(segment.reference_text.clone()),
        })
        .collect()
}

fn medium_items(repetitions: &[Repetition]) -> Vec<ChecklistItem> {
    let mut items = Vec::new();
    for repetition in repetitions {
        let takes = repetition.occurrences.len();
        let keeper = repetition.keeper();
        for (position, occurrence) in repetition.occurrences.iter().enumerate() {
            if occurrence.is_keeper {
                continue;
            }
            let keep_note = keeper
                .map(|keeper| {
                    format!(
                        "; keep take {takes} at {}",
                        format_timestamp(keeper.start_time)
                    )
                })
                .unwrap_or_default();
            items.push(ChecklistItem {
                priority: Priority::Medium,
                action: ChecklistAction::Delete,
                title: format!("Delete take {} of {}", position + 1, takes),
                details: format!(
                    "Repeated {}-word passage{keep_note}",
                    repetition.length_in_words
                ),
                location: occurrence_location(occurrence),
                text: Some(repetition.surface_text.clone()),
            });
        }
    }
    items
}

fn low_items(segments: &[QualitySegment]) -> Vec<ChecklistItem> {
    let review = segments
        .iter()
        .filter(|segment| segment.status == SegmentStatus::NeedsReview)
        .map(|segment| ChecklistItem {
            priority: Priority::Low,
            action: ChecklistAction::Review,
            title: format!(
                "Review segment {} (quality {})",
                segment.segment_id,
                percent(segment.quality_score)
            ),
            details: error_breakdown(segment),
            location: segment_location(segment),
            text: None,
        });
    let minor = segments
        .iter()
        .filter(|segment| {
            segment.status == SegmentStatus::NeedsMinorEdits && !segment.errors.is_empty()
        })
        .map(|segment| ChecklistItem {
            priority: Priority::Low,
            action: ChecklistAction::Edit,
            title: format!(
                "Touch up segment {} ({} issue(s))",
                segment.segment_id,
                segment.errors.len()
            ),
            details: error_breakdown(segment),
            location: segment_location(segment),
            text: None,
        });
    review.chain(minor).collect()
}

fn error_breakdown(segment: &QualitySegment) -> String {
    let counts = &segment.metrics.counts;
    format!(
        "{} mismatched, {} missing, {} extra",
        counts.mismatch, counts.missing, counts.extra
    )
}

fn segment_location(segment: &QualitySegment) -> Option<String> {
    match (segment.start_time, segment.end_time) {
        (Some(start), Some(end)) => Some(time_span(start, end)),
        _ => None,
    }
}

fn occurrence_location(occurrence: &Occurrence) -> Option<String> {
    (occurrence.start_time > 0.0 || occurrence.end_time > 0.0)
        .then(|| time_span(occurrence.start_time, occurrence.end_time))
}

fn time_span(start: f64, end: f64) -> String {
    format!("{} - {}", format_timestamp(start), format_timestamp(end))
}

fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}
