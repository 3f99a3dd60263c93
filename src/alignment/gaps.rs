use serde::{Deserialize, Serialize};

use crate::alignment::timecode::{estimated_read_seconds, format_duration, format_timestamp};
use crate::types::{AlignmentPoint, MatchType};

/// A run of consecutive reference words the narrator never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSection {
    pub reference_start_index: usize,
    pub reference_end_index: usize,
    pub text: String,
    pub word_count: usize,
    pub context_before: String,
    pub context_after: String,
    pub estimated_duration_seconds: f64,
    /// `MM:SS` read time at the configured pace.
    pub estimated_duration: String,
    /// Where the gap falls in the recording, from the nearest timed words.
    pub timestamp_context: Option<String>,
}

/// Collect maximal runs of `missing` points of at least `min_gap_words`.
pub fn find_missing_sections(
    points: &[AlignmentPoint],
    min_gap_words: usize,
    context_words: usize,
    words_per_minute: f64,
) -> Vec<MissingSection> {
    let mut sections = Vec::new();
    let mut run_start: Option<usize> = None;

    for (position, point) in points.iter().enumerate() {
        if point.match_type == MatchType::Missing {
            run_start.get_or_insert(position);
        } else if let Some(start) = run_start.take() {
            if position - start >= min_gap_words {
                sections.push(build_section(points, start, position, context_words, words_per_minute));
            }
        }
    }
    if let Some(start) = run_start {
        if points.len() - start >= min_gap_words {
            sections.push(build_section(points, start, points.len(), context_words, words_per_minute));
        }
    }

    tracing::debug!(sections = sections.len(), "gaps: missing sections collected");
    sections
}

fn build_section(
    points: &[AlignmentPoint],
    start: usize,
    end: usize,
    context_words: usize,
    words_per_minute: f64,
) -> MissingSection {
    let run = &points[start..end];
    let text = run
        .iter()
        .filter_map(|point| point.reference_word.as_deref())
        .collect::<Vec<_>>()
        .join(" ");
    let word_count = run.len();
    let reference_start_index = run
        .first()
        .and_then(|point| point.reference_index)
        .unwrap_or_default();
    let reference_end_index = run
        .last()
        .and_then(|point| point.reference_index)
        .unwrap_or(reference_start_index);

    let mut before: Vec<&str> = points[..start]
        .iter()
        .rev()
        .filter_map(|point| point.reference_word.as_deref())
        .take(context_words)
        .collect();
    before.reverse();
    let after: Vec<&str> = points[end..]
        .iter()
        .filter_map(|point| point.reference_word.as_deref())
        .take(context_words)
        .collect();

    let estimated_duration_seconds = estimated_read_seconds(word_count, words_per_minute);

    MissingSection {
        reference_start_index,
        reference_end_index,
        text,
        word_count,
        context_before: before.join(" "),
        context_after: after.join(" "),
        estimated_duration_seconds,
        estimated_duration: format_duration(estimated_duration_seconds),
        timestamp_context: timestamp_context(points, start, end),
    }
}

/// Timestamps of the transcript words adjacent to the run, if they carry any.
fn timestamp_context(points: &[AlignmentPoint], start: usize, end: usize) -> Option<String> {
    let before = points[..start]
        .iter()
        .rev()
        .find(|point| point.has_transcript())
        .and_then(|point| point.timestamp);
    let after = points[end..]
        .iter()
        .find(|point| point.has_transcript())
        .and_then(|point| point.timestamp);
    match (before, after) {
        (Some(before), Some(after)) => Some(format!(
            "After {}, before {}",
            format_timestamp(before),
            format_timestamp(after)
        )),
        (Some(before), None) => Some(format!("After {}", format_timestamp(before))),
        (None, Some(after)) => Some(format!("Before {}", format_timestamp(after))),
        (None, None) => None,
    }
}
