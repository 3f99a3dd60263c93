use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::alignment::needleman_wunsch::{align_prepared, prepare_transcript};
use crate::alignment::normalize::{similarity, ComparableWord};
use crate::config::{AlignmentScoring, LocalizationConfig};
use crate::types::{AlignmentPoint, TimedWord};

/// Coarse candidates carried into the fine pass.
const REFINE_CANDIDATES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalizedWindow {
    /// Reference word index where the transcript is estimated to begin.
    pub start: usize,
    /// Mean positional similarity of the probe at `start`.
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Localization {
    /// Reference and transcript are of comparable size.
    NotNeeded,
    Located(LocalizedWindow),
    /// No window scored high enough; the full reference was aligned.
    Missed { best_score: Option<f64> },
}

/// Result of aligning a transcript against a (possibly windowed) reference.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutcome {
    pub points: Vec<AlignmentPoint>,
    /// First reference index covered by `points`.
    pub reference_start: usize,
    /// One past the last reference index covered by `points`.
    pub reference_end: usize,
    /// Reference words fed to the dynamic program.
    pub dp_reference_words: usize,
    pub localization: Localization,
}

pub fn needs_localization(
    reference_words: usize,
    transcript_words: usize,
    config: &LocalizationConfig,
) -> bool {
    transcript_words > 0
        && reference_words as f64 / transcript_words as f64 > config.ratio_threshold
}

/// Estimate where the opening of the transcript sits in the reference.
///
/// A coarse pass scores every `step`-th window by how many probe words it
/// contains; the best few are refined word by word on positional similarity.
/// Returns the best window even when it scores below `min_score`.
pub fn locate_window(
    reference: &[ComparableWord],
    transcript: &[ComparableWord],
    config: &LocalizationConfig,
) -> Option<LocalizedWindow> {
    let probe_len = config.probe_words.min(transcript.len());
    if probe_len == 0 || reference.len() < probe_len {
        return None;
    }
    let probe = &transcript[..probe_len];
    let step = config.step.max(1);
    let last_start = reference.len() - probe_len;

    let mut coarse: Vec<(usize, f64)> = (0..=last_start)
        .step_by(step)
        .map(|start| {
            let end = (start + probe_len + step).min(reference.len());
            (start, presence_score(&reference[start..end], probe))
        })
        .collect();
    coarse.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut best: Option<LocalizedWindow> = None;
    for &(candidate, _) in coarse.iter().take(REFINE_CANDIDATES) {
        let from = candidate.saturating_sub(step);
        let to = (candidate + step).min(last_start);
        for start in from..=to {
            let score = positional_score(&reference[start..start + probe_len], probe);
            let better = match best {
                None => true,
                Some(current) => {
                    score > current.score || (score == current.score && start < current.start)
                }
            };
            if better {
                best = Some(LocalizedWindow { start, score });
            }
        }
    }
    best
}

fn presence_score(window: &[ComparableWord], probe: &[ComparableWord]) -> f64 {
    let present: HashSet<&str> = window.iter().map(|word| word.normalized.as_str()).collect();
    let hits = probe
        .iter()
        .filter(|word| present.contains(word.normalized.as_str()))
        .count();
    hits as f64 / probe.len() as f64
}

fn positional_score(window: &[ComparableWord], probe: &[ComparableWord]) -> f64 {
    let total: f64 = window
        .iter()
        .zip(probe)
        .map(|(reference, transcript)| similarity(reference, transcript))
        .sum();
    total / probe.len() as f64
}

/// Align `transcript` against `reference`, restricting the reference to a
/// located window when it is much longer than the transcript.
pub fn align_with_localization(
    reference: &[String],
    transcript: &[TimedWord],
    scoring: &AlignmentScoring,
    config: &LocalizationConfig,
) -> AlignmentOutcome {
    let reference_words: Vec<ComparableWord> =
        reference.iter().map(|word| ComparableWord::new(word)).collect();
    let transcript_words = prepare_transcript(transcript);

    let mut localization = Localization::NotNeeded;
    if needs_localization(reference_words.len(), transcript_words.len(), config) {
        match locate_window(&reference_words, &transcript_words, config) {
            Some(window) if window.score >= config.min_score => {
                let end = (window.start + transcript_words.len() + config.tail_slack_words)
                    .min(reference_words.len());
                let mut points = align_prepared(
                    &reference_words[window.start..end],
                    window.start,
                    transcript,
                    &transcript_words,
                    scoring,
                );
                trim_tail_slack(&mut points);
                let reference_end = points
                    .iter()
                    .filter_map(|point| point.reference_index)
                    .last()
                    .map_or(window.start, |index| index + 1);
                tracing::info!(
                    start = window.start,
                    score = window.score,
                    window_words = end - window.start,
                    "alignment: transcript localized in reference"
                );
                return AlignmentOutcome {
                    points,
                    reference_start: window.start,
                    reference_end,
                    dp_reference_words: end - window.start,
                    localization: Localization::Located(window),
                };
            }
            other => {
                let best_score = other.map(|window| window.score);
                tracing::warn!(
                    best_score = ?best_score,
                    min_score = config.min_score,
                    "alignment: localization failed, aligning against the full reference"
                );
                localization = Localization::Missed { best_score };
            }
        }
    }

    let points = align_prepared(&reference_words, 0, transcript, &transcript_words, scoring);
    AlignmentOutcome {
        points,
        reference_start: 0,
        reference_end: reference_words.len(),
        dp_reference_words: reference_words.len(),
        localization,
    }
}

/// Drop the unread slack after the last transcript-bearing point.
fn trim_tail_slack(points: &mut Vec<AlignmentPoint>) {
    if let Some(last) = points.iter().rposition(AlignmentPoint::has_transcript) {
        points.truncate(last + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalize::normalize_word;
    use crate::types::MatchType;

    fn words(text: &str) -> Vec<ComparableWord> {
        text.split_whitespace().map(ComparableWord::new).collect()
    }

    fn timed(tokens: &[String]) -> Vec<TimedWord> {
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| TimedWord {
                word: normalize_word(token),
                original: token.clone(),
                start_time: index as f64,
                end_time: index as f64 + 0.8,
                source_segment_id: 0,
                sequence_index: index,
                excluded: false,
            })
            .collect()
    }

    /// Distinct words `w0 w1 w2 ...`.
    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("w{index}")).collect()
    }

    #[test]
    fn ratio_gate() {
        let config = LocalizationConfig::default();
        assert!(!needs_localization(100, 10, &config));
        assert!(needs_localization(101, 10, &config));
        assert!(!needs_localization(100, 0, &config));
    }

    #[test]
    fn locate_finds_exact_start() {
        let reference = numbered(1000);
        let transcript = reference[437..497].to_vec();
        let reference_words: Vec<ComparableWord> =
            reference.iter().map(|word| ComparableWord::new(word)).collect();
        let transcript_words: Vec<ComparableWord> =
            transcript.iter().map(|word| ComparableWord::new(word)).collect();
        let window = locate_window(&reference_words, &transcript_words, &LocalizationConfig::default())
            .expect("window");
        assert_eq!(window.start, 437);
        assert_eq!(window.score, 1.0);
    }

    #[test]
    fn locate_short_reference() {
        let reference = words("a b");
        let transcript = words("a b c");
        assert!(locate_window(&reference, &transcript, &LocalizationConfig::default()).is_none());
    }

    #[test]
    fn localized_alignment_is_bounded() {
        let reference = numbered(2000);
        let transcript = timed(&reference[1200..1250]);
        let outcome = align_with_localization(
            &reference,
            &transcript,
            &AlignmentScoring::default(),
            &LocalizationConfig::default(),
        );
        assert!(matches!(
            outcome.localization,
            Localization::Located(LocalizedWindow { start: 1200, .. })
        ));
        assert_eq!(outcome.dp_reference_words, 550);
        assert_eq!(outcome.reference_start, 1200);
        assert_eq!(outcome.reference_end, 1250);
        assert_eq!(outcome.points.len(), 50);
        assert!(outcome
            .points
            .iter()
            .all(|point| point.match_type == MatchType::Exact));
        assert_eq!(outcome.points[0].reference_index, Some(1200));
    }

    #[test]
    fn unrelated_transcript_falls_back_to_full_alignment() {
        let reference = numbered(300);
        let transcript: Vec<String> = (0..20).map(|index| format!("zz{index}")).collect();
        let outcome = align_with_localization(
            &reference,
            &timed(&transcript),
            &AlignmentScoring::default(),
            &LocalizationConfig::default(),
        );
        assert!(matches!(outcome.localization, Localization::Missed { .. }));
        assert_eq!(outcome.dp_reference_words, 300);
        let covered = outcome
            .points
            .iter()
            .filter(|point| point.reference_index.is_some())
            .count();
        assert_eq!(covered, 300);
    }

    #[test]
    fn comparable_lengths_skip_localization() {
        let reference = numbered(40);
        let outcome = align_with_localization(
            &reference,
            &timed(&reference[..30]),
            &AlignmentScoring::default(),
            &LocalizationConfig::default(),
        );
        assert_eq!(outcome.localization, Localization::NotNeeded);
        assert_eq!(outcome.points.len(), 40);
    }
}
