use crate::alignment::normalize::{
    equivalence_similarity, similarity, ComparableWord, EDIT_SIMILARITY_CEILING,
    EXACT_MATCH_SCORE, NORMALIZED_MATCH_SCORE,
};
use crate::config::AlignmentScoring;
use crate::types::{AlignmentPoint, MatchType, TimedWord};

/// Pairs at or above this similarity (but not equal) are `phonetic`.
pub const PHONETIC_THRESHOLD: f64 = 0.7;

const STEP_MATCH: u8 = 0;
const STEP_DELETE: u8 = 1;
const STEP_INSERT: u8 = 2;

/// Global alignment of reference words against transcript words.
pub fn align_words(
    reference: &[String],
    transcript: &[TimedWord],
    scoring: &AlignmentScoring,
) -> Vec<AlignmentPoint> {
    let reference_words: Vec<ComparableWord> =
        reference.iter().map(|word| ComparableWord::new(word)).collect();
    let transcript_words = prepare_transcript(transcript);
    align_prepared(&reference_words, 0, transcript, &transcript_words, scoring)
}

pub(crate) fn prepare_transcript(transcript: &[TimedWord]) -> Vec<ComparableWord> {
    transcript
        .iter()
        .map(|word| ComparableWord::new(&word.original))
        .collect()
}

/// Needleman–Wunsch over prepared words. Reference indices in the output are
/// shifted by `reference_offset`.
///
/// Scores are kept in two rolling rows; the winning move of every cell is
/// stored at fill time (ties: match, then delete, then insert) so the
/// backtrack never recomputes similarities.
pub(crate) fn align_prepared(
    reference: &[ComparableWord],
    reference_offset: usize,
    transcript: &[TimedWord],
    transcript_words: &[ComparableWord],
    scoring: &AlignmentScoring,
) -> Vec<AlignmentPoint> {
    debug_assert_eq!(transcript.len(), transcript_words.len());
    let m = reference.len();
    let n = transcript_words.len();
    let cols = n + 1;
    let gap = scoring.gap_penalty;
    // Edit-distance similarity never reaches a threshold above its ceiling.
    let equivalence_only = scoring.match_threshold > EDIT_SIMILARITY_CEILING;

    let mut prev: Vec<f64> = (0..cols).map(|j| j as f64 * gap).collect();
    let mut curr = vec![0.0f64; cols];
    let mut bp = vec![STEP_INSERT; (m + 1) * cols];

    for i in 1..=m {
        let row = i * cols;
        let reference_word = &reference[i - 1];
        curr[0] = i as f64 * gap;
        bp[row] = STEP_DELETE;

        for j in 1..=n {
            let transcript_word = &transcript_words[j - 1];
            let sim = if equivalence_only {
                equivalence_similarity(reference_word, transcript_word)
            } else {
                similarity(reference_word, transcript_word)
            };
            let align_score = if sim >= scoring.match_threshold {
                scoring.match_bonus * sim
            } else {
                scoring.mismatch_penalty
            };

            let mut best = prev[j - 1] + align_score;
            let mut step = STEP_MATCH;
            let delete = prev[j] + gap;
            if delete > best {
                best = delete;
                step = STEP_DELETE;
            }
            let insert = curr[j - 1] + gap;
            if insert > best {
                best = insert;
                step = STEP_INSERT;
            }
            curr[j] = best;
            bp[row + j] = step;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    let mut points = Vec::with_capacity(m + n);
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let step = if i == 0 {
            STEP_INSERT
        } else if j == 0 {
            STEP_DELETE
        } else {
            bp[i * cols + j]
        };
        match step {
            STEP_MATCH => {
                points.push(paired_point(
                    &reference[i - 1],
                    reference_offset + i - 1,
                    &transcript[j - 1],
                    &transcript_words[j - 1],
                    j - 1,
                ));
                i -= 1;
                j -= 1;
            }
            STEP_DELETE => {
                points.push(missing_point(&reference[i - 1], reference_offset + i - 1));
                i -= 1;
            }
            _ => {
                points.push(extra_point(&transcript[j - 1], j - 1));
                j -= 1;
            }
        }
    }
    points.reverse();

    tracing::debug!(
        reference_words = m,
        transcript_words = n,
        points = points.len(),
        "alignment: dynamic programming finished"
    );
    points
}

/// Map a pair similarity to its match type.
pub fn classify_pair(sim: f64) -> MatchType {
    if sim >= EXACT_MATCH_SCORE {
        MatchType::Exact
    } else if sim >= NORMALIZED_MATCH_SCORE {
        MatchType::Normalized
    } else if sim >= PHONETIC_THRESHOLD {
        MatchType::Phonetic
    } else {
        MatchType::Mismatch
    }
}

fn paired_point(
    reference_word: &ComparableWord,
    reference_index: usize,
    timed: &TimedWord,
    transcript_word: &ComparableWord,
    transcript_index: usize,
) -> AlignmentPoint {
    let sim = similarity(reference_word, transcript_word);
    AlignmentPoint {
        reference_word: Some(reference_word.surface.clone()),
        reference_index: Some(reference_index),
        transcript_word: Some(timed.original.clone()),
        transcript_index: Some(transcript_index),
        match_type: classify_pair(sim),
        match_score: sim,
        timestamp: timestamp_of(timed),
    }
}

fn missing_point(reference_word: &ComparableWord, reference_index: usize) -> AlignmentPoint {
    AlignmentPoint {
        reference_word: Some(reference_word.surface.clone()),
        reference_index: Some(reference_index),
        transcript_word: None,
        transcript_index: None,
        match_type: MatchType::Missing,
        match_score: 0.0,
        timestamp: None,
    }
}

fn extra_point(timed: &TimedWord, transcript_index: usize) -> AlignmentPoint {
    AlignmentPoint {
        reference_word: None,
        reference_index: None,
        transcript_word: Some(timed.original.clone()),
        transcript_index: Some(transcript_index),
        match_type: MatchType::Extra,
        match_score: 0.0,
        timestamp: timestamp_of(timed),
    }
}

fn timestamp_of(word: &TimedWord) -> Option<f64> {
    word.has_timing().then_some(word.start_time)
}
