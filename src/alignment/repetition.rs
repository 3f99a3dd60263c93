use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::TimedWord;

/// A candidate repetition is dropped when more than this share of any of its
/// occurrences falls inside one longer, kept repetition.
pub const MERGE_OVERLAP_RATIO: f64 = 0.5;

/// One take of a repeated span. `end_index` is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub is_keeper: bool,
}

impl Occurrence {
    pub fn word_count(&self) -> usize {
        self.end_index + 1 - self.start_index
    }

    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start_index..=self.end_index
    }
}

/// A phrase spoken more than once. Occurrences are sorted by `start_index`
/// and the last one is the keeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repetition {
    pub surface_text: String,
    pub length_in_words: usize,
    pub occurrences: Vec<Occurrence>,
}

impl Repetition {
    pub fn keeper_index(&self) -> usize {
        self.occurrences.len().saturating_sub(1)
    }

    pub fn keeper(&self) -> Option<&Occurrence> {
        self.occurrences.last()
    }

    pub fn non_keepers(&self) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(|occurrence| !occurrence.is_keeper)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepetitionOutcome {
    /// Input words with `excluded` set on removed takes.
    pub word_map: Vec<TimedWord>,
    pub repetitions: Vec<Repetition>,
    /// `word_map` without excluded words, order preserved.
    pub final_transcript: Vec<TimedWord>,
    pub excluded: BTreeSet<usize>,
}

pub fn detect_repetitions(
    words: &[TimedWord],
    min_length: usize,
    max_length: usize,
) -> RepetitionOutcome {
    let repetitions = find_repeated_sequences(words, min_length, max_length);
    let excluded = excluded_indices(&repetitions);
    let word_map: Vec<TimedWord> = words
        .iter()
        .enumerate()
        .map(|(index, word)| TimedWord {
            excluded: excluded.contains(&index),
            ..word.clone()
        })
        .collect();
    let final_transcript = word_map
        .iter()
        .filter(|word| !word.excluded)
        .cloned()
        .collect();

    tracing::debug!(
        input_words = words.len(),
        repetitions = repetitions.len(),
        excluded_words = excluded.len(),
        "repetition: detection finished"
    );

    RepetitionOutcome {
        word_map,
        repetitions,
        final_transcript,
        excluded,
    }
}

/// Find repeated `n`-word spans for `n` in `min_length..=max_length`,
/// longest first, then drop spans subsumed by longer ones.
pub fn find_repeated_sequences(
    words: &[TimedWord],
    min_length: usize,
    max_length: usize,
) -> Vec<Repetition> {
    if min_length == 0 || words.len() < min_length {
        return Vec::new();
    }

    let normalized: Vec<&str> = words.iter().map(|word| word.word.as_str()).collect();
    let upper = max_length.min(words.len());
    let mut detected = Vec::new();

    for n in (min_length..=upper).rev() {
        for positions in group_windows(&normalized, n) {
            if positions.len() < 2 {
                continue;
            }
            let selected = select_positions(&positions, n, min_length);
            if selected.len() < 2 {
                continue;
            }
            detected.push(build_repetition(words, &selected, n));
        }
    }

    merge_overlapping_repetitions(detected)
}

/// Window start positions grouped by window text, groups in order of first
/// appearance.
fn group_windows(normalized: &[&str], n: usize) -> Vec<Vec<usize>> {
    let mut index: HashMap<&[&str], usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (start, window) in normalized.windows(n).enumerate() {
        let next = groups.len();
        let group = *index.entry(window).or_insert(next);
        if group == next {
            groups.push(Vec::new());
        }
        groups[group].push(start);
    }
    groups
}

fn select_positions(positions: &[usize], n: usize, min_length: usize) -> Vec<usize> {
    let strict = select_greedy(positions, |last, pos| pos >= last + n);
    if strict.len() >= 2 {
        return strict;
    }
    // Overlapping takes of one window imply a periodic span with period
    // `pos - last`. Periods of at least `min_length` words are found as
    // their own, shorter repetition.
    select_greedy(positions, |last, pos| {
        let overlap = (last + n).saturating_sub(pos);
        overlap == 0 || (2 * overlap <= n && pos - last < min_length)
    })
}

fn select_greedy(positions: &[usize], accept: impl Fn(usize, usize) -> bool) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(positions.len());
    for &pos in positions {
        match kept.last() {
            Some(&last) if !accept(last, pos) => {}
            _ => kept.push(pos),
        }
    }
    kept
}

fn build_repetition(words: &[TimedWord], starts: &[usize], n: usize) -> Repetition {
    let keeper_position = starts.len() - 1;
    let occurrences = starts
        .iter()
        .enumerate()
        .map(|(position, &start)| {
            let end = start + n - 1;
            Occurrence {
                start_index: start,
                end_index: end,
                start_time: words[start].start_time,
                end_time: words[end].end_time,
                is_keeper: position == keeper_position,
            }
        })
        .collect();
    let first = starts[0];
    let surface_text = words[first..first + n]
        .iter()
        .map(|word| word.original.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Repetition {
        surface_text,
        length_in_words: n,
        occurrences,
    }
}

/// Keep longer repetitions first; a repetition survives unless one of its
/// occurrences lies more than half inside the takes of a single repetition
/// already kept. Survivors are returned in chronological order of their first
/// take.
pub fn merge_overlapping_repetitions(mut repetitions: Vec<Repetition>) -> Vec<Repetition> {
    repetitions.sort_by(|a, b| b.length_in_words.cmp(&a.length_in_words));
    let mut kept: Vec<Repetition> = Vec::new();

    for repetition in repetitions {
        if kept.iter().any(|existing| dominates(existing, &repetition)) {
            continue;
        }
        kept.push(repetition);
    }

    kept.sort_by_key(|repetition| {
        repetition
            .occurrences
            .first()
            .map(|occurrence| occurrence.start_index)
            .unwrap_or(usize::MAX)
    });
    kept
}

fn dominates(existing: &Repetition, candidate: &Repetition) -> bool {
    candidate.occurrences.iter().any(|occurrence| {
        let inside = occurrence
            .indices()
            .filter(|index| {
                existing
                    .occurrences
                    .iter()
                    .any(|take| take.indices().contains(index))
            })
            .count();
        inside as f64 > MERGE_OVERLAP_RATIO * occurrence.word_count() as f64
    })
}

/// Word positions inside non-keeper takes. Positions that also belong to a
/// keeper are never excluded.
pub fn excluded_indices(repetitions: &[Repetition]) -> BTreeSet<usize> {
    let keepers: BTreeSet<usize> = repetitions
        .iter()
        .filter_map(Repetition::keeper)
        .flat_map(Occurrence::indices)
        .collect();
    repetitions
        .iter()
        .flat_map(Repetition::non_keepers)
        .flat_map(Occurrence::indices)
        .filter(|index| !keepers.contains(index))
        .collect()
}

pub fn build_final_transcript(words: &[TimedWord], repetitions: &[Repetition]) -> Vec<TimedWord> {
    let excluded = excluded_indices(repetitions);
    words
        .iter()
        .enumerate()
        .filter(|(index, _)| !excluded.contains(index))
        .map(|(_, word)| word.clone())
        .collect()
}
