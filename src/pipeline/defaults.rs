use crate::alignment::localization::{align_with_localization, AlignmentOutcome};
use crate::alignment::normalize::tokenize;
use crate::alignment::repetition::{detect_repetitions, RepetitionOutcome};
use crate::config::{AlignmentScoring, LocalizationConfig};
use crate::pipeline::traits::{RepetitionFinder, SequenceAligner, Tokenizer};
use crate::types::TimedWord;

/// Whitespace tokenizer that keeps surface forms.
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text, false)
    }
}

pub struct NgramRepetitionFinder;

impl RepetitionFinder for NgramRepetitionFinder {
    fn find_repetitions(
        &self,
        words: &[TimedWord],
        min_length: usize,
        max_length: usize,
    ) -> RepetitionOutcome {
        detect_repetitions(words, min_length, max_length)
    }
}

pub struct NeedlemanWunschAligner;

impl SequenceAligner for NeedlemanWunschAligner {
    fn align(
        &self,
        reference: &[String],
        transcript: &[TimedWord],
        scoring: &AlignmentScoring,
        localization: &LocalizationConfig,
    ) -> AlignmentOutcome {
        align_with_localization(reference, transcript, scoring, localization)
    }
}
