use serde::{Deserialize, Serialize};

/// One transcript token with its timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    /// Normalized form used for comparison.
    pub word: String,
    /// Surface form as transcribed.
    pub original: String,
    /// Seconds. `0.0` when the transcript carries no timing.
    pub start_time: f64,
    pub end_time: f64,
    pub source_segment_id: usize,
    /// Position in the full, non-deduplicated transcript.
    pub sequence_index: usize,
    pub excluded: bool,
}

impl TimedWord {
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Words built from untimed text have both bounds at zero.
    pub fn has_timing(&self) -> bool {
        self.end_time > 0.0 || self.start_time > 0.0
    }
}

/// One speech-to-text segment. Word times are interpolated across it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptInput {
    Segments(Vec<TranscriptSegment>),
    PlainText(String),
}

/// Half-open character range `[start, end)`; `end: None` runs to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    #[serde(default)]
    pub end: Option<usize>,
}

impl TextRange {
    pub fn contains(&self, char_offset: usize) -> bool {
        char_offset >= self.start && self.end.map_or(true, |end| char_offset < end)
    }

    /// Slice `text` by character (not byte) offsets.
    pub fn apply<'a>(&self, text: &'a str) -> &'a str {
        let byte_at = |char_offset: usize| {
            text.char_indices()
                .nth(char_offset)
                .map(|(byte, _)| byte)
                .unwrap_or(text.len())
        };
        let start = byte_at(self.start);
        let end = self.end.map(byte_at).unwrap_or(text.len()).max(start);
        &text[start..end]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub reference_text: String,
    pub transcript: TranscriptInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Normalized,
    Phonetic,
    Mismatch,
    Missing,
    Extra,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normalized => "normalized",
            Self::Phonetic => "phonetic",
            Self::Mismatch => "mismatch",
            Self::Missing => "missing",
            Self::Extra => "extra",
        }
    }

    /// Exact, normalized and phonetic pairs count as matched content.
    pub fn is_match(self) -> bool {
        matches!(self, Self::Exact | Self::Normalized | Self::Phonetic)
    }

    pub fn is_error(self) -> bool {
        !self.is_match()
    }
}

/// One column of a reference/transcript alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentPoint {
    pub reference_word: Option<String>,
    pub reference_index: Option<usize>,
    pub transcript_word: Option<String>,
    pub transcript_index: Option<usize>,
    pub match_type: MatchType,
    pub match_score: f64,
    pub timestamp: Option<f64>,
}

impl AlignmentPoint {
    pub fn has_transcript(&self) -> bool {
        self.transcript_index.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_range_slices_by_chars() {
        let range = TextRange {
            start: 1,
            end: Some(4),
        };
        assert_eq!(range.apply("café au lait"), "afé");
    }

    #[test]
    fn text_range_open_end_and_overflow() {
        let open = TextRange {
            start: 5,
            end: None,
        };
        assert_eq!(open.apply("hello world"), " world");
        let past_end = TextRange {
            start: 50,
            end: Some(60),
        };
        assert_eq!(past_end.apply("short"), "");
    }

    #[test]
    fn transcript_input_accepts_segments_or_text() {
        let segments: TranscriptInput =
            serde_json::from_str(r#"[{"text": "hi there", "start_time": 0.0, "end_time": 1.0}]"#)
                .expect("segments json");
        assert!(matches!(segments, TranscriptInput::Segments(ref s) if s.len() == 1));
        let plain: TranscriptInput = serde_json::from_str(r#""hi there""#).expect("text json");
        assert_eq!(plain, TranscriptInput::PlainText("hi there".to_string()));
    }

    #[test]
    fn match_type_serializes_lowercase() {
        let json = serde_json::to_string(&MatchType::Phonetic).expect("serialize");
        assert_eq!(json, "\"phonetic\"");
        assert!(MatchType::Normalized.is_match());
        assert!(MatchType::Extra.is_error());
    }

    #[test]
    fn untimed_word_has_no_timing() {
        let word = TimedWord {
            word: "a".to_string(),
            original: "A".to_string(),
            start_time: 0.0,
            end_time: 0.0,
            source_segment_id: 0,
            sequence_index: 0,
            excluded: false,
        };
        assert!(!word.has_timing());
        assert_eq!(word.duration(), 0.0);
    }
}
