use crate::alignment::normalize::{normalize_word, token_spans};
use crate::types::{TextRange, TimedWord, TranscriptInput, TranscriptSegment};

/// Turn transcript input into sequence-indexed words.
///
/// Segment words get evenly interpolated times across their segment. With a
/// `range`, segment words are kept when their character offset in the
/// space-joined transcript falls inside it; plain text is sliced first.
pub fn build_timed_words(input: &TranscriptInput, range: Option<&TextRange>) -> Vec<TimedWord> {
    let mut words = match input {
        TranscriptInput::Segments(segments) => words_from_segments(segments, range),
        TranscriptInput::PlainText(text) => {
            let text = range.map_or(text.as_str(), |range| range.apply(text));
            words_from_plain_text(text)
        }
    };
    for (sequence_index, word) in words.iter_mut().enumerate() {
        word.sequence_index = sequence_index;
    }
    words
}

fn words_from_segments(segments: &[TranscriptSegment], range: Option<&TextRange>) -> Vec<TimedWord> {
    let mut words = Vec::new();
    let mut base_offset = 0usize;
    for (segment_id, segment) in segments.iter().enumerate() {
        let spans = token_spans(&segment.text);
        let duration = (segment.end_time - segment.start_time).max(0.0);
        let per_word = if spans.is_empty() {
            0.0
        } else {
            duration / spans.len() as f64
        };
        for (position, (char_offset, token)) in spans.iter().enumerate() {
            if range.is_some_and(|range| !range.contains(base_offset + char_offset)) {
                continue;
            }
            let start_time = segment.start_time + position as f64 * per_word;
            words.push(TimedWord {
                word: normalize_word(token),
                original: (*token).to_string(),
                start_time,
                end_time: start_time + per_word,
                source_segment_id: segment_id,
                sequence_index: 0,
                excluded: false,
            });
        }
        // Segments are joined with a single space.
        base_offset += segment.text.chars().count() + 1;
    }
    words
}

fn words_from_plain_text(text: &str) -> Vec<TimedWord> {
    token_spans(text)
        .into_iter()
        .map(|(_, token)| TimedWord {
            word: normalize_word(token),
            original: token.to_string(),
            start_time: 0.0,
            end_time: 0.0,
            source_segment_id: 0,
            sequence_index: 0,
            excluded: false,
        })
        .collect()
}
