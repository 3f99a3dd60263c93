use narration_align::alignment::localization::{align_with_localization, Localization};
use narration_align::alignment::needleman_wunsch::align_words;
use narration_align::alignment::normalize::tokenize;
use narration_align::alignment::quality::score_segments;
use narration_align::alignment::repetition::{build_final_transcript, find_repeated_sequences};
use narration_align::config::{AlignmentScoring, LocalizationConfig};
use narration_align::pipeline::transcript::build_timed_words;
use narration_align::types::TranscriptSegment;
use narration_align::{analyze, AnalysisConfig, MatchType, OverallStatus, TimedWord, TranscriptInput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const QUICK_FOX: &str = "the quick brown fox jumps over the lazy dog";

const GAP_LEAD: &str = "It was a bright cold day in April and the clocks were striking thirteen while Winston Smith hurried quietly home";
const GAP_CLAUSE: &str = "beneath grey towers swollen clouds gathered slowly over distant rooftops bringing bitter rain toward everyone";
const GAP_TAIL: &str = "He slipped through the glass doors of Victory Mansions though not quickly enough to prevent a swirl of dust entering";

fn per_word_segments(text: &str, seconds_per_word: f64) -> TranscriptInput {
    TranscriptInput::Segments(
        text.split_whitespace()
            .enumerate()
            .map(|(index, word)| TranscriptSegment {
                text: word.to_string(),
                start_time: index as f64 * seconds_per_word,
                end_time: index as f64 * seconds_per_word + seconds_per_word,
            })
            .collect(),
    )
}

fn plain_words(text: &str) -> Vec<TimedWord> {
    build_timed_words(&TranscriptInput::PlainText(text.to_string()), None)
}

fn random_word(rng: &mut StdRng) -> String {
    let len = rng.gen_range(3..=9);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

fn random_text(rng: &mut StdRng, vocabulary: &[String], words: usize) -> Vec<String> {
    (0..words)
        .map(|_| vocabulary[rng.gen_range(0..vocabulary.len())].clone())
        .collect()
}

#[test]
fn exact_match_scenario() {
    let report = analyze(
        QUICK_FOX,
        per_word_segments(QUICK_FOX, 0.5),
        &AnalysisConfig::default(),
    )
    .expect("analysis succeeds");

    assert_eq!(report.summary.alignment_point_count, 9);
    assert_eq!(report.summary.match_counts.exact, 9);
    assert_eq!(report.overall_score, 1.0);
    assert!(report.missing_sections.is_empty());
    assert!(report.checklist.is_empty());
    assert!(report.repetitions.is_empty());
    assert_eq!(report.overall_status, OverallStatus::ProductionReady);
    assert_eq!(report.quality_segments[0].start_time, Some(0.0));
    assert_eq!(report.quality_segments[0].end_time, Some(4.0));
}

#[test]
fn triple_take_scenario() {
    let phrase = "once upon a midnight dreary while";
    let transcript = format!("{phrase} {phrase} {phrase} i pondered weak and weary");
    let words = plain_words(&transcript);

    let repetitions = find_repeated_sequences(&words, 5, 50);
    assert_eq!(repetitions.len(), 1);
    let repetition = &repetitions[0];
    assert_eq!(repetition.length_in_words, 6);
    assert_eq!(repetition.occurrences.len(), 3);
    assert!(repetition.occurrences[2].is_keeper);
    assert_eq!(repetition.occurrences[2].start_index, 12);

    let final_transcript = build_final_transcript(&words, &repetitions);
    assert_eq!(final_transcript.len(), words.len() - 12);
    assert_eq!(final_transcript[0].sequence_index, 12);
}

#[test]
fn triple_take_report_asks_to_delete_two_takes() {
    let phrase = "once upon a midnight dreary while";
    let reference = format!("{phrase} i pondered weak and weary");
    let transcript = format!("{phrase} {phrase} {phrase} i pondered weak and weary");
    let report = analyze(
        &reference,
        per_word_segments(&transcript, 0.4),
        &AnalysisConfig::default(),
    )
    .expect("analysis succeeds");

    assert_eq!(report.summary.excluded_word_count, 12);
    assert_eq!(report.summary.final_transcript_word_count, 11);
    assert_eq!(report.summary.match_counts.exact, 11);
    let titles: Vec<&str> = report.checklist.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["Delete take 1 of 3", "Delete take 2 of 3"]);
    let analysis = &report.repetitions[0];
    assert!((analysis.wasted_time_seconds - 4.8).abs() < 1e-9);
    assert_eq!(report.overall_status, OverallStatus::ProductionReady);
}

#[test]
fn localization_scenario() {
    let mut rng = StdRng::seed_from_u64(7);
    let vocabulary: Vec<String> = (0..3000).map(|_| random_word(&mut rng)).collect();
    let reference = random_text(&mut rng, &vocabulary, 10_000);
    let transcript_text = reference[3000..3100].join(" ");
    let transcript = plain_words(&transcript_text);

    let outcome = align_with_localization(
        &reference,
        &transcript,
        &AlignmentScoring::default(),
        &LocalizationConfig::default(),
    );
    let Localization::Located(window) = outcome.localization else {
        panic!("expected a located window, got {:?}", outcome.localization);
    };
    assert_eq!(window.start, 3000);
    assert!(window.score > 0.4);
    assert_eq!(outcome.dp_reference_words, 600);
    assert_eq!(outcome.reference_start, 3000);
    assert_eq!(outcome.reference_end, 3100);
    assert_eq!(outcome.points.len(), 100);
    assert!(outcome
        .points
        .iter()
        .all(|point| point.match_type == MatchType::Exact));

    let report = analyze(
        &reference.join(" "),
        TranscriptInput::PlainText(transcript_text),
        &AnalysisConfig::default(),
    )
    .expect("analysis succeeds");
    assert_eq!(report.summary.dp_reference_words, 600);
    assert!(report.missing_sections.is_empty());
    assert_eq!(report.overall_status, OverallStatus::ProductionReady);
}

#[test]
fn gap_scenario() {
    let reference = format!("{GAP_LEAD} {GAP_CLAUSE} {GAP_TAIL}");
    let transcript = format!("{GAP_LEAD} {GAP_TAIL}");

    let config = AnalysisConfig {
        min_gap_words: 10,
        ..AnalysisConfig::default()
    };
    let report = analyze(&reference, per_word_segments(&transcript, 0.4), &config)
        .expect("analysis succeeds");
    assert_eq!(report.missing_sections.len(), 1);
    let section = &report.missing_sections[0];
    assert_eq!(section.word_count, 15);
    assert_eq!(section.text, GAP_CLAUSE);
    assert_eq!(section.reference_start_index, 20);
    assert_eq!(section.estimated_duration, "00:06");
    assert_eq!(
        section.timestamp_context.as_deref(),
        Some("After 00:07, before 00:08")
    );
    assert_eq!(report.overall_status, OverallStatus::NeedsSignificantWork);
    assert_eq!(report.checklist[0].text.as_deref(), Some(GAP_CLAUSE));

    let config = AnalysisConfig {
        min_gap_words: 20,
        ..AnalysisConfig::default()
    };
    let report = analyze(&reference, per_word_segments(&transcript, 0.4), &config)
        .expect("analysis succeeds");
    assert!(report.missing_sections.is_empty());
}

#[test]
fn identical_inputs_give_identical_reports() {
    let reference = format!("{GAP_LEAD} {GAP_CLAUSE} {GAP_TAIL}");
    let transcript = format!("{GAP_LEAD} {GAP_LEAD} {GAP_TAIL}");
    let run = || {
        let report = analyze(
            &reference,
            per_word_segments(&transcript, 0.3),
            &AnalysisConfig::default(),
        )
        .expect("analysis succeeds");
        serde_json::to_string(&report).expect("report serializes")
    };
    assert_eq!(run(), run());
}

#[test]
fn alignment_covers_every_index_once() {
    let mut rng = StdRng::seed_from_u64(11);
    let vocabulary: Vec<String> = (0..12).map(|_| random_word(&mut rng)).collect();
    for _ in 0..25 {
        let reference_len = rng.gen_range(0..40);
        let transcript_len = rng.gen_range(1..40);
        let reference = random_text(&mut rng, &vocabulary, reference_len);
        let transcript = plain_words(&random_text(&mut rng, &vocabulary, transcript_len).join(" "));

        let points = align_words(&reference, &transcript, &AlignmentScoring::default());
        let reference_indices: Vec<usize> =
            points.iter().filter_map(|point| point.reference_index).collect();
        let transcript_indices: Vec<usize> =
            points.iter().filter_map(|point| point.transcript_index).collect();
        assert_eq!(reference_indices, (0..reference.len()).collect::<Vec<_>>());
        assert_eq!(transcript_indices, (0..transcript.len()).collect::<Vec<_>>());
        for point in &points {
            match point.match_type {
                MatchType::Missing => assert!(point.transcript_index.is_none()),
                MatchType::Extra => assert!(point.reference_index.is_none()),
                _ => assert!(point.reference_index.is_some() && point.transcript_index.is_some()),
            }
        }
    }
}

#[test]
fn repetitions_keep_last_take_and_do_not_overlap() {
    let mut rng = StdRng::seed_from_u64(23);
    let vocabulary: Vec<String> = (0..8).map(|_| random_word(&mut rng)).collect();
    for _ in 0..20 {
        let mut text = random_text(&mut rng, &vocabulary, 60);
        let take_len = rng.gen_range(5..12);
        let start = rng.gen_range(0..text.len() - take_len);
        let take: Vec<String> = text[start..start + take_len].to_vec();
        let insert_at = rng.gen_range(start..text.len());
        for _ in 0..rng.gen_range(1..3) {
            text.splice(insert_at..insert_at, take.iter().cloned());
        }
        let words = plain_words(&text.join(" "));
        let repetitions = find_repeated_sequences(&words, 5, 50);

        for repetition in &repetitions {
            let last = repetition.occurrences.len() - 1;
            assert!(repetition.occurrences.len() >= 2);
            for (position, occurrence) in repetition.occurrences.iter().enumerate() {
                assert_eq!(occurrence.is_keeper, position == last);
            }
            let max_start = repetition
                .occurrences
                .iter()
                .map(|occurrence| occurrence.start_index)
                .max();
            assert_eq!(Some(repetition.occurrences[last].start_index), max_start);
        }

        for (i, a) in repetitions.iter().enumerate() {
            for b in &repetitions[i + 1..] {
                for x in &a.occurrences {
                    for y in &b.occurrences {
                        let lo = x.start_index.max(y.start_index);
                        let hi = x.end_index.min(y.end_index);
                        let overlap = if hi >= lo { hi - lo + 1 } else { 0 };
                        let shorter = x.word_count().min(y.word_count());
                        assert!(2 * overlap <= shorter, "occurrences overlap by more than half");
                    }
                }
            }
        }

        let final_transcript = build_final_transcript(&words, &repetitions);
        assert!(final_transcript
            .windows(2)
            .all(|pair| pair[0].sequence_index < pair[1].sequence_index));
    }
}

#[test]
fn segments_partition_the_alignment() {
    let reference = tokenize(&format!("{GAP_LEAD} {GAP_CLAUSE} {GAP_TAIL}"), false);
    let transcript = plain_words(&format!("{GAP_LEAD} uh {GAP_TAIL}"));
    let points = align_words(&reference, &transcript, &AlignmentScoring::default());
    for segment_size in 1..=points.len() + 1 {
        let segments = score_segments(&points, segment_size);
        let mut next = 0;
        for segment in &segments {
            assert_eq!(segment.point_start, next);
            assert!(segment.point_end - segment.point_start <= segment_size);
            next = segment.point_end;
        }
        assert_eq!(next, points.len());
        assert_eq!(segments.len(), points.len().div_ceil(segment_size));
    }
}

#[test]
fn checklist_is_ordered_by_priority() {
    let phrase = "once upon a midnight dreary while";
    let reference = format!("{GAP_LEAD} {GAP_CLAUSE} {phrase} {GAP_TAIL}");
    let transcript = format!("{GAP_LEAD} {phrase} {phrase} {GAP_TAIL} and then some words");
    let config = AnalysisConfig {
        segment_size: 10,
        ..AnalysisConfig::default()
    };
    let report = analyze(&reference, per_word_segments(&transcript, 0.4), &config)
        .expect("analysis succeeds");
    assert!(!report.checklist.is_empty());
    assert!(report
        .checklist
        .windows(2)
        .all(|pair| pair[0].priority <= pair[1].priority));
}

#[test]
fn empty_inputs_are_rejected() {
    let config = AnalysisConfig::default();
    assert!(analyze("", TranscriptInput::PlainText("words".to_string()), &config).is_err());
    assert!(analyze("words", TranscriptInput::PlainText("  ".to_string()), &config).is_err());
}
