use crate::alignment::gaps::find_missing_sections;
use crate::alignment::localization::Localization;
use crate::alignment::quality::score_segments;
use crate::alignment::report::{generate_report, ProductionReport, ReportInputs};
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::traits::{
    AnalysisStage, ProgressSink, ProgressUpdate, RepetitionFinder, SequenceAligner, Tokenizer,
};
use crate::pipeline::transcript::build_timed_words;
use crate::types::AnalysisInput;

pub struct ProductionAnalyzer {
    config: AnalysisConfig,
    tokenizer: Box<dyn Tokenizer>,
    repetition_finder: Box<dyn RepetitionFinder>,
    sequence_aligner: Box<dyn SequenceAligner>,
    progress_sink: Option<Box<dyn ProgressSink>>,
}

pub(crate) struct ProductionAnalyzerParts {
    pub config: AnalysisConfig,
    pub tokenizer: Box<dyn Tokenizer>,
    pub repetition_finder: Box<dyn RepetitionFinder>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub progress_sink: Option<Box<dyn ProgressSink>>,
}

impl ProductionAnalyzer {
    pub(crate) fn from_parts(parts: ProductionAnalyzerParts) -> Self {
        Self {
            config: parts.config,
            tokenizer: parts.tokenizer,
            repetition_finder: parts.repetition_finder,
            sequence_aligner: parts.sequence_aligner,
            progress_sink: parts.progress_sink,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<ProductionReport, AnalysisError> {
        let config = &self.config;
        let reference_text = config
            .reference_range
            .as_ref()
            .map_or(input.reference_text.as_str(), |range| {
                range.apply(&input.reference_text)
            });
        if reference_text.trim().is_empty() {
            return Err(AnalysisError::invalid_input("reference text is empty"));
        }
        let words = build_timed_words(&input.transcript, config.transcript_range.as_ref());
        if words.is_empty() {
            return Err(AnalysisError::invalid_input("transcript contains no words"));
        }
        let reference = self.tokenizer.tokenize(reference_text);
        tracing::debug!(
            reference_words = reference.len(),
            transcript_words = words.len(),
            "analysis: input assembled"
        );
        self.emit(ProgressUpdate::finished(AnalysisStage::InputAssembly));

        let repetition = self.repetition_finder.find_repetitions(
            &words,
            config.min_repeat_length,
            config.max_repeat_length,
        );
        self.emit(
            ProgressUpdate::finished(AnalysisStage::RepetitionDetection).with_message(format!(
                "{} repetition(s), {} word(s) excluded",
                repetition.repetitions.len(),
                repetition.excluded.len()
            )),
        );

        let alignment = self.sequence_aligner.align(
            &reference,
            &repetition.final_transcript,
            &config.scoring,
            &config.localization,
        );
        let localization = ProgressUpdate::finished(AnalysisStage::Localization);
        self.emit(match alignment.localization {
            Localization::NotNeeded => localization,
            Localization::Located(window) => localization.with_message(format!(
                "transcript located at reference word {} (score {:.2})",
                window.start, window.score
            )),
            Localization::Missed { .. } => localization
                .warning()
                .with_message("no confident window found; aligned against the full reference"),
        });
        self.emit(
            ProgressUpdate::finished(AnalysisStage::Alignment)
                .with_message(format!("{} alignment points", alignment.points.len())),
        );

        let quality_segments = score_segments(&alignment.points, config.segment_size);
        self.emit(ProgressUpdate::finished(AnalysisStage::QualityScoring));

        let missing_sections = find_missing_sections(
            &alignment.points,
            config.min_gap_words,
            config.context_words,
            config.words_per_minute,
        );
        self.emit(ProgressUpdate::finished(AnalysisStage::GapDetection));

        let report = generate_report(ReportInputs {
            reference_word_count: reference.len(),
            transcript_word_count: words.len(),
            final_transcript_word_count: repetition.final_transcript.len(),
            excluded_word_count: repetition.excluded.len(),
            repetitions: &repetition.repetitions,
            alignment: &alignment,
            quality_segments,
            missing_sections,
            words_per_minute: config.words_per_minute,
        });
        self.emit(
            ProgressUpdate::finished(AnalysisStage::ReportAssembly)
                .with_message(report.overall_status.as_str()),
        );

        tracing::info!(
            overall_status = report.overall_status.as_str(),
            overall_score = report.overall_score,
            repetitions = report.repetitions.len(),
            missing_sections = report.missing_sections.len(),
            "analysis: finished"
        );
        Ok(report)
    }

    fn emit(&self, update: ProgressUpdate) {
        let Some(sink) = self.progress_sink.as_ref() else {
            return;
        };
        if let Err(err) = sink.report(&update) {
            tracing::warn!(
                stage = update.stage.as_str(),
                error = %err,
                "analysis: progress sink failed, continuing"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::pipeline::builder::AnalyzerBuilder;
    use crate::types::TranscriptInput;

    use super::*;

    struct FailingSink;

    impl ProgressSink for FailingSink {
        fn report(&self, _update: &ProgressUpdate) -> Result<(), AnalysisError> {
            Err(AnalysisError::progress("channel closed"))
        }
    }

    fn analyzer() -> ProductionAnalyzer {
        AnalyzerBuilder::new(AnalysisConfig::default())
            .build()
            .expect("default config is valid")
    }

    #[test]
    fn empty_reference_is_invalid_input() {
        let input = AnalysisInput {
            reference_text: "   ".to_string(),
            transcript: TranscriptInput::PlainText("hello".to_string()),
        };
        assert!(matches!(
            analyzer().analyze(&input),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn wordless_transcript_is_invalid_input() {
        let input = AnalysisInput {
            reference_text: "hello world".to_string(),
            transcript: TranscriptInput::Segments(Vec::new()),
        };
        assert!(matches!(
            analyzer().analyze(&input),
            Err(AnalysisError::InvalidInput { .. })
        ));
    }

    #[test]
    fn punctuation_only_reference_degenerates_to_extras() {
        let input = AnalysisInput {
            reference_text: "-- ... !!".to_string(),
            transcript: TranscriptInput::PlainText("some spoken words".to_string()),
        };
        let report = analyzer().analyze(&input).expect("degenerate alignment is not an error");
        assert_eq!(report.summary.match_counts.extra, 3);
        assert_eq!(report.summary.reference_word_count, 0);
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.checklist.len(), 1);
    }

    #[test]
    fn wordless_reference_yields_a_single_removal_item() {
        let spoken: Vec<String> = (0..120).map(|i| format!("line{i}")).collect();
        let input = AnalysisInput {
            reference_text: "* * *".to_string(),
            transcript: TranscriptInput::PlainText(spoken.join(" ")),
        };
        let report = analyzer().analyze(&input).expect("degenerate alignment is not an error");
        assert_eq!(report.quality_segments.len(), 3);
        assert_eq!(report.checklist.len(), 1);
        assert_eq!(report.checklist[0].priority, crate::alignment::report::Priority::High);
        assert_eq!(report.checklist[0].title, "Remove unmatched narration (120 words)");
        assert_eq!(report.checklist[0].location, None);
    }

    #[test]
    fn failing_sink_does_not_abort() {
        let analyzer = AnalyzerBuilder::new(AnalysisConfig::default())
            .with_progress_sink(Box::new(FailingSink))
            .build()
            .expect("build should succeed");
        let input = AnalysisInput {
            reference_text: "one two".to_string(),
            transcript: TranscriptInput::PlainText("one two".to_string()),
        };
        assert!(analyzer.analyze(&input).is_ok());
    }

    #[test]
    fn reference_range_is_applied_before_tokenizing() {
        let config = AnalysisConfig {
            reference_range: Some(crate::types::TextRange {
                start: 8,
                end: None,
            }),
            ..AnalysisConfig::default()
        };
        let analyzer = AnalyzerBuilder::new(config)
            .build()
            .expect("build should succeed");
        let input = AnalysisInput {
            reference_text: "Preface. the story begins".to_string(),
            transcript: TranscriptInput::PlainText("the story begins".to_string()),
        };
        let report = analyzer.analyze(&input).expect("analysis succeeds");
        assert_eq!(report.summary.reference_word_count, 3);
        assert_eq!(report.summary.match_counts.exact, 3);
    }
}
