use serde::Serialize;

use crate::alignment::localization::AlignmentOutcome;
use crate::alignment::repetition::RepetitionOutcome;
use crate::config::{AlignmentScoring, LocalizationConfig};
use crate::error::AnalysisError;
use crate::types::TimedWord;

/// Splits reference text into surface words.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

pub trait RepetitionFinder: Send + Sync {
    fn find_repetitions(
        &self,
        words: &[TimedWord],
        min_length: usize,
        max_length: usize,
    ) -> RepetitionOutcome;
}

pub trait SequenceAligner: Send + Sync {
    fn align(
        &self,
        reference: &[String],
        transcript: &[TimedWord],
        scoring: &AlignmentScoring,
        localization: &LocalizationConfig,
    ) -> AlignmentOutcome;
}

/// Best-effort progress reporting. Errors are logged by the analyzer and
/// never abort a run.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: &ProgressUpdate) -> Result<(), AnalysisError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    InputAssembly,
    RepetitionDetection,
    Localization,
    Alignment,
    QualityScoring,
    GapDetection,
    ReportAssembly,
}

impl AnalysisStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InputAssembly => "input assembly",
            Self::RepetitionDetection => "repetition detection",
            Self::Localization => "localization",
            Self::Alignment => "alignment",
            Self::QualityScoring => "quality scoring",
            Self::GapDetection => "gap detection",
            Self::ReportAssembly => "report assembly",
        }
    }

    /// Completion percentage once the stage has finished.
    pub fn percent(self) -> u8 {
        match self {
            Self::InputAssembly => 5,
            Self::RepetitionDetection => 20,
            Self::Localization => 30,
            Self::Alignment => 70,
            Self::QualityScoring => 80,
            Self::GapDetection => 90,
            Self::ReportAssembly => 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressLevel {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub stage: AnalysisStage,
    pub level: ProgressLevel,
    pub message: Option<String>,
}

impl ProgressUpdate {
    pub fn finished(stage: AnalysisStage) -> Self {
        Self {
            percent: stage.percent(),
            stage,
            level: ProgressLevel::Info,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn warning(mut self) -> Self {
        self.level = ProgressLevel::Warning;
        self
    }
}
