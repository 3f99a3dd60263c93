use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::types::TextRange;

/// Tunables for one analysis run. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub min_repeat_length: usize,
    pub max_repeat_length: usize,
    pub segment_size: usize,
    pub min_gap_words: usize,
    pub context_words: usize,
    /// Narration pace used for read-time estimates of missing content.
    pub words_per_minute: f64,
    pub reference_range: Option<TextRange>,
    pub transcript_range: Option<TextRange>,
    pub scoring: AlignmentScoring,
    pub localization: LocalizationConfig,
}

impl AnalysisConfig {
    pub const DEFAULT_MIN_REPEAT_LENGTH: usize = 5;
    pub const DEFAULT_MAX_REPEAT_LENGTH: usize = 50;
    pub const DEFAULT_SEGMENT_SIZE: usize = 50;
    pub const DEFAULT_MIN_GAP_WORDS: usize = 10;
    pub const DEFAULT_CONTEXT_WORDS: usize = 10;
    pub const DEFAULT_WORDS_PER_MINUTE: f64 = 150.0;

    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AnalysisError::io("read config", e))?;
        let config: Self =
            serde_json::from_str(&data).map_err(|e| AnalysisError::json("parse config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.min_repeat_length == 0 {
            return Err(AnalysisError::invalid_config(
                "min_repeat_length must be >= 1",
            ));
        }
        if self.min_repeat_length > self.max_repeat_length {
            return Err(AnalysisError::invalid_config(format!(
                "min_repeat_length ({}) exceeds max_repeat_length ({})",
                self.min_repeat_length, self.max_repeat_length
            )));
        }
        if self.segment_size == 0 {
            return Err(AnalysisError::invalid_config("segment_size must be >= 1"));
        }
        if !(self.words_per_minute.is_finite() && self.words_per_minute > 0.0) {
            return Err(AnalysisError::invalid_config(format!(
                "words_per_minute must be positive, got {}",
                self.words_per_minute
            )));
        }
        for (name, range) in [
            ("reference_range", self.reference_range.as_ref()),
            ("transcript_range", self.transcript_range.as_ref()),
        ] {
            if let Some(TextRange {
                start,
                end: Some(end),
            }) = range
            {
                if end < start {
                    return Err(AnalysisError::invalid_config(format!(
                        "{name} ends ({end}) before it starts ({start})"
                    )));
                }
            }
        }
        self.scoring.validate()?;
        self.localization.validate()
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_repeat_length: Self::DEFAULT_MIN_REPEAT_LENGTH,
            max_repeat_length: Self::DEFAULT_MAX_REPEAT_LENGTH,
            segment_size: Self::DEFAULT_SEGMENT_SIZE,
            min_gap_words: Self::DEFAULT_MIN_GAP_WORDS,
            context_words: Self::DEFAULT_CONTEXT_WORDS,
            words_per_minute: Self::DEFAULT_WORDS_PER_MINUTE,
            reference_range: None,
            transcript_range: None,
            scoring: AlignmentScoring::default(),
            localization: LocalizationConfig::default(),
        }
    }
}

/// Needleman–Wunsch scoring scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentScoring {
    pub match_bonus: f64,
    pub mismatch_penalty: f64,
    pub gap_penalty: f64,
    /// Minimum word similarity for a pair to earn the match bonus.
    pub match_threshold: f64,
}

impl AlignmentScoring {
    fn validate(&self) -> Result<(), AnalysisError> {
        let values = [
            ("match_bonus", self.match_bonus),
            ("mismatch_penalty", self.mismatch_penalty),
            ("gap_penalty", self.gap_penalty),
            ("match_threshold", self.match_threshold),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_config(format!(
                    "scoring.{name} must be finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.match_threshold) {
            return Err(AnalysisError::invalid_config(format!(
                "scoring.match_threshold must be within [0, 1], got {}",
                self.match_threshold
            )));
        }
        Ok(())
    }
}

impl Default for AlignmentScoring {
    fn default() -> Self {
        Self {
            match_bonus: 2.0,
            mismatch_penalty: -1.0,
            gap_penalty: -2.0,
            match_threshold: 0.85,
        }
    }
}

/// Windowed search used when the reference dwarfs the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizationConfig {
    /// Localize when `reference_words / transcript_words` exceeds this.
    pub ratio_threshold: f64,
    pub probe_words: usize,
    pub step: usize,
    pub min_score: f64,
    pub tail_slack_words: usize,
}

impl LocalizationConfig {
    fn validate(&self) -> Result<(), AnalysisError> {
        if self.probe_words == 0 || self.step == 0 {
            return Err(AnalysisError::invalid_config(
                "localization.probe_words and localization.step must be >= 1",
            ));
        }
        if !self.ratio_threshold.is_finite() || !self.min_score.is_finite() {
            return Err(AnalysisError::invalid_config(
                "localization thresholds must be finite",
            ));
        }
        Ok(())
    }
}

impl Default for LocalizationConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 10.0,
            probe_words: 50,
            step: 10,
            min_score: 0.4,
            tail_slack_words: 500,
        }
    }
}
