use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::pipeline::defaults::{NeedlemanWunschAligner, NgramRepetitionFinder, WhitespaceTokenizer};
use crate::pipeline::runtime::{ProductionAnalyzer, ProductionAnalyzerParts};
use crate::pipeline::traits::{ProgressSink, RepetitionFinder, SequenceAligner, Tokenizer};

pub struct AnalyzerBuilder {
    config: AnalysisConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    repetition_finder: Option<Box<dyn RepetitionFinder>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    progress_sink: Option<Box<dyn ProgressSink>>,
}

impl AnalyzerBuilder {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            repetition_finder: None,
            sequence_aligner: None,
            progress_sink: None,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_repetition_finder(mut self, repetition_finder: Box<dyn RepetitionFinder>) -> Self {
        self.repetition_finder = Some(repetition_finder);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_progress_sink(mut self, progress_sink: Box<dyn ProgressSink>) -> Self {
        self.progress_sink = Some(progress_sink);
        self
    }

    pub fn build(self) -> Result<ProductionAnalyzer, AnalysisError> {
        self.config.validate()?;

        Ok(ProductionAnalyzer::from_parts(ProductionAnalyzerParts {
            config: self.config,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(WhitespaceTokenizer)),
            repetition_finder: self
                .repetition_finder
                .unwrap_or_else(|| Box::new(NgramRepetitionFinder)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(NeedlemanWunschAligner)),
            progress_sink: self.progress_sink,
        }))
    }
}
