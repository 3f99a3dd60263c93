pub mod alignment;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod types;

pub use alignment::report::{OverallStatus, Priority, ProductionReport};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use pipeline::builder::AnalyzerBuilder;
pub use pipeline::runtime::ProductionAnalyzer;
pub use pipeline::traits::{
    ProgressSink, ProgressUpdate, RepetitionFinder, SequenceAligner, Tokenizer,
};
pub use types::{AlignmentPoint, AnalysisInput, MatchType, TimedWord, TranscriptInput};

/// Run a full analysis with the default components.
pub fn analyze(
    reference_text: &str,
    transcript: TranscriptInput,
    config: &AnalysisConfig,
) -> Result<ProductionReport, AnalysisError> {
    let analyzer = AnalyzerBuilder::new(config.clone()).build()?;
    analyzer.analyze(&AnalysisInput {
        reference_text: reference_text.to_string(),
        transcript,
    })
}
