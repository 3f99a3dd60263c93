use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use narration_align::pipeline::traits::ProgressLevel;
use narration_align::{
    AnalysisConfig, AnalysisError, AnalysisInput, AnalyzerBuilder, ProgressSink, ProgressUpdate,
    TranscriptInput,
};
use serde::Serialize;

#[path = "production_report/checklist_formatter.rs"]
mod checklist_formatter;
#[path = "production_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    /// Human-readable editing checklist.
    Checklist,
}

#[derive(Debug, Parser)]
#[command(name = "production_report")]
#[command(about = "Check a narration transcript against its reference text")]
struct Args {
    /// Reference text file.
    #[arg(long, env = "NARRATION_REPORT_REFERENCE")]
    reference: PathBuf,
    /// Transcript: JSON segments `[{text, start_time, end_time}]`, a JSON
    /// string, or plain text.
    #[arg(long, env = "NARRATION_REPORT_TRANSCRIPT")]
    transcript: PathBuf,
    /// JSON analysis configuration; flags below override it.
    #[arg(long, env = "NARRATION_REPORT_CONFIG")]
    config: Option<PathBuf>,
    /// Output file; stdout when omitted.
    #[arg(long, env = "NARRATION_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(
        long,
        env = "NARRATION_REPORT_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
    #[arg(long, env = "NARRATION_REPORT_MIN_REPEAT_LENGTH")]
    min_repeat_length: Option<usize>,
    #[arg(long, env = "NARRATION_REPORT_MAX_REPEAT_LENGTH")]
    max_repeat_length: Option<usize>,
    #[arg(long, env = "NARRATION_REPORT_SEGMENT_SIZE")]
    segment_size: Option<usize>,
    #[arg(long, env = "NARRATION_REPORT_MIN_GAP_WORDS")]
    min_gap_words: Option<usize>,
    #[arg(long, env = "NARRATION_REPORT_NO_PROGRESS", default_value_t = false)]
    no_progress: bool,
}

#[derive(Debug, Serialize)]
struct ReportMeta {
    generated_at: String,
    tool_version: &'static str,
    reference_path: String,
    transcript_path: String,
    config_path: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a> {
    meta: ReportMeta,
    report: &'a narration_align::ProductionReport,
}

/// Feeds analysis progress into an `indicatif` bar.
struct BarProgressSink {
    bar: ProgressBar,
}

impl ProgressSink for BarProgressSink {
    fn report(&self, update: &ProgressUpdate) -> Result<(), AnalysisError> {
        self.bar.set_position(u64::from(update.percent));
        let message = match &update.message {
            Some(message) => format!("{}: {message}", update.stage.as_str()),
            None => update.stage.as_str().to_string(),
        };
        if update.level == ProgressLevel::Warning {
            self.bar.println(format!("warning: {message}"));
        }
        self.bar.set_message(message);
        Ok(())
    }
}

fn main() {
    narration_align::logging::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    require_path_exists(&args.reference, "Reference text not found.")?;
    require_path_exists(&args.transcript, "Transcript not found.")?;
    let reference_text = fs::read_to_string(&args.reference).map_err(|err| {
        format!(
            "Failed to read reference '{}': {err}",
            args.reference.display()
        )
    })?;
    let transcript = load_transcript(&args.transcript)?;

    let mut builder = AnalyzerBuilder::new(config);
    let progress = if args.no_progress {
        None
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message("starting...");
        builder = builder.with_progress_sink(Box::new(BarProgressSink { bar: bar.clone() }));
        Some(bar)
    };

    let analyzer = builder
        .build()
        .map_err(|err| format!("Invalid analysis configuration: {err}"))?;
    let result = analyzer.analyze(&AnalysisInput {
        reference_text,
        transcript,
    });
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }
    let report = result.map_err(|err| format!("Analysis failed: {err}"))?;

    match args.output_format {
        OutputFormat::Json => {
            let envelope = ReportEnvelope {
                meta: ReportMeta {
                    generated_at: Utc::now().to_rfc3339(),
                    tool_version: env!("CARGO_PKG_VERSION"),
                    reference_path: args.reference.to_string_lossy().into_owned(),
                    transcript_path: args.transcript.to_string_lossy().into_owned(),
                    config_path: args
                        .config
                        .as_ref()
                        .map(|path| path.to_string_lossy().into_owned()),
                },
                report: &report,
            };
            json_report_formatter::write_report(args.out.as_deref(), &envelope)?;
        }
        OutputFormat::Checklist => {
            let text = checklist_formatter::render_checklist(&report);
            checklist_formatter::write_checklist(args.out.as_deref(), &text)?;
        }
    }
    if let Some(out) = &args.out {
        println!("{}", out.display());
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<AnalysisConfig, String> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    if let Some(value) = args.min_repeat_length {
        config.min_repeat_length = value;
    }
    if let Some(value) = args.max_repeat_length {
        config.max_repeat_length = value;
    }
    if let Some(value) = args.segment_size {
        config.segment_size = value;
    }
    if let Some(value) = args.min_gap_words {
        config.min_gap_words = value;
    }
    Ok(config)
}

fn load_transcript(path: &Path) -> Result<TranscriptInput, String> {
    let data = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read transcript '{}': {err}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Ok(TranscriptInput::PlainText(data));
    }
    serde_json::from_str(&data).map_err(|err| {
        format!(
            "Failed to parse transcript JSON '{}': {err}",
            path.display()
        )
    })
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
