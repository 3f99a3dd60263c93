use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use narration_align::ProductionReport;

pub fn render_checklist(report: &ProductionReport) -> String {
    let summary = &report.summary;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Status: {} (score {:.1}%)",
        report.overall_status,
        report.overall_score * 100.0
    );
    let _ = writeln!(
        out,
        "Accuracy {:.1}% over {} reference words; {} repetition(s) wasting {:.1}s; {} missing section(s) ({} words, ~{} to record)",
        summary.accuracy * 100.0,
        summary
            .aligned_reference_end
            .saturating_sub(summary.aligned_reference_start),
        summary.repetition_count,
        summary.wasted_time_seconds,
        summary.missing_section_count,
        summary.missing_word_count,
        summary.estimated_recording_time
    );

    if report.checklist.is_empty() {
        out.push_str("\nNothing to fix.\n");
        return out;
    }

    out.push('\n');
    for (number, item) in report.checklist.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. [{}] {}", number + 1, item.priority, item.title);
        if let Some(location) = &item.location {
            let _ = writeln!(out, "       at:   {location}");
        }
        if let Some(text) = &item.text {
            let _ = writeln!(out, "       text: \"{}\"", excerpt(text, 120));
        }
        let _ = writeln!(out, "       {}", item.details);
    }
    out
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

pub fn write_checklist(path: Option<&Path>, text: &str) -> Result<(), String> {
    let Some(path) = path else {
        print!("{text}");
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create checklist output directory '{}': {err}",
                parent.display()
            )
        })?;
    }
    fs::write(path, text)
        .map_err(|err| format!("Failed to write checklist '{}': {err}", path.display()))
}
