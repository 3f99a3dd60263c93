use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "narration_align=info,production_report=info";

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default filter and `RUST_LOG_FORMAT=json` switches
/// to JSON lines. Repeated calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let is_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if is_json {
        let _ = subscriber.json().try_init();
    } else {
        let _ = subscriber.try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
    }

    #[test]
    fn default_filter_covers_library_and_binary() {
        let directives: Vec<&str> = DEFAULT_FILTER.split(',').collect();
        assert_eq!(
            directives,
            vec!["narration_align=info", "production_report=info"]
        );
        for directive in directives {
            assert!(
                directive.parse::<tracing_subscriber::filter::Directive>().is_ok(),
                "{directive} should parse"
            );
        }
        let filter = format!("{:?}", EnvFilter::new(DEFAULT_FILTER));
        assert!(filter.contains("narration_align"));
        assert!(filter.contains("production_report"));
    }
}
