use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
    registry::LookupSpan,
};

/// Target prefix shared by the library and the binary.
const APP_TARGET: &str = "automd";

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Passes only events emitted by this tool, at or above `level`.
fn app_targets(level: LevelFilter) -> Targets {
    Targets::new().with_target(APP_TARGET, level)
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(app_targets(level))
}

/// Installs the global subscriber. `-q` silences the console only; a log file
/// still records events at the `-v` level.
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(app_targets(level_for(verbosity, quiet)));

    let file_layer = match log_file {
        Some(path) => Some(file_layer(File::create(&path)?, level_for(verbosity, false))),
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| CliError::Other(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use automd::core::io::pdb::StructureFile;
    use automd::core::models::residue::ResidueName;
    use automd::engine::dedup::resolve_duplicate_names;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    const DUPLICATED: &str = "\
ATOM      1  C   MOL     1       0.000   0.000   0.000  1.00  0.00           C
ATOM      2  C   MOL     1       1.000   0.000   0.000  1.00  0.00           C
";

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    fn capture_to_file(level: LevelFilter, body: impl FnOnce()) -> String {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("prep.log");
        let file = File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::registry().with(file_layer(file, level));

        tracing::subscriber::with_default(subscriber, body);

        std::fs::read_to_string(log_path).unwrap()
    }

    fn rename_duplicates() {
        let structure = StructureFile::parse_str(DUPLICATED).unwrap();
        let residue = ResidueName::normalize("LIG").unwrap();
        resolve_duplicate_names(&structure, &residue, 10).unwrap();
    }

    #[test]
    fn verbosity_count_selects_level() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(3, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!("This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn log_file_records_rename_events_with_their_target() {
        let content = capture_to_file(LevelFilter::DEBUG, rename_duplicates);

        assert!(content.contains("Renaming duplicate atom"));
        assert!(content.contains("automd::engine::dedup"));
        assert!(content.contains("DEBUG"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    #[serial]
    fn log_file_follows_the_verbosity_level() {
        let content = capture_to_file(level_for(1, false), rename_duplicates);
        assert!(!content.contains("Renaming duplicate atom"));
    }

    #[test]
    #[serial]
    fn events_from_other_crates_are_filtered_out() {
        let content = capture_to_file(LevelFilter::TRACE, || {
            warn!(target: "hyper::proto", "connection reset");
            warn!("Structural file has no atom records");
        });

        assert!(!content.contains("connection reset"));
        assert!(content.contains("Structural file has no atom records"));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
