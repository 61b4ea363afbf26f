#![deny(missing_docs)]
//! Shared logging utilities for the CloudRes workspace.
//!
//! This crate provides the `cloudres_*` logging macros used by the engine and
//! the app, and a minimal test initializer for the global logger.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! cloudres_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! cloudres_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! cloudres_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! cloudres_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! cloudres_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Truncates `text` to at most `max_chars` characters for log output,
/// appending an ellipsis when anything was cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Environment variable that overrides the level used by [`initialize_for_tests`].
pub const TEST_LOG_ENV: &str = "CLOUDRES_TEST_LOG";

/// Initializes a simple terminal logger for use in tests.
///
/// The level defaults to debug in debug builds and info otherwise; set
/// `CLOUDRES_TEST_LOG` (for example to `trace` or `off`) to change it.
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = test_level(std::env::var(TEST_LOG_ENV).ok().as_deref());

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn test_level(requested: Option<&str>) -> log::LevelFilter {
    match requested.and_then(|value| value.trim().parse().ok()) {
        Some(level) => level,
        None if cfg!(debug_assertions) => log::LevelFilter::Debug,
        None => log::LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use super::{preview, test_level};

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("A\tB", 10), "A\tB");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("ééééé", 2), "éé...");
    }

    #[test]
    fn test_level_reads_override() {
        assert_eq!(test_level(Some(" warn ")), log::LevelFilter::Warn);
        assert_eq!(test_level(Some("OFF")), log::LevelFilter::Off);
        let fallback = test_level(Some("chatty"));
        assert_eq!(fallback, test_level(None));
    }
}
