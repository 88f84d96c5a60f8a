//! Terminal setup: log level selection and tracing initialisation.

use commenter_core::VerbositySetting;

pub(crate) fn no_color_env_requested() -> bool {
    std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty())
}

pub(crate) fn is_dumb_terminal() -> bool {
    std::env::var("TERM")
        .map(|value| value.eq_ignore_ascii_case("dumb"))
        .unwrap_or(false)
}

/// Picks the default filter when `RUST_LOG` is unset.
///
/// Priority: quiet flag > verbose count > config verbosity > info.
pub(crate) fn default_log_level(verbose: u8, quiet: bool, config: VerbositySetting) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => match config {
            VerbositySetting::Default => "info",
            VerbositySetting::Verbose => "debug",
            VerbositySetting::Quiet => "error",
            VerbositySetting::Debug => "trace",
        },
        1 => "debug",
        _ => "trace",
    }
}

pub(crate) fn init_tracing(default_level: &str) {
    let no_color = no_color_env_requested() || is_dumb_terminal();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}
