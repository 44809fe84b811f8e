use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Logging settings, forwarded verbatim to spawned workers.
#[derive(Copy, Clone, Debug)]
pub struct LogOptions {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LogOptions {
    /// Command-line arguments reproducing these settings.
    pub fn to_args(self) -> Vec<String> {
        vec![
            "--log-format".to_string(),
            value_name(self.format),
            "--log-level".to_string(),
            value_name(self.level),
        ]
    }
}

fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

/// Install the stderr subscriber. Worker processes tag their lines with
/// `role` so interleaved output stays attributable.
pub fn init_logging(options: LogOptions, role: &'static str) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(options.level.as_filter())
        .with_ansi(false)
        .with_target(false);

    let installed = match options.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(role, pid = std::process::id(), "logging initialised");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_round_trip_through_args() {
        let options = LogOptions {
            format: LogFormat::Json,
            level: LogLevel::Debug,
        };
        assert_eq!(
            options.to_args(),
            vec!["--log-format", "json", "--log-level", "debug"]
        );
    }

    #[test]
    fn off_disables_everything() {
        assert_eq!(LogLevel::Off.as_filter(), LevelFilter::OFF);
    }
}
