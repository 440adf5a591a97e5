use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use crate::config::General;
use crate::errors::LoggerError;

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {m}{n}";

/// Sets up logging to file, and to stdout if configured
///
/// # Arguments
///
/// * 'general' - general configuration holding log path, level and stdout flag
pub fn setup_logger(general: &General) -> Result<Handle, LoggerError> {
    Ok(log4rs::init_config(build_config(general)?)?)
}

/// Builds the log4rs configuration without installing it
///
/// # Arguments
///
/// * 'general' - general configuration holding log path, level and stdout flag
fn build_config(general: &General) -> Result<Config, LoggerError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)?;

    let mut builder = Config::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    Ok(builder.build(root.build(general.log_level))?)
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use super::*;

    fn general(log_path: String, log_to_stdout: bool) -> General {
        General {
            log_path,
            log_level: LevelFilter::Debug,
            log_to_stdout,
            poll_interval_secs: 900,
            save_attempts: 3,
            save_backoff_secs: 2,
        }
    }

    #[test]
    fn builds_file_and_console_appenders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("airwatch.log").to_string_lossy().to_string();

        let config = build_config(&general(path.clone(), true)).unwrap();
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), LevelFilter::Debug);

        let config = build_config(&general(path, false)).unwrap();
        assert_eq!(config.appenders().len(), 1);
    }
}
