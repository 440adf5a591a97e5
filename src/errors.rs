use std::io::ErrorKind;
use thiserror::Error;

/// ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION, raised on Windows while another
/// process holds the file open
#[cfg(windows)]
const LOCK_OS_ERRORS: [i32; 2] = [32, 33];

#[derive(Error, Debug)]
#[error("ConfigError: {0}")]
pub struct ConfigError(pub String);
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(format!("file error: {}", e))
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(format!("toml error: {}", e))
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}

#[derive(Error, Debug)]
#[error("LoggerError: {0}")]
pub struct LoggerError(pub String);
impl From<std::io::Error> for LoggerError {
    fn from(e: std::io::Error) -> Self {
        LoggerError(format!("log file error: {}", e))
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for LoggerError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        LoggerError(e.to_string())
    }
}
impl From<log::SetLoggerError> for LoggerError {
    fn from(e: log::SetLoggerError) -> Self {
        LoggerError(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("HistoryError::File: {0}")]
    File(#[from] std::io::Error),
    #[error("HistoryError::Csv: {0}")]
    Csv(#[from] csv::Error),
}

impl HistoryError {
    /// True if the error indicates the history file is held by another process
    /// and the operation may succeed if tried again
    pub fn is_contention(&self) -> bool {
        let e = match self {
            HistoryError::File(e) => e,
            HistoryError::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(e) => e,
                _ => return false,
            },
        };

        is_locked(e)
    }
}

fn is_locked(e: &std::io::Error) -> bool {
    #[cfg(windows)]
    {
        if e.raw_os_error().is_some_and(|code| LOCK_OS_ERRORS.contains(&code)) {
            return true;
        }
    }

    matches!(e.kind(), ErrorKind::PermissionDenied | ErrorKind::WouldBlock | ErrorKind::ResourceBusy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_contention() {
        let e = HistoryError::from(std::io::Error::new(ErrorKind::PermissionDenied, "locked"));
        assert!(e.is_contention());
    }

    #[test]
    fn locked_csv_io_error_is_contention() {
        let io = std::io::Error::new(ErrorKind::WouldBlock, "locked");
        let e = HistoryError::from(csv::Error::from(io));
        assert!(e.is_contention());
    }

    #[cfg(windows)]
    #[test]
    fn sharing_and_lock_violations_are_contention() {
        for code in LOCK_OS_ERRORS {
            let e = HistoryError::from(std::io::Error::from_raw_os_error(code));
            assert!(e.is_contention(), "os error {}", code);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn raw_would_block_is_contention() {
        // EAGAIN
        let e = HistoryError::from(std::io::Error::from_raw_os_error(11));
        assert!(e.is_contention());
    }

    #[test]
    fn missing_directory_is_not_contention() {
        let e = HistoryError::from(std::io::Error::new(ErrorKind::NotFound, "gone"));
        assert!(!e.is_contention());
    }
}
