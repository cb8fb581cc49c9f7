use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): every payload yielded a key
/// - `Failure` (1): at least one payload yielded no key
/// - `Error` (2): internal error (unreadable input, bad config, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every payload yielded a key.
    Success,
    /// At least one payload exhausted all strategies.
    Failure,
    /// Command failed due to internal error (unreadable input, config error, etc.).
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
