/// Errors raised while turning a badge into a PDF.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("headless browser unavailable: {0}")]
    BrowserUnavailable(String),

    /// The running browser rejected or dropped a command.
    #[error("browser error: {0}")]
    Browser(String),

    #[error("render timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("browser produced no PDF output")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a single print attempt.
#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("printer name is not set (PRINT_PRINTER_NAME)")]
    PrinterNotConfigured,

    #[error("failed to run print command: {0}")]
    Spawn(std::io::Error),

    #[error("print command failed (exit code {exit_code:?}): {stderr}")]
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("print command timed out after {0}s")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}
