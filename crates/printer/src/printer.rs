//! OS print spooler integration.
//!
//! [`LpPrinter`] submits a document with the CUPS `lp` command to the
//! printer named by `PRINT_PRINTER_NAME`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use hub_core::label::LABEL_MEDIA;
use tokio::process::Command;

use crate::error::PrintError;

/// Default upper bound on a single `lp` invocation.
pub const DEFAULT_PRINT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends a rendered document to a physical printer. One call is one attempt.
#[async_trait]
pub trait Printer: Send + Sync {
    async fn print(&self, document: &Path) -> Result<(), PrintError>;
}

/// Printer that shells out to `lp -d <printer>`.
#[derive(Debug, Clone)]
pub struct LpPrinter {
    printer_name: Option<String>,
    program: String,
    timeout: Duration,
}

impl LpPrinter {
    /// Create a printer for the given queue name. `None` means unconfigured:
    /// every attempt fails with [`PrintError::PrinterNotConfigured`].
    pub fn new(printer_name: Option<String>, timeout: Duration) -> Self {
        Self {
            printer_name: printer_name.filter(|n| !n.trim().is_empty()),
            program: "lp".to_string(),
            timeout,
        }
    }

    /// Use a different spooler binary (e.g. a wrapper script).
    #[cfg(test)]
    fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    #[cfg(test)]
    fn printer_name(&self) -> Option<&str> {
        self.printer_name.as_deref()
    }
}

#[async_trait]
impl Printer for LpPrinter {
    async fn print(&self, document: &Path) -> Result<(), PrintError> {
        let printer = self
            .printer_name
            .as_deref()
            .ok_or(PrintError::PrinterNotConfigured)?;

        let media = format!("media={LABEL_MEDIA}");
        let mut cmd = Command::new(&self.program);
        cmd.args(["-d", printer, "-o", media.as_str()])
            .arg(document)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PrintError::Timeout(self.timeout.as_secs()))?
            .map_err(PrintError::Spawn)?;

        if !output.status.success() {
            return Err(PrintError::CommandFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(
            printer,
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "Document submitted to spooler",
        );
        Ok(())
    }
}
