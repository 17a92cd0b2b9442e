//! Print retry policy.
//!
//! [`PrintDispatcher`] calls a [`Printer`] up to `max_attempts` times in a
//! row, one attempt at a time with no delay between them. The first
//! success ends the sequence. Every error counts as a failed attempt,
//! including an unconfigured printer.

use std::path::Path;
use std::sync::Arc;

use crate::error::PrintError;
use crate::printer::Printer;

/// Attempts made per job unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Outcome of a print sequence in which every attempt failed.
#[derive(Debug)]
pub struct DispatchFailure {
    /// Attempts actually made.
    pub attempts: u32,
    /// Error from the last attempt.
    pub error: PrintError,
}

pub struct PrintDispatcher {
    printer: Arc<dyn Printer>,
    max_attempts: u32,
}

impl PrintDispatcher {
    /// `max_attempts` is clamped to at least one.
    pub fn new(printer: Arc<dyn Printer>, max_attempts: u32) -> Self {
        Self {
            printer,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Print `document`, retrying on failure.
    ///
    /// Returns the number of attempts used on success.
    pub async fn dispatch(&self, document: &Path) -> Result<u32, DispatchFailure> {
        let mut attempt = 1;
        loop {
            match self.printer.print(document).await {
                Ok(()) => {
                    tracing::info!(attempt, "Print succeeded");
                    return Ok(attempt);
                }
                Err(error) => {
                    let give_up = attempt >= self.max_attempts;
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        give_up,
                        "Print attempt failed",
                    );
                    if give_up {
                        return Err(DispatchFailure {
                            attempts: attempt,
                            error,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use super::*;

    /// Fails the first `failures` calls, then succeeds.
    struct FlakyPrinter {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyPrinter {
        fn new(failures: u32) -> Arc<Self> {
            Arc::new(Self {
                failures,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Printer for FlakyPrinter {
        async fn print(&self, _document: &Path) -> Result<(), PrintError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n <= self.failures {
                Err(PrintError::Other(format!("paper jam #{n}")))
            } else {
                Ok(())
            }
        }
    }

    struct UnconfiguredPrinter {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Printer for UnconfiguredPrinter {
        async fn print(&self, _document: &Path) -> Result<(), PrintError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(PrintError::PrinterNotConfigured)
        }
    }

    #[tokio::test]
    async fn first_attempt_success() {
        let printer = FlakyPrinter::new(0);
        let dispatcher = PrintDispatcher::new(printer.clone(), DEFAULT_MAX_ATTEMPTS);

        assert_eq!(dispatcher.dispatch(Path::new("a.pdf")).await.unwrap(), 1);
        assert_eq!(printer.calls(), 1);
    }

    #[tokio::test]
    async fn success_on_second_attempt_stops_retrying() {
        let printer = FlakyPrinter::new(1);
        let dispatcher = PrintDispatcher::new(printer.clone(), DEFAULT_MAX_ATTEMPTS);

        assert_eq!(dispatcher.dispatch(Path::new("a.pdf")).await.unwrap(), 2);
        assert_eq!(printer.calls(), 2);
    }

    #[tokio::test]
    async fn persistent_failure_uses_exactly_three_attempts() {
        let printer = FlakyPrinter::new(u32::MAX);
        let dispatcher = PrintDispatcher::new(printer.clone(), DEFAULT_MAX_ATTEMPTS);

        let failure = dispatcher.dispatch(Path::new("a.pdf")).await.unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(printer.calls(), 3);
        assert_eq!(failure.error.to_string(), "paper jam #3");
    }

    #[tokio::test]
    async fn unconfigured_printer_still_uses_every_attempt() {
        let printer = Arc::new(UnconfiguredPrinter {
            calls: AtomicU32::new(0),
        });
        let dispatcher = PrintDispatcher::new(printer.clone(), DEFAULT_MAX_ATTEMPTS);

        let failure = dispatcher.dispatch(Path::new("a.pdf")).await.unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert_eq!(printer.calls.load(Ordering::SeqCst), 3);
        assert_matches!(failure.error, PrintError::PrinterNotConfigured);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let dispatcher = PrintDispatcher::new(FlakyPrinter::new(0), 0);
        assert_eq!(dispatcher.max_attempts(), 1);
    }
}
