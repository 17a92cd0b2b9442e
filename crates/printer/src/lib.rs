//! Badge rendering and printing.
//!
//! - [`renderer`] turns a badge payload into a PDF via one shared headless
//!   Chromium driven over the DevTools protocol.
//! - [`printer`] hands a PDF to the OS print spooler.
//! - [`dispatcher`] wraps a [`printer::Printer`] with the retry policy.
//!
//! Both external tools sit behind traits so the queue worker can be
//! exercised without a browser or a printer attached.

pub mod dispatcher;
pub mod error;
pub mod printer;
pub mod renderer;

pub use dispatcher::{DispatchFailure, PrintDispatcher};
pub use error::{PrintError, RenderError};
pub use printer::{LpPrinter, Printer};
pub use renderer::{
    BrowserLauncher, BrowserSession, ChromiumRenderer, LabelRenderer, RenderedLabel,
    RendererConfig,
};
