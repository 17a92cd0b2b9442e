//! Badge renderer backed by one shared headless Chromium.
//!
//! The browser is launched on the first render and reused by every job
//! after that. Each job opens a fresh page, loads the label HTML straight
//! into it, prints it to PDF and closes the page again. Only the PDF
//! touches disk; the returned file belongs to the caller.
//!
//! A browser that has died (crash, killed process, wedged render) is
//! dropped and the next job launches a new one. [`LabelRenderer::shutdown`]
//! closes the browser before the process exits.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::error::CdpError;
use futures::StreamExt;
use hub_core::badge::BadgePayload;
use hub_core::label::{render_label_html, LABEL_HEIGHT_MM, LABEL_WIDTH_MM};
use hub_core::types::JobId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::RenderError;

const MM_PER_INCH: f64 = 25.4;

/// Grace period for the CDP event loop to wind down after `Browser.close`.
const HANDLER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A rendered label on disk.
#[derive(Debug, Clone)]
pub struct RenderedLabel {
    pub path: PathBuf,
}

/// Turns a validated badge into a printable document.
#[async_trait]
pub trait LabelRenderer: Send + Sync {
    async fn render(
        &self,
        job_id: JobId,
        payload: &BadgePayload,
    ) -> Result<RenderedLabel, RenderError>;

    /// Release any shared browser resources. Called once on process shutdown.
    async fn shutdown(&self) {}
}

/// A running browser that can print HTML to PDF.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    /// Print one HTML document and return the PDF bytes.
    async fn print_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError>;

    /// `false` once the browser connection is gone.
    fn is_alive(&self) -> bool;

    async fn close(self: Box<Self>);
}

/// Starts browser sessions for [`ChromiumRenderer`].
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError>;
}

/// Settings for [`ChromiumRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Explicit browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// Scratch directory for rendered PDFs and the browser profile.
    pub work_dir: PathBuf,
    /// Upper bound on a browser launch and on a single render.
    pub timeout: Duration,
}

pub struct ChromiumRenderer {
    work_dir: PathBuf,
    timeout: Duration,
    launcher: Arc<dyn BrowserLauncher>,
    /// The shared browser. `None` until the first render, and again after
    /// the browser died or was shut down.
    session: Mutex<Option<Box<dyn BrowserSession>>>,
}

impl ChromiumRenderer {
    /// Renderer driving a real Chromium over the DevTools protocol.
    pub fn new(config: RendererConfig) -> Self {
        let launcher = CdpLauncher {
            executable: config.executable.clone(),
            profile_dir: config.work_dir.join("chromium-profile"),
            launch_timeout: config.timeout,
        };
        Self::with_launcher(config, Arc::new(launcher))
    }

    pub fn with_launcher(config: RendererConfig, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            work_dir: config.work_dir,
            timeout: config.timeout,
            launcher,
            session: Mutex::new(None),
        }
    }

    /// Take the shared session out of `slot`, launching one if there is
    /// none or the previous browser has died.
    async fn checkout(
        &self,
        slot: &mut Option<Box<dyn BrowserSession>>,
    ) -> Result<Box<dyn BrowserSession>, RenderError> {
        match slot.take() {
            Some(session) if session.is_alive() => return Ok(session),
            Some(dead) => {
                tracing::warn!("Headless browser died, relaunching");
                dead.close().await;
            }
            None => {}
        }

        let session = tokio::time::timeout(self.timeout, self.launcher.launch())
            .await
            .map_err(|_| {
                RenderError::BrowserUnavailable(format!(
                    "launch timed out after {:?}",
                    self.timeout
                ))
            })??;
        tracing::info!("Headless browser session started");
        Ok(session)
    }

    async fn write_pdf(&self, job_id: JobId, pdf: &[u8]) -> Result<PathBuf, RenderError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        let path = self.work_dir.join(format!("{job_id}.pdf"));
        if let Err(e) = tokio::fs::write(&path, pdf).await {
            remove_quietly(&path).await;
            return Err(e.into());
        }
        Ok(path)
    }
}

#[async_trait]
impl LabelRenderer for ChromiumRenderer {
    async fn render(
        &self,
        job_id: JobId,
        payload: &BadgePayload,
    ) -> Result<RenderedLabel, RenderError> {
        let html = render_label_html(payload);

        let mut slot = self.session.lock().await;
        let session = self.checkout(&mut slot).await?;

        let printed = tokio::time::timeout(self.timeout, session.print_pdf(&html)).await;

        // A timed-out browser may be wedged mid-command; start fresh next job.
        let pdf = match printed {
            Ok(result) => {
                *slot = Some(session);
                result?
            }
            Err(_) => {
                tracing::warn!(%job_id, "Render timed out, closing browser");
                session.close().await;
                return Err(RenderError::Timeout(self.timeout));
            }
        };
        drop(slot);

        if pdf.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        let path = self.write_pdf(job_id, &pdf).await?;
        tracing::debug!(%job_id, pdf = %path.display(), bytes = pdf.len(), "Label rendered");
        Ok(RenderedLabel { path })
    }

    async fn shutdown(&self) {
        if let Some(session) = self.session.lock().await.take() {
            session.close().await;
            tracing::info!("Headless browser session closed");
        }
    }
}

// ---------------------------------------------------------------------------
// Chromium over CDP
// ---------------------------------------------------------------------------

/// Launches Chromium with a dedicated profile directory.
struct CdpLauncher {
    executable: Option<PathBuf>,
    profile_dir: PathBuf,
    launch_timeout: Duration,
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, RenderError> {
        tokio::fs::create_dir_all(&self.profile_dir).await?;

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&self.profile_dir)
            .no_sandbox()
            .launch_timeout(self.launch_timeout);
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder
            .build()
            .map_err(|e| RenderError::BrowserUnavailable(format!("{e}; set CHROMIUM_PATH")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::BrowserUnavailable(e.to_string()))?;

        // The connection is driven by polling the handler; the stream ends
        // when the browser goes away.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "Browser event error");
                }
            }
            tracing::debug!("Browser connection closed");
        });

        tracing::info!(
            profile_dir = %self.profile_dir.display(),
            executable = ?self.executable,
            "Chromium launched",
        );

        Ok(Box::new(CdpSession {
            browser,
            handler,
            profile_dir: self.profile_dir.clone(),
        }))
    }
}

struct CdpSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
}

#[async_trait]
impl BrowserSession for CdpSession {
    async fn print_pdf(&self, html: &str) -> Result<Vec<u8>, RenderError> {
        let page = self.browser.new_page("about:blank").await.map_err(cdp)?;

        let printed: Result<Vec<u8>, CdpError> = async {
            page.set_content(html).await?;
            page.pdf(label_pdf_params()).await
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close browser page");
        }
        printed.map_err(cdp)
    }

    fn is_alive(&self) -> bool {
        !self.handler.is_finished()
    }

    async fn close(self: Box<Self>) {
        let CdpSession {
            mut browser,
            handler,
            profile_dir,
        } = *self;

        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser");
        }
        if let Err(e) = browser.wait().await {
            tracing::warn!(error = %e, "Failed to reap browser process");
        }
        if tokio::time::timeout(HANDLER_SHUTDOWN_TIMEOUT, handler)
            .await
            .is_err()
        {
            tracing::warn!("Browser event loop did not stop in time");
        }
        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            tracing::debug!(error = %e, "Failed to remove browser profile");
        }
    }
}

/// Paper size matching the label stock, no margins.
fn label_pdf_params() -> PrintToPdfParams {
    PrintToPdfParams {
        paper_width: Some(f64::from(LABEL_WIDTH_MM) / MM_PER_INCH),
        paper_height: Some(f64::from(LABEL_HEIGHT_MM) / MM_PER_INCH),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        print_background: Some(true),
        prefer_css_page_size: Some(true),
        ..Default::default()
    }
}

fn cdp(e: CdpError) -> RenderError {
    RenderError::Browser(e.to_string())
}

/// Delete a file, ignoring "not found" and logging anything else.
async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}
