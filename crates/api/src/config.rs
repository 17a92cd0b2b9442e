use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for a check-in laptop. In production,
/// override via environment variables or a `.env` file.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8787`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Printing pipeline settings.
    pub agent: AgentConfig,
}

/// Settings for the renderer, printer and queue.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// CUPS queue name. `None` makes every print attempt fail.
    pub printer_name: Option<String>,
    /// Explicit Chromium executable; auto-detected when `None`.
    pub chromium_path: Option<PathBuf>,
    /// Scratch directory for label HTML and PDFs.
    pub work_dir: PathBuf,
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub render_timeout: Duration,
    pub print_timeout: Duration,
    /// How long finished jobs stay visible to `GET /jobs/{id}`.
    pub job_retention: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `8787`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    ///
    /// See [`AgentConfig::from_env`] for the printing settings.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 8787);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            agent: AgentConfig::from_env(),
        }
    }
}

impl AgentConfig {
    /// | Env Var               | Default               |
    /// |-----------------------|-----------------------|
    /// | `PRINT_PRINTER_NAME`  | unset                 |
    /// | `CHROMIUM_PATH`       | auto-detect           |
    /// | `LABEL_WORK_DIR`      | `$TMPDIR/print-agent` |
    /// | `QUEUE_CAPACITY`      | `256`                 |
    /// | `PRINT_MAX_ATTEMPTS`  | `3`                   |
    /// | `RENDER_TIMEOUT_SECS` | `30`                  |
    /// | `PRINT_TIMEOUT_SECS`  | `30`                  |
    /// | `JOB_RETENTION_SECS`  | `3600`                |
    pub fn from_env() -> Self {
        let printer_name = std::env::var("PRINT_PRINTER_NAME")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let chromium_path = std::env::var("CHROMIUM_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let work_dir = std::env::var("LABEL_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("print-agent"));

        Self {
            printer_name,
            chromium_path,
            work_dir,
            queue_capacity: env_or(
                "QUEUE_CAPACITY",
                hub_worker::queue::DEFAULT_QUEUE_CAPACITY,
            ),
            max_attempts: env_or(
                "PRINT_MAX_ATTEMPTS",
                hub_printer::dispatcher::DEFAULT_MAX_ATTEMPTS,
            ),
            render_timeout: Duration::from_secs(env_or("RENDER_TIMEOUT_SECS", 30)),
            print_timeout: Duration::from_secs(env_or(
                "PRINT_TIMEOUT_SECS",
                hub_printer::printer::DEFAULT_PRINT_TIMEOUT.as_secs(),
            )),
            job_retention: Duration::from_secs(env_or(
                "JOB_RETENTION_SECS",
                hub_worker::retention::DEFAULT_RETENTION.as_secs(),
            )),
        }
    }
}

/// Read and parse an env var, falling back to `default` when unset.
///
/// Panics on a value that does not parse; misconfiguration should fail fast.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
