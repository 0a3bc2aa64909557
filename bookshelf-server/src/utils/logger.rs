//! Logging Infrastructure
//!
//! Console output plus optional daily rotating files:
//! - `app/`: application logs, deleted after [`APP_LOG_RETENTION_DAYS`]
//! - `audit/`: committed placements, compensations, payment flips (kept)
//! - `security/`: OTP failures (kept)

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{Metadata, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter::filter_fn, fmt, prelude::*};

/// Days an application log file is kept
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync>;

/// Delete `app.YYYY-MM-DD.log` files older than `retention_days`.
///
/// Returns how many files were removed.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: i64) -> anyhow::Result<usize> {
    use chrono::{Local, NaiveDate, TimeZone};

    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Local::now() - chrono::Duration::days(retention_days);
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let day = name
            .strip_prefix("app.")
            .and_then(|d| d.strip_suffix(".log"))
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|d| Local.from_local_datetime(&d).single());

        if let Some(day) = day
            && day < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

fn rolling(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;
    Ok(RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)?)
}

fn file_layer<S>(
    json: bool,
    appender: RollingFileAppender,
    keep: fn(&Metadata<'_>) -> bool,
) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let base = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender));

    if json {
        base.json()
            .with_current_span(true)
            .with_filter(filter_fn(keep))
            .boxed()
    } else {
        base.with_filter(filter_fn(keep)).boxed()
    }
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` wins when set
/// * `json_format` - JSON lines instead of the pretty format
/// * `log_dir` - Optional directory for file logging (e.g., Some("./work_dir/logs"))
///
/// Must be called inside a tokio runtime when `log_dir` is set: it spawns
/// the hourly cleanup task.
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console: BoxedLayer<_> = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut layers = vec![console];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);

        layers.push(file_layer(
            json_format,
            rolling(&log_dir.join("app"), "app")?,
            |meta| meta.target() != "audit" && meta.target() != "security",
        ));
        layers.push(file_layer(
            json_format,
            rolling(&log_dir.join("audit"), "audit")?,
            |meta| meta.target() == "audit",
        ));
        layers.push(file_layer(
            json_format,
            rolling(&log_dir.join("security"), "security")?,
            |meta| meta.target() == "security",
        ));

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir, APP_LOG_RETENTION_DAYS) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Audit log helper - records committed business operations
///
/// Written to `audit/audit.YYYY-MM-DD.log`, never cleaned up.
///
/// # Examples
/// ```ignore
/// audit_log!("a@example.com", "place_order", "order:ORDER_1");
/// audit_log!("a@example.com", "payment_paid", "order:ORDER_1", "3 lines");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($customer:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            customer = $customer,
            action = $action,
            resource = $resource,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($customer:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            customer = $customer,
            action = $action,
            resource = $resource,
            details = $details,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

/// Security log helper
///
/// # Examples
/// ```ignore
/// security_log!(WARN, "otp_invalid", email = "a@example.com");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}
