use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Console on stdout plus a plain-text file at `{log_dir}/mail_drafter.log`.
///
/// Keep the returned guard alive until exit, dropping it flushes the file writer.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
	std::fs::create_dir_all(log_dir).with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

	let file_appender = tracing_appender::rolling::never(log_dir, "mail_drafter.log");
	let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

	let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
		.with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stdout))
		.try_init()
		.context("Failed to install tracing subscriber")?;

	Ok(guard)
}
