use std::io::Write;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use igdate_core::config::{self, Config, DEFAULT_CONFIG_FILE};

#[derive(Parser)]
#[command(name = "igdate", version, about = "Restore capture dates on Instagram data export media")]
struct Cli {
    /// Base directory of the Instagram data export
    base_dir: PathBuf,

    /// Path to the configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Logging level: DEBUG, INFO, WARNING, ERROR or CRITICAL (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let level = match cli.log_level.as_deref() {
        Some(name) => config::parse_log_level(name)?,
        None => config.level_filter()?,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .init();

    if !cli.base_dir.is_dir() {
        bail!("Base directory not found: {}", cli.base_dir.display());
    }

    let t_total = std::time::Instant::now();
    let summary = igdate_core::run_batch(&cli.base_dir, &config);
    log::info!(
        "Done! {} page(s) processed, {} skipped ({:.2}s)",
        summary.documents_processed,
        summary.documents_skipped,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
