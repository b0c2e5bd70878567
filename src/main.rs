use asset_prep::config::PipelineConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = match PipelineConfig::load_from_env_or_default() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("config: {err}");
            std::process::exit(1);
        }
    };

    match asset_prep::run(&cfg) {
        Ok(summary) => {
            info!(
                "done: assets={} preminified={} templates={} out_dir={}",
                summary.assets, summary.preminified, summary.templates, summary.out_dir
            );
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}
