use anyhow::Result;
use log::LevelFilter;

use cytoclass::config::TrainConfig;
use cytoclass::pipeline;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Info)
        .parse_env(env_logger::Env::default().filter_or("CYTOCLASS_LOG", "info"))
        .init();

    let config = TrainConfig::default();
    pipeline::run(&config)?;
    Ok(())
}
