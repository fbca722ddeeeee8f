#[cfg(not(any(target_os = "macos", unix)))]
compile_error!("Only macos and unix are currently supported");

use bayani::{
    config::{Config, find_config_file},
    controller::Bayani,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = find_config_file()?;
    let config = Config::load(&config_path)?;

    Bayani::new(config).run().await
}
