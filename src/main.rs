use infoapi::datatype::{register_builtins, InfoValue, TimeInfo};
use infoapi::interface::InfoApi;
use infoapi::settings::Settings;
use infoapi::{InfoApiError, Result};

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .map_err(|e| InfoApiError::Config(e.to_string()))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    debug!(?settings, "settings loaded");

    let api = InfoApi::global();
    if settings.register_builtins {
        register_builtins(api)?;
        info!("registered {} time infos", api.infos_of::<TimeInfo>().len());
    }

    let names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        for handle in api.infos_of::<TimeInfo>() {
            println!(
                "{:<24} {:<8} {}",
                handle.name().unwrap_or_default(),
                handle.child().name(),
                handle.metadata_value("description").unwrap_or_default()
            );
        }
        return Ok(());
    }

    let now = InfoValue::new(TimeInfo::now());
    for name in &names {
        match api.resolve(&now, name) {
            Some(value) => println!("{} = {}", name, value),
            None => println!("{} = <missing>", name),
        }
    }
    Ok(())
}
