#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the accident dashboard API server.

use accident_dash_dataset::config::AppConfig;
use accident_dash_source::LoadOptions;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = AppConfig::discover(None)?;
    accident_dash_server::run_server(config, LoadOptions::default()).await?;
    Ok(())
}
