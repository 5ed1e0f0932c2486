use super::args::*;

pub mod config;
pub mod demo;
pub mod eligible;

use ap2_core::Ap2Config;
use std::path::Path;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Eligible(args) => eligible::run(args),
        Command::Demo(args) => demo::run(args, config).await,
        Command::Config => config::run(&config),
    }
}

/// Config file when given, environment otherwise.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Ap2Config> {
    Ok(match path {
        Some(path) => Ap2Config::from_yaml_file(path)?,
        None => Ap2Config::from_env(),
    })
}
