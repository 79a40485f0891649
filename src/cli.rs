use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

const DEFAULT_CONFIG_PATH: &str = "./portal.jsonc";
const USAGE: &str = "usage: portal-backend [--config <path>] [serve|seed]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Seed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

pub fn cli_options_from_args() -> Result<CliOptions> {
    let mut options = parse_cli_options(env::args().skip(1))?;
    if options.config_path.is_none() {
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            options.config_path = Some(default_path);
        }
    }
    Ok(options)
}

pub fn parse_cli_options<I>(mut args: I) -> Result<CliOptions>
where
    I: Iterator<Item = String>,
{
    let mut config_path = None;
    let mut command = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("missing value for --config"))?;
                config_path = Some(PathBuf::from(value));
            }
            "serve" | "seed" if command.is_some() => {
                return Err(anyhow!("expected at most one command. {USAGE}"));
            }
            "serve" => command = Some(Command::Serve),
            "seed" => command = Some(Command::Seed),
            other => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
        }
    }

    Ok(CliOptions {
        config_path,
        command: command.unwrap_or(Command::Serve),
    })
}
