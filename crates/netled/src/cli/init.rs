//! `init` subcommand: write a starter config file.

use std::path::{Path, PathBuf};

use netled_lib::NetledError;
use netled_lib::config::Binding;

use super::{Config, Result};

/// Parse `LED=IFACE`. The interface may be empty to leave the LED unbound.
fn parse_bind(spec: &str) -> Result<Binding> {
    match spec.split_once('=') {
        Some((led, device)) if !led.trim().is_empty() => {
            Ok(Binding::new(led.trim(), device.trim()))
        }
        _ => Err(NetledError::Config(format!(
            "invalid --bind \"{spec}\" (expected LED=IFACE)"
        ))),
    }
}

fn build_config(binds: &[String]) -> Result<Config> {
    let bindings = binds
        .iter()
        .map(|b| parse_bind(b))
        .collect::<Result<Vec<_>>>()?;
    let config = Config {
        bindings,
        ..Config::default()
    };
    if let Err(errors) = config.validate() {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(NetledError::Config(joined.join("; ")));
    }
    Ok(config)
}

pub(super) fn cmd_init(binds: &[String], force: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = build_config(binds)?;
    let path: PathBuf = match custom_path {
        Some(p) => p.to_path_buf(),
        None => Config::path().ok_or_else(|| NetledError::Config("no config directory".into()))?,
    };
    if path.exists() && !force {
        return Err(NetledError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    match custom_path {
        Some(p) => config.save_to(p)?,
        None => config.save()?,
    }
    println!(
        "Wrote {} ({} binding(s))",
        path.display(),
        config.bindings.len()
    );
    Ok(())
}
