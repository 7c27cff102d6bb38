//! `leds` subcommand: list LED class devices under the sysfs root.

use std::path::Path;

use netled_lib::led::{self, Led, SysfsLed};

use super::{Config, LedJson, LedsOutput, Result};

fn collect_leds(config: &Config) -> Result<Vec<LedJson>> {
    let root = config.sysfs_root();
    let names = led::list_leds(&root)?;
    Ok(names
        .into_iter()
        .map(|name| {
            let max_brightness = match SysfsLed::open(&root, &name) {
                Ok(l) => Some(l.max_brightness()),
                Err(e) => {
                    log::debug!("[leds] {e}");
                    None
                }
            };
            let bound_to = config
                .bindings
                .iter()
                .find(|b| b.led == name)
                .map(|b| b.device_name.clone());
            LedJson {
                name,
                max_brightness,
                bound_to,
            }
        })
        .collect())
}

pub(super) fn cmd_leds(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let leds = collect_leds(&config)?;

    if json {
        return super::print_json(&LedsOutput {
            count: leds.len(),
            leds,
        });
    }

    if leds.is_empty() {
        println!("No LEDs found under {}.", config.sysfs_root);
        return Ok(());
    }
    let width = leds.iter().map(|l| l.name.len()).max().unwrap_or(0);
    for l in &leds {
        let max = l
            .max_brightness
            .map(|m| format!("max {m}"))
            .unwrap_or_else(|| "unreadable".into());
        match &l.bound_to {
            Some(dev) if !dev.is_empty() => {
                println!("{:<width$}  {max}  -> {dev}", l.name)
            }
            _ => println!("{:<width$}  {max}", l.name),
        }
    }
    Ok(())
}
