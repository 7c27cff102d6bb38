//! `status` subcommand: show interfaces and how configured bindings resolve.

use std::path::Path;

use netled_lib::mode::Mode;
use netled_lib::netdev::{DeviceRegistry, NetDevice, SysfsRegistry};

use super::{
    BindingStatusJson, Config, InterfaceJson, Result, StatusOutput, kv, kv_indent, kv_width,
};

fn collect_interfaces(devices: &SysfsRegistry) -> Vec<InterfaceJson> {
    let names = match devices.list() {
        Ok(names) => names,
        Err(e) => {
            log::warn!(
                "[status] cannot list {}: {e}",
                devices.root().join("net").display()
            );
            return Vec::new();
        }
    };
    names
        .into_iter()
        .map(|name| {
            let dev = devices.handle(&name);
            InterfaceJson {
                carrier: dev.carrier_ok(),
                counters: dev.stats(),
                name,
            }
        })
        .collect()
}

fn collect_bindings(config: &Config, devices: &SysfsRegistry) -> Vec<BindingStatusJson> {
    let root = config.sysfs_root();
    config
        .bindings
        .iter()
        .map(|b| BindingStatusJson {
            led: b.led.clone(),
            device_name: b.device_name.clone(),
            mode: b.mode.clone(),
            led_present: root.join("leds").join(&b.led).is_dir(),
            interface_present: devices.resolve(&b.device_name).is_some(),
        })
        .collect()
}

fn print_status(output: &StatusOutput, json: bool) -> Result<()> {
    if json {
        return super::print_json(output);
    }

    let w = kv_width(
        &["Version:", "Sysfs root:"],
        &output
            .interfaces
            .iter()
            .map(|i| i.name.as_str())
            .chain(output.bindings.iter().map(|b| b.led.as_str()))
            .collect::<Vec<_>>(),
    );
    kv("Version:", &output.version, w);
    kv("Sysfs root:", &output.sysfs_root, w);
    println!();

    println!("Interfaces:");
    if output.interfaces.is_empty() {
        println!("  (none)");
    }
    for i in &output.interfaces {
        kv_indent(
            &i.name,
            format_args!(
                "{}  tx {}  rx {}",
                if i.carrier { "carrier" } else { "no carrier" },
                i.counters.tx_packets,
                i.counters.rx_packets
            ),
            w,
        );
    }

    if !output.bindings.is_empty() {
        println!();
        println!("Bindings:");
        for b in &output.bindings {
            let mode = Mode::parse(&b.mode)
                .map(|m| m.to_string())
                .unwrap_or_else(|_| format!("{} (invalid)", b.mode));
            let target = if b.device_name.is_empty() {
                "(none)".to_string()
            } else if b.interface_present {
                b.device_name.clone()
            } else {
                format!("{} (absent)", b.device_name)
            };
            let led_note = if b.led_present { "" } else { ", LED missing" };
            kv_indent(&b.led, format_args!("{target} [{mode}]{led_note}"), w);
        }
    }
    Ok(())
}

pub(super) fn cmd_status(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let devices = SysfsRegistry::new(config.sysfs_root());
    let output = StatusOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        sysfs_root: config.sysfs_root.clone(),
        interfaces: collect_interfaces(&devices),
        bindings: collect_bindings(&config, &devices),
    };
    print_status(&output, json)
}
