//! `config` subcommand: show current configuration and file path.

use std::path::Path;

use netled_lib::mode::Mode;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());

    if json {
        return super::print_json(&ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
        });
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &["sysfs_root:", "event_poll_ms:", "device_name:", "interval:"],
    );

    match &config_path {
        Some(p) if config_exists => kv("Config file:", format_args!("{} (loaded)", p.display()), w),
        Some(p) => kv(
            "Config file:",
            format_args!("{} (not found, using defaults)", p.display()),
            w,
        ),
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("sysfs_root:", &config.sysfs_root, w);
    kv_indent("event_poll_ms:", config.event_poll_ms, w);

    for b in &config.bindings {
        println!();
        println!("LED {}:", b.led);
        let device = if b.device_name.is_empty() {
            "(none)"
        } else {
            b.device_name.as_str()
        };
        kv_indent("device_name:", device, w);
        let mode = match Mode::parse(&b.mode) {
            Ok(m) if m == Mode::NONE => "(none)".to_string(),
            Ok(m) => m.to_string(),
            Err(_) => format!("{} (invalid)", b.mode),
        };
        kv_indent("mode:", mode, w);
        kv_indent("interval:", format_args!("{} ms", b.interval), w);
    }
    Ok(())
}
