//! `run` subcommand: activate configured bindings and follow interface changes.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use netled_lib::NetledError;
use netled_lib::led::SysfsLed;
use netled_lib::netdev::{NetDevice, SysfsRegistry};
use netled_lib::registry::TriggerRegistry;
use netled_lib::watch::LinkWatcher;

use super::{Config, RUNNING, Result};

/// State for the `run` command, created during setup.
struct RunCtx {
    registry: TriggerRegistry,
    watcher: LinkWatcher,
    poll: Duration,
}

/// Validate config, open every LED and apply its binding.
///
/// On error the registry is dropped, which turns already activated LEDs off.
fn run_setup(config: &Config) -> Result<RunCtx> {
    if let Err(errors) = config.validate() {
        let joined: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        return Err(NetledError::Config(joined.join("; ")));
    }
    if config.bindings.is_empty() {
        return Err(NetledError::Config("no bindings configured".into()));
    }

    let root = config.sysfs_root();
    let devices = SysfsRegistry::new(&root);
    let watcher = LinkWatcher::new(devices.clone())?;
    let registry = TriggerRegistry::new(Arc::new(devices));

    for binding in &config.bindings {
        let led = SysfsLed::open(&root, &binding.led)?;
        let trigger = registry.activate(Arc::new(led))?;
        binding.apply(&trigger)?;

        let s = trigger.snapshot();
        let target = if s.device_name.is_empty() {
            "(none)"
        } else {
            s.device_name.as_str()
        };
        let state = match (s.bound, s.link_up) {
            (false, _) => "absent",
            (true, false) => "no carrier",
            (true, true) => "link up",
        };
        println!(
            "[bind]  {} -> {target} (mode: {}, interval: {} ms, {state})",
            binding.led, s.mode, s.interval_ms
        );
    }

    Ok(RunCtx {
        registry,
        watcher,
        poll: Duration::from_millis(config.event_poll_ms),
    })
}

/// Sample interfaces once and deliver the resulting events.
/// Returns how many trigger notifications were applied.
fn pump_events(ctx: &mut RunCtx) -> usize {
    let events = match ctx.watcher.poll() {
        Ok(events) => events,
        Err(e) => {
            log::warn!("[watch] cannot sample interfaces: {e}");
            return 0;
        }
    };
    let mut applied = 0;
    for event in &events {
        let n = ctx.registry.dispatch(event);
        if n > 0 {
            println!(
                "  {}: {:?} ({} trigger(s))",
                event.device.name(),
                event.kind,
                n
            );
        }
        applied += n;
    }
    applied
}

/// Sleep for `dur`, waking early once Ctrl+C was pressed.
fn sleep_while_running(dur: Duration) {
    let deadline = Instant::now() + dur;
    while RUNNING.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        std::thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

fn run_loop(ctx: &mut RunCtx) {
    while RUNNING.load(Ordering::SeqCst) {
        sleep_while_running(ctx.poll);
        if !RUNNING.load(Ordering::SeqCst) {
            break;
        }
        pump_events(ctx);
    }
}

/// Deactivate every trigger; each LED is left off.
fn run_teardown(ctx: &RunCtx) {
    println!();
    println!("Releasing {} LED(s)...", ctx.registry.len());
    ctx.registry.shutdown();
    println!("Done.");
}

pub(super) fn cmd_run(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);

    println!("netled: LED network activity trigger.");
    println!("Press Ctrl+C to exit (LEDs are switched off).");
    println!();

    let mut ctx = run_setup(&config)?;

    println!();
    println!(
        "Watching {} every {} ms... (Ctrl+C to stop)",
        config.sysfs_root, config.event_poll_ms
    );
    run_loop(&mut ctx);
    run_teardown(&ctx);
    Ok(())
}
