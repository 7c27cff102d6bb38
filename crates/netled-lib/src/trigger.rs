//! Netdev trigger: the state machine binding one LED to one interface.
//!
//! Three contexts touch a [`NetdevTrigger`]: configuration calls, lifecycle
//! notifications and the activity poller running on its own worker thread.
//! Every mutator first cancels the poller synchronously, then mutates the
//! state and re-evaluates the baseline under the same lock acquisition, so
//! the poller never sees a half-applied change and the LED's steady state
//! is consistent by the time the mutator returns.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;

use crate::led::{LED_OFF, Led};
use crate::mode::{self, DEFAULT_INTERVAL_MS, Flag, IFNAMSIZ, Mode};
use crate::netdev::{DeviceRegistry, NetDeviceHandle};
use crate::task::PeriodicTask;

#[derive(Debug)]
pub enum TriggerError {
    /// Rejected configuration input; state is unchanged.
    InvalidInput(String),
    /// No attribute with this name.
    UnknownAttribute(String),
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::InvalidInput(e) => write!(f, "Invalid input: {e}"),
            TriggerError::UnknownAttribute(name) => write!(f, "Unknown attribute: {name}"),
        }
    }
}

impl std::error::Error for TriggerError {}

pub type Result<T> = std::result::Result<T, TriggerError>;

/// Interface lifecycle notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventKind {
    Up,
    Down,
    Change,
    Register,
    Unregister,
    ChangeName,
}

/// A lifecycle notification. `device` carries the interface's current name.
#[derive(Clone)]
pub struct NetdevEvent {
    pub kind: EventKind,
    pub device: NetDeviceHandle,
}

impl NetdevEvent {
    pub fn new(kind: EventKind, device: NetDeviceHandle) -> Self {
        NetdevEvent { kind, device }
    }
}

impl fmt::Debug for NetdevEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetdevEvent")
            .field("kind", &self.kind)
            .field("device", &self.device.name())
            .finish()
    }
}

/// How a trigger treated a notification. Either way dispatch continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Applied,
    Ignored,
}

struct TriggerState {
    device_name: String,
    bound_device: Option<NetDeviceHandle>,
    mode: Mode,
    /// Last known carrier; only notifications and rebinds change it.
    link_up: bool,
    interval_ms: u32,
    last_activity: u64,
    /// Level used for the lit steady state and blink pulses. 0 = not yet chosen.
    blink_brightness: u32,
}

/// Consistent copy of a trigger's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerSnapshot {
    pub device_name: String,
    pub bound: bool,
    pub mode: Mode,
    pub link_up: bool,
    pub interval_ms: u32,
    pub last_activity: u64,
}

/// Steady state chosen by the baseline evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Baseline {
    pub level: u32,
    pub arm_poller: bool,
}

/// Decide the steady LED level and whether the activity poller should run.
pub fn decide_baseline(link_up: bool, mode: Mode, blink_brightness: u32) -> Baseline {
    if !link_up {
        return Baseline {
            level: LED_OFF,
            arm_poller: false,
        };
    }
    Baseline {
        level: if mode.link { blink_brightness } else { LED_OFF },
        arm_poller: mode.wants_activity(),
    }
}

struct Shared {
    state: Mutex<TriggerState>,
    led: Arc<dyn Led>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TriggerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply the baseline for `st` to the LED. Returns whether to arm the poller.
    fn set_baseline_state(&self, st: &mut TriggerState) -> bool {
        let current = self.led.brightness();
        if current != LED_OFF {
            st.blink_brightness = current;
        }
        if st.blink_brightness == LED_OFF {
            st.blink_brightness = self.led.max_brightness();
        }

        let baseline = decide_baseline(st.link_up, st.mode, st.blink_brightness);
        self.led.set_brightness(baseline.level);
        baseline.arm_poller
    }

    /// One activity poller run. Returns the delay before the next run.
    fn poll_activity(&self) -> Option<Duration> {
        let mut st = self.lock();

        let Some(dev) = st.bound_device.as_ref() else {
            self.led.set_brightness(LED_OFF);
            return None;
        };
        if !st.mode.wants_activity() {
            return None;
        }

        let stats = dev.stats();
        let activity = (if st.mode.tx { stats.tx_packets } else { 0 })
            .wrapping_add(if st.mode.rx { stats.rx_packets } else { 0 });

        if activity != st.last_activity {
            // Baseline is lit when link mode is on, so the pulse goes dark
            self.led.stop_blink();
            self.led
                .blink_oneshot(st.interval_ms, st.interval_ms, st.mode.link);
            st.last_activity = activity;
        }

        Some(Duration::from_millis(st.interval_ms as u64 * 2))
    }
}

/// One LED bound to one (possibly absent) network interface.
pub struct NetdevTrigger {
    shared: Arc<Shared>,
    registry: Arc<dyn DeviceRegistry>,
    task: PeriodicTask,
}

impl fmt::Debug for NetdevTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetdevTrigger")
            .field("led", &self.led_name())
            .finish_non_exhaustive()
    }
}

impl NetdevTrigger {
    /// Activate the trigger on `led`: unbound, link mode only, default interval.
    pub fn new(led: Arc<dyn Led>, registry: Arc<dyn DeviceRegistry>) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(TriggerState {
                device_name: String::new(),
                bound_device: None,
                mode: Mode::default(),
                link_up: false,
                interval_ms: DEFAULT_INTERVAL_MS,
                last_activity: 0,
                blink_brightness: LED_OFF,
            }),
            led,
        });
        let worker = Arc::clone(&shared);
        let task = PeriodicTask::spawn(
            &format!("netled:{}", shared.led.name()),
            move || worker.poll_activity(),
        )?;
        Ok(NetdevTrigger {
            shared,
            registry,
            task,
        })
    }

    pub fn led_name(&self) -> &str {
        self.shared.led.name()
    }

    /// Run the baseline evaluator while `st` is still locked.
    fn reevaluate(&self, st: &mut TriggerState) {
        if self.shared.set_baseline_state(st) {
            self.task.schedule(Duration::ZERO);
        }
    }

    /// Bind to the interface called `name`; empty unbinds.
    ///
    /// Names of `IFNAMSIZ` bytes or more are rejected with state unchanged.
    /// A name that does not resolve leaves the trigger unbound until a
    /// matching `Register` notification arrives.
    pub fn set_device_name(&self, name: &str) -> Result<()> {
        if name.len() >= IFNAMSIZ {
            return Err(TriggerError::InvalidInput(format!(
                "device name \"{name}\" is {} bytes (max {})",
                name.len(),
                IFNAMSIZ - 1
            )));
        }

        self.task.cancel_sync();
        let mut st = self.shared.lock();

        st.bound_device = None;
        st.device_name = name.to_string();
        if !name.is_empty() {
            st.bound_device = self.registry.resolve(name);
        }
        st.link_up = st.bound_device.as_ref().is_some_and(|d| d.carrier_ok());
        st.last_activity = 0;

        log::debug!(
            "[trigger] {}: bound to \"{name}\" (present: {}, link: {})",
            self.led_name(),
            st.bound_device.is_some(),
            st.link_up
        );
        self.reevaluate(&mut st);
        Ok(())
    }

    /// Release the interface and stop monitoring.
    pub fn unbind(&self) {
        // An empty name is always short enough
        let _ = self.set_device_name("");
    }

    pub fn set_flag(&self, flag: Flag, enabled: bool) {
        self.task.cancel_sync();
        let mut st = self.shared.lock();
        st.mode.set(flag, enabled);
        self.reevaluate(&mut st);
    }

    /// Replace all three flags with a single baseline evaluation.
    pub fn set_mode(&self, mode: Mode) {
        self.task.cancel_sync();
        let mut st = self.shared.lock();
        st.mode = mode;
        self.reevaluate(&mut st);
    }

    /// Set the blink interval. Values outside [5, 10000] ms are ignored;
    /// returns whether the value was applied.
    pub fn set_interval(&self, ms: u64) -> bool {
        if !mode::interval_in_bounds(ms) {
            log::debug!("[trigger] {}: interval {ms} ms ignored", self.led_name());
            return false;
        }
        self.task.cancel_sync();
        let mut st = self.shared.lock();
        st.interval_ms = ms as u32;
        self.reevaluate(&mut st);
        true
    }

    /// Handle an interface lifecycle notification.
    ///
    /// Events for other interfaces are ignored. A `ChangeName` for the
    /// currently bound handle counts as matching even though it already
    /// carries the new name, so a rename away never leaves a stale binding.
    pub fn notify(&self, event: &NetdevEvent) -> NotifyOutcome {
        if !self.event_matches(&self.shared.lock(), event) {
            return NotifyOutcome::Ignored;
        }

        self.task.cancel_sync();
        let mut st = self.shared.lock();

        // Rebound while we were waiting for the poller; just restore polling
        if !self.event_matches(&st, event) {
            self.reevaluate(&mut st);
            return NotifyOutcome::Ignored;
        }

        st.link_up = false;
        match event.kind {
            EventKind::Register => {
                st.bound_device = Some(Arc::clone(&event.device));
            }
            EventKind::ChangeName | EventKind::Unregister => {
                st.bound_device = None;
            }
            EventKind::Up | EventKind::Change => {
                if event.device.carrier_ok() {
                    st.link_up = true;
                }
            }
            EventKind::Down => {}
        }

        log::debug!(
            "[trigger] {}: {:?} on {} (present: {}, link: {})",
            self.led_name(),
            event.kind,
            event.device.name(),
            st.bound_device.is_some(),
            st.link_up
        );
        self.reevaluate(&mut st);
        NotifyOutcome::Applied
    }

    fn event_matches(&self, st: &TriggerState, event: &NetdevEvent) -> bool {
        if st.device_name.is_empty() {
            return false;
        }
        if event.device.name() == st.device_name {
            return true;
        }
        event.kind == EventKind::ChangeName
            && st
                .bound_device
                .as_ref()
                .is_some_and(|d| Arc::ptr_eq(d, &event.device))
    }

    pub fn snapshot(&self) -> TriggerSnapshot {
        let st = self.shared.lock();
        TriggerSnapshot {
            device_name: st.device_name.clone(),
            bound: st.bound_device.is_some(),
            mode: st.mode,
            link_up: st.link_up,
            interval_ms: st.interval_ms,
            last_activity: st.last_activity,
        }
    }

    pub fn device_name(&self) -> String {
        self.shared.lock().device_name.clone()
    }

    pub fn mode(&self) -> Mode {
        self.shared.lock().mode
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.shared.lock().mode.get(flag)
    }

    pub fn interval_ms(&self) -> u32 {
        self.shared.lock().interval_ms
    }

    /// Whether the activity poller is scheduled to run.
    pub fn is_polling(&self) -> bool {
        self.task.is_pending()
    }

    /// Completed activity poller runs.
    pub fn poll_count(&self) -> u64 {
        self.task.run_count()
    }
}

impl Drop for NetdevTrigger {
    fn drop(&mut self) {
        self.unbind();
        self.shared.led.stop_blink();
        self.shared.led.set_brightness(LED_OFF);
        log::debug!("[trigger] {}: deactivated", self.shared.led.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::mock::{LedCall, MockLed};
    use crate::netdev::mock::{MockNetDevice, MockRegistry};
    use std::time::Instant;

    struct Rig {
        led: Arc<MockLed>,
        reg: Arc<MockRegistry>,
        trigger: NetdevTrigger,
    }

    fn rig() -> Rig {
        let led = Arc::new(MockLed::new("test:led", 255));
        let reg = Arc::new(MockRegistry::new());
        let trigger = NetdevTrigger::new(led.clone(), reg.clone()).unwrap();
        Rig { led, reg, trigger }
    }

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        false
    }

    #[test]
    fn decide_baseline_table() {
        let link = Mode::default();
        let tx = Mode::parse("tx").unwrap();
        let both = Mode::parse("link tx").unwrap();

        assert_eq!(
            decide_baseline(false, both, 200),
            Baseline {
                level: LED_OFF,
                arm_poller: false
            }
        );
        assert_eq!(
            decide_baseline(true, link, 200),
            Baseline {
                level: 200,
                arm_poller: false
            }
        );
        assert_eq!(
            decide_baseline(true, tx, 200),
            Baseline {
                level: LED_OFF,
                arm_poller: true
            }
        );
        assert_eq!(
            decide_baseline(true, both, 200),
            Baseline {
                level: 200,
                arm_poller: true
            }
        );
    }

    #[test]
    fn activation_defaults() {
        let r = rig();
        let s = r.trigger.snapshot();
        assert_eq!(s.device_name, "");
        assert!(!s.bound);
        assert_eq!(s.mode, Mode::default());
        assert!(!s.link_up);
        assert_eq!(s.interval_ms, 50);
        assert_eq!(s.last_activity, 0);
        assert!(!r.trigger.is_polling());
    }

    #[test]
    fn bind_unknown_device_stays_unbound() {
        let r = rig();
        r.trigger.set_flag(Flag::Tx, true);
        r.trigger.set_device_name("eth9").unwrap();
        let s = r.trigger.snapshot();
        assert_eq!(s.device_name, "eth9");
        assert!(!s.bound);
        assert!(!s.link_up);
        assert!(!r.trigger.is_polling());
        assert_eq!(r.led.last_steady(), Some(LED_OFF));
    }

    #[test]
    fn bind_with_carrier_lights_led() {
        let r = rig();
        r.reg.insert(MockNetDevice::new("eth0", true));
        r.trigger.set_device_name("eth0").unwrap();
        let s = r.trigger.snapshot();
        assert!(s.bound);
        assert!(s.link_up);
        assert_eq!(r.led.last_steady(), Some(255));
    }

    #[test]
    fn bind_rejects_long_name_and_keeps_state() {
        let r = rig();
        r.trigger.set_device_name("eth0").unwrap();
        let err = r.trigger.set_device_name("abcdefghijklmnop").unwrap_err();
        assert!(matches!(err, TriggerError::InvalidInput(_)));
        assert_eq!(r.trigger.device_name(), "eth0");
        // 15 bytes still fits
        r.trigger.set_device_name("abcdefghijklmno").unwrap();
    }

    #[test]
    fn blink_brightness_follows_manual_level() {
        let r = rig();
        r.reg.insert(MockNetDevice::new("eth0", true));
        r.led.force_brightness(40);
        r.trigger.set_device_name("eth0").unwrap();
        assert_eq!(r.led.last_steady(), Some(40));

        // Turning the LED off keeps the remembered level
        r.trigger.set_flag(Flag::Link, false);
        assert_eq!(r.led.last_steady(), Some(LED_OFF));
        r.trigger.set_flag(Flag::Link, true);
        assert_eq!(r.led.last_steady(), Some(40));
    }

    #[test]
    fn steady_state_after_every_toggle() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", false);
        r.reg.insert(dev.clone());
        r.trigger.set_device_name("eth0").unwrap();

        let toggles = [
            (Flag::Link, false),
            (Flag::Tx, true),
            (Flag::Link, true),
            (Flag::Rx, true),
            (Flag::Tx, false),
            (Flag::Link, false),
        ];
        for link_up in [false, true] {
            dev.set_carrier(link_up);
            r.trigger
                .notify(&NetdevEvent::new(EventKind::Change, dev.clone()));
            for (flag, on) in toggles {
                r.trigger.set_flag(flag, on);
                let s = r.trigger.snapshot();
                let expected = if s.link_up && s.mode.link { 255 } else { 0 };
                assert_eq!(r.led.last_steady(), Some(expected), "{flag} -> {on}");
            }
        }
    }

    #[test]
    fn interval_bounds() {
        let r = rig();
        assert!(!r.trigger.set_interval(4));
        assert_eq!(r.trigger.interval_ms(), 50);
        assert!(!r.trigger.set_interval(10_001));
        assert_eq!(r.trigger.interval_ms(), 50);
        assert!(r.trigger.set_interval(5));
        assert_eq!(r.trigger.interval_ms(), 5);
        assert!(r.trigger.set_interval(10_000));
        assert_eq!(r.trigger.interval_ms(), 10_000);
    }

    #[test]
    fn register_then_up_arms_poller() {
        let r = rig();
        r.trigger.set_interval(10_000);
        r.trigger.set_flag(Flag::Tx, true);
        r.trigger.set_device_name("eth0").unwrap();
        assert!(!r.trigger.is_polling());

        let dev = MockNetDevice::new("eth0", true);
        r.trigger
            .notify(&NetdevEvent::new(EventKind::Register, dev.clone()));
        assert!(r.trigger.snapshot().bound);
        assert!(!r.trigger.snapshot().link_up);

        let before = r.trigger.poll_count();
        r.trigger.notify(&NetdevEvent::new(EventKind::Up, dev));
        assert!(r.trigger.snapshot().link_up);
        // Armed immediately, runs once, re-arms for 2 * interval
        assert!(wait_until(|| r.trigger.poll_count() > before));
        assert!(r.trigger.is_polling());
    }

    #[test]
    fn unrelated_events_ignored() {
        let r = rig();
        r.reg.insert(MockNetDevice::new("eth0", true));
        r.trigger.set_device_name("eth0").unwrap();
        r.led.clear_calls();

        let other = MockNetDevice::new("eth1", false);
        for kind in [EventKind::Down, EventKind::Unregister, EventKind::ChangeName] {
            let outcome = r.trigger.notify(&NetdevEvent::new(kind, other.clone()));
            assert_eq!(outcome, NotifyOutcome::Ignored);
        }
        assert!(r.led.calls().is_empty());
        assert!(r.trigger.snapshot().link_up);
    }

    #[test]
    fn unbound_trigger_ignores_everything() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        let outcome = r.trigger.notify(&NetdevEvent::new(EventKind::Register, dev));
        assert_eq!(outcome, NotifyOutcome::Ignored);
        assert!(!r.trigger.snapshot().bound);
    }

    #[test]
    fn down_and_unregister_turn_led_off() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        r.reg.insert(dev.clone());
        r.trigger.set_device_name("eth0").unwrap();
        assert_eq!(r.led.last_steady(), Some(255));

        r.trigger
            .notify(&NetdevEvent::new(EventKind::Down, dev.clone()));
        assert!(!r.trigger.snapshot().link_up);
        assert!(r.trigger.snapshot().bound);
        assert_eq!(r.led.last_steady(), Some(LED_OFF));

        r.trigger.notify(&NetdevEvent::new(EventKind::Unregister, dev));
        assert!(!r.trigger.snapshot().bound);
    }

    #[test]
    fn change_name_releases_handle() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        r.reg.insert(dev.clone());
        r.trigger.set_device_name("eth0").unwrap();
        let strong = Arc::strong_count(&dev);

        r.trigger
            .notify(&NetdevEvent::new(EventKind::ChangeName, dev.clone()));
        assert!(!r.trigger.snapshot().bound);
        assert_eq!(Arc::strong_count(&dev), strong - 1);
    }

    #[test]
    fn rename_away_of_bound_handle_releases_it() {
        use std::sync::atomic::{AtomicBool, Ordering};

        struct Renamable(AtomicBool);
        impl crate::netdev::NetDevice for Renamable {
            fn name(&self) -> &str {
                if self.0.load(Ordering::SeqCst) { "lan0" } else { "eth0" }
            }
            fn carrier_ok(&self) -> bool {
                true
            }
            fn stats(&self) -> crate::netdev::PacketCounters {
                Default::default()
            }
        }

        let r = rig();
        let dev = Arc::new(Renamable(AtomicBool::new(false)));
        let handle: NetDeviceHandle = dev.clone();
        r.trigger.set_device_name("eth0").unwrap();
        r.trigger
            .notify(&NetdevEvent::new(EventKind::Register, handle.clone()));
        assert!(r.trigger.snapshot().bound);

        // A different interface renamed to lan0 is not ours
        let other = MockNetDevice::new("lan0", true);
        let outcome = r
            .trigger
            .notify(&NetdevEvent::new(EventKind::ChangeName, other));
        assert_eq!(outcome, NotifyOutcome::Ignored);
        assert!(r.trigger.snapshot().bound);

        // Our interface renamed to lan0 is recognised by identity
        dev.0.store(true, Ordering::SeqCst);
        let outcome = r
            .trigger
            .notify(&NetdevEvent::new(EventKind::ChangeName, handle));
        assert_eq!(outcome, NotifyOutcome::Applied);
        let s = r.trigger.snapshot();
        assert!(!s.bound);
        assert!(!s.link_up);
        assert_eq!(s.device_name, "eth0");
    }

    #[test]
    fn register_replaces_previous_handle() {
        let r = rig();
        let old = MockNetDevice::new("eth0", true);
        r.reg.insert(old.clone());
        r.trigger.set_device_name("eth0").unwrap();
        let old_refs = Arc::strong_count(&old);

        let new = MockNetDevice::new("eth0", true);
        r.trigger
            .notify(&NetdevEvent::new(EventKind::Register, new.clone()));
        assert_eq!(Arc::strong_count(&old), old_refs - 1);
        assert_eq!(Arc::strong_count(&new), 2);
    }

    #[test]
    fn repeated_change_is_idempotent() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        dev.set_counters(7, 0);
        r.reg.insert(dev.clone());
        r.trigger.set_interval(10_000);
        r.trigger.set_flag(Flag::Tx, true);
        r.trigger.set_device_name("eth0").unwrap();
        assert!(wait_until(|| r.trigger.snapshot().last_activity == 7));

        let before = r.trigger.snapshot();
        let steady = r.led.last_steady();
        let blinks = r.led.blinks().len();
        let runs = r.trigger.poll_count();
        for _ in 0..2 {
            r.trigger
                .notify(&NetdevEvent::new(EventKind::Change, dev.clone()));
        }
        // The last Change re-arms the poller; let that run complete
        assert!(wait_until(|| r.trigger.poll_count() > runs));
        assert_eq!(r.trigger.snapshot(), before);
        assert_eq!(r.led.last_steady(), steady);
        assert_eq!(r.led.blinks().len(), blinks);
    }

    #[test]
    fn rebind_resets_activity() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        dev.set_counters(100, 0);
        r.reg.insert(dev.clone());
        r.reg.insert(MockNetDevice::new("eth1", true));
        r.trigger.set_flag(Flag::Tx, true);
        r.trigger.set_device_name("eth0").unwrap();
        assert!(wait_until(|| r.trigger.snapshot().last_activity == 100));

        r.trigger.set_interval(10_000);
        r.trigger.set_device_name("eth1").unwrap();
        // Snapshot taken right after the rebind; eth1 counters are 0
        let s = r.trigger.snapshot();
        assert_eq!(s.device_name, "eth1");
        assert_eq!(s.last_activity, 0);

        // Nothing from eth0 leaks into the new binding
        let blinks = r.led.blinks().len();
        dev.set_counters(500, 0);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(r.led.blinks().len(), blinks);
        assert_eq!(r.trigger.snapshot().last_activity, 0);
    }

    #[test]
    fn unbind_releases_device_and_stops_polling() {
        let r = rig();
        let dev = MockNetDevice::new("eth0", true);
        r.reg.insert(dev.clone());
        r.trigger.set_interval(10_000);
        r.trigger.set_flag(Flag::Tx, true);
        r.trigger.set_device_name("eth0").unwrap();
        assert!(wait_until(|| r.trigger.poll_count() > 0));
        let held = Arc::strong_count(&dev);

        r.trigger.unbind();
        let s = r.trigger.snapshot();
        assert_eq!(s.device_name, "");
        assert!(!s.bound);
        assert!(!s.link_up);
        assert!(!r.trigger.is_polling());
        assert_eq!(r.led.last_steady(), Some(LED_OFF));
        assert_eq!(Arc::strong_count(&dev), held - 1);
    }

    #[test]
    fn deactivation_releases_handle_and_turns_off() {
        let led = Arc::new(MockLed::new("test:led", 255));
        let reg = Arc::new(MockRegistry::new());
        let dev = MockNetDevice::new("eth0", true);
        reg.insert(dev.clone());
        let trigger = NetdevTrigger::new(led.clone(), reg.clone()).unwrap();
        trigger.set_flag(Flag::Rx, true);
        trigger.set_device_name("eth0").unwrap();
        let held = Arc::strong_count(&dev);

        drop(trigger);
        assert_eq!(Arc::strong_count(&dev), held - 1);
        let calls = led.calls();
        assert_eq!(calls.last(), Some(&LedCall::SetBrightness(LED_OFF)));
    }
}
