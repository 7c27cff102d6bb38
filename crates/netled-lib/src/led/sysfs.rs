//! LED class devices under `<root>/leds/<name>/`.
//!
//! Steady brightness goes straight to the `brightness` attribute. One-shot
//! blinks are timed in software on a short-lived helper thread, superseded
//! by the next blink or cancelled by [`Led::stop_blink`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use super::{LED_OFF, Led, LedError, Result};

/// Generation counter shared with blink threads. A thread only writes while
/// the counter still holds the value it was started with.
struct BlinkSignal {
    generation: Mutex<u64>,
    cvar: Condvar,
}

impl BlinkSignal {
    fn bump(&self) -> u64 {
        let mut g = match self.generation.lock() {
            Ok(g) => g,
            Err(e) => e.into_inner(),
        };
        *g += 1;
        self.cvar.notify_all();
        *g
    }

    fn is_current(&self, generation: u64) -> bool {
        match self.generation.lock() {
            Ok(g) => *g == generation,
            Err(_) => false,
        }
    }

    /// Sleep for `dur` unless superseded first. Returns `true` if still current.
    fn sleep(&self, generation: u64, dur: Duration) -> bool {
        let Ok(guard) = self.generation.lock() else {
            return false;
        };
        match self.cvar.wait_timeout_while(guard, dur, |g| *g == generation) {
            Ok((g, _)) => *g == generation,
            Err(_) => false,
        }
    }
}

pub struct SysfsLed {
    name: String,
    dir: PathBuf,
    max: u32,
    /// Last non-zero level written; used as the lit phase of a blink.
    lit_level: Arc<AtomicU32>,
    signal: Arc<BlinkSignal>,
}

impl SysfsLed {
    /// Open `<root>/leds/<name>`. Fails if the directory or its
    /// `max_brightness` attribute is missing.
    pub fn open(root: &Path, name: &str) -> Result<Self> {
        let dir = root.join("leds").join(name);
        if !dir.is_dir() {
            return Err(LedError::NotFound(name.to_string()));
        }
        let max = read_u32(&dir.join("max_brightness"))
            .map_err(|e| LedError::Io(format!("{name}/max_brightness: {e}")))?;
        Ok(SysfsLed {
            name: name.to_string(),
            dir,
            max,
            lit_level: Arc::new(AtomicU32::new(max)),
            signal: Arc::new(BlinkSignal {
                generation: Mutex::new(0),
                cvar: Condvar::new(),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Led for SysfsLed {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_brightness(&self, level: u32) {
        // A steady write ends any running pulse
        self.signal.bump();
        let level = level.min(self.max);
        if level != LED_OFF {
            self.lit_level.store(level, Ordering::SeqCst);
        }
        write_brightness(&self.dir, level);
    }

    fn brightness(&self) -> u32 {
        match read_u32(&self.dir.join("brightness")) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("[led] {}: cannot read brightness: {e}", self.name);
                LED_OFF
            }
        }
    }

    fn max_brightness(&self) -> u32 {
        self.max
    }

    fn blink_oneshot(&self, on_ms: u32, off_ms: u32, invert: bool) {
        let generation = self.signal.bump();
        let lit = self.lit_level.load(Ordering::SeqCst);
        let phases = if invert {
            [(LED_OFF, on_ms), (lit, off_ms)]
        } else {
            [(lit, on_ms), (LED_OFF, off_ms)]
        };
        let signal = Arc::clone(&self.signal);
        let dir = self.dir.clone();
        std::thread::spawn(move || {
            for (level, ms) in phases {
                if !signal.is_current(generation) {
                    return;
                }
                write_brightness(&dir, level);
                if !signal.sleep(generation, Duration::from_millis(ms as u64)) {
                    return;
                }
            }
        });
    }

    fn stop_blink(&self) {
        self.signal.bump();
    }
}

impl Drop for SysfsLed {
    fn drop(&mut self) {
        self.signal.bump();
    }
}

fn read_u32(path: &Path) -> std::io::Result<u32> {
    let text = std::fs::read_to_string(path)?;
    text.trim()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn write_brightness(dir: &Path, level: u32) {
    if let Err(e) = std::fs::write(dir.join("brightness"), format!("{level}\n")) {
        log::warn!("[led] {}: cannot write brightness: {e}", dir.display());
    }
}

/// Names of all LEDs under `<root>/leds`, sorted.
pub fn list_leds(root: &Path) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = std::fs::read_dir(root.join("leds"))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
