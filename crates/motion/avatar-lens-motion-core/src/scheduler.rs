//! Shared idle-loop scheduler for secondary-motion drivers.
//!
//! The scheduler never owns a driver. It holds weak references and drops any
//! entry whose owner is gone or reports itself dead on the next sweep, so a
//! driver that was never unregistered cannot keep a destroyed model alive or be
//! updated after it. The host idle callback is subscribed only while at least
//! one driver is registered.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::MotionError;

/// Something the scheduler advances once per idle tick.
pub trait MotionDriver {
    fn label(&self) -> &str;

    /// False once the driver's model is gone. Dead drivers are evicted unticked.
    fn is_alive(&self) -> bool;

    fn update(&mut self, dt: f32) -> Result<(), MotionError>;
}

/// Weak handle stored by the scheduler.
pub type DriverRef = Weak<RefCell<dyn MotionDriver>>;

/// The host's per-frame idle callback.
pub trait IdleHook {
    fn subscribe(&mut self);
    fn unsubscribe(&mut self);
}

/// Hook for hosts that drive `tick` themselves.
#[derive(Debug, Default)]
pub struct NoopIdleHook;

impl IdleHook for NoopIdleHook {
    fn subscribe(&mut self) {}
    fn unsubscribe(&mut self) {}
}

/// Hook backed by a shared flag the host polls from its frame loop.
#[derive(Clone, Debug, Default)]
pub struct IdleFlag(Rc<Cell<bool>>);

impl IdleFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.0.get()
    }
}

impl IdleHook for IdleFlag {
    fn subscribe(&mut self) {
        self.0.set(true);
    }

    fn unsubscribe(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug)]
pub struct DriverFailure {
    pub driver: String,
    pub error: MotionError,
}

/// Outcome of one scheduler tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub updated: usize,
    pub evicted: usize,
    pub failures: Vec<DriverFailure>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct MotionScheduler {
    drivers: Vec<DriverRef>,
    hook: Box<dyn IdleHook>,
    loop_active: bool,
}

impl MotionScheduler {
    pub fn new(hook: Box<dyn IdleHook>) -> Self {
        Self {
            drivers: Vec::new(),
            hook,
            loop_active: false,
        }
    }

    /// Add a driver. Returns false if it is already registered or already dropped.
    pub fn register(&mut self, driver: DriverRef) -> bool {
        if driver.strong_count() == 0 {
            log::debug!("ignoring registration of a dropped motion driver");
            return false;
        }
        if self.contains(&driver) {
            return false;
        }
        self.drivers.push(driver);
        self.start_loop();
        true
    }

    /// Remove a driver. Stops the idle loop when it was the last one.
    pub fn unregister(&mut self, driver: &DriverRef) -> bool {
        let before = self.drivers.len();
        self.drivers.retain(|d| !Weak::ptr_eq(d, driver));
        let removed = self.drivers.len() != before;
        if self.drivers.is_empty() {
            self.stop_loop();
        }
        removed
    }

    pub fn contains(&self, driver: &DriverRef) -> bool {
        self.drivers.iter().any(|d| Weak::ptr_eq(d, driver))
    }

    /// Registered entries, including ones not yet swept.
    pub fn active_count(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_loop_active(&self) -> bool {
        self.loop_active
    }

    pub fn clear(&mut self) {
        self.drivers.clear();
        self.stop_loop();
    }

    /// Sweep dead entries, then update every live driver with `dt`.
    ///
    /// A driver's error is logged and collected; it never stops the others.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let mut report = TickReport::default();

        let before = self.drivers.len();
        self.drivers.retain(|weak| match weak.upgrade() {
            None => false,
            // A driver that is mid-update elsewhere is kept; it is alive by definition.
            Some(strong) => strong.try_borrow().map_or(true, |d| d.is_alive()),
        });
        report.evicted = before - self.drivers.len();
        if report.evicted > 0 {
            log::debug!("evicted {} dead motion driver(s)", report.evicted);
        }

        if self.drivers.is_empty() {
            self.stop_loop();
            return report;
        }

        for (slot, weak) in self.drivers.iter().enumerate() {
            let Some(strong) = weak.upgrade() else {
                continue;
            };
            let mut driver = match strong.try_borrow_mut() {
                Ok(d) => d,
                Err(_) => {
                    // The label sits behind the held borrow.
                    let driver = format!("driver#{slot}");
                    let error = MotionError::Busy(driver.clone());
                    log::warn!("motion driver skipped: {}", error);
                    report.failures.push(DriverFailure { driver, error });
                    continue;
                }
            };
            match driver.update(dt) {
                Ok(()) => report.updated += 1,
                Err(error) => {
                    log::warn!("motion driver '{}' failed: {}", driver.label(), error);
                    report.failures.push(DriverFailure {
                        driver: driver.label().to_string(),
                        error,
                    });
                }
            }
        }
        report
    }

    fn start_loop(&mut self) {
        if self.loop_active {
            return;
        }
        // Drop any stale subscription first so the callback is never installed twice.
        self.hook.unsubscribe();
        self.hook.subscribe();
        self.loop_active = true;
        log::debug!("motion idle loop started");
    }

    fn stop_loop(&mut self) {
        if !self.loop_active {
            return;
        }
        self.hook.unsubscribe();
        self.loop_active = false;
        log::debug!("motion idle loop stopped");
    }
}

impl Drop for MotionScheduler {
    fn drop(&mut self) {
        self.stop_loop();
    }
}
