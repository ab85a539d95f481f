//! Per-model secondary-motion solver.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::chain::{ChainPose, MotionRigSource, SecondaryMotionChain};
use crate::collider::Collider;
use crate::config::MotionConfig;
use crate::error::MotionError;
use crate::scheduler::{DriverRef, MotionDriver, MotionScheduler};

pub type SharedSolver = Rc<RefCell<SecondaryMotionSolver>>;

/// Owns the chains and colliders discovered on one model and advances them
/// from the shared scheduler.
///
/// Always created through [`SecondaryMotionSolver::new_shared`] so it can hand
/// the scheduler a weak reference to itself. Dropping the last strong handle is
/// enough to get it evicted.
pub struct SecondaryMotionSolver {
    this: Weak<RefCell<SecondaryMotionSolver>>,
    label: String,
    config: MotionConfig,
    enabled: bool,
    model: Option<Rc<dyn MotionRigSource>>,
    chains: Vec<Box<dyn SecondaryMotionChain>>,
    colliders: Vec<Collider>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub dt: f32,
    pub advanced: usize,
    pub failed: usize,
}

impl SecondaryMotionSolver {
    pub fn new_shared(label: impl Into<String>, config: MotionConfig) -> SharedSolver {
        let label = label.into();
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                this: this.clone(),
                label,
                enabled: config.enabled,
                config,
                model: None,
                chains: Vec::new(),
                colliders: Vec::new(),
            })
        })
    }

    fn driver_ref(&self) -> DriverRef {
        let weak: Weak<RefCell<dyn MotionDriver>> = self.this.clone();
        weak
    }

    /// Bind to `model`, replacing whatever was bound before. Registers with the
    /// scheduler only when chains were found and the solver is enabled.
    pub fn initialize(
        &mut self,
        scheduler: &mut MotionScheduler,
        model: Rc<dyn MotionRigSource>,
    ) -> usize {
        self.chains = model.discover_chains();
        self.colliders = model.discover_colliders();
        self.model = Some(model);
        log::debug!(
            "{}: {} chain(s), {} collider(s)",
            self.label,
            self.chains.len(),
            self.colliders.len()
        );
        self.sync_registration(scheduler);
        self.chains.len()
    }

    /// Advance every chain by the clamped `dt`. A failing chain is logged and
    /// skipped; the rest still advance.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let dt = self.config.clamp_delta(dt);
        let mut report = StepReport {
            dt,
            ..StepReport::default()
        };
        if !self.enabled || dt <= 0.0 {
            return report;
        }
        for chain in &mut self.chains {
            match chain.advance(dt, &self.colliders) {
                Ok(()) => report.advanced += 1,
                Err(err) => {
                    log::warn!("{}: {}", self.label, err);
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub fn set_enabled(&mut self, scheduler: &mut MotionScheduler, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            for chain in &mut self.chains {
                chain.reset_to_rest();
            }
        }
        self.sync_registration(scheduler);
    }

    /// Unregister and drop everything discovered from the model.
    pub fn dispose(&mut self, scheduler: &mut MotionScheduler) {
        scheduler.unregister(&self.driver_ref());
        self.chains.clear();
        self.colliders.clear();
        self.model = None;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_registered(&self, scheduler: &MotionScheduler) -> bool {
        scheduler.contains(&self.driver_ref())
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn poses(&self) -> Vec<ChainPose> {
        self.chains.iter().map(|c| c.pose()).collect()
    }

    fn sync_registration(&self, scheduler: &mut MotionScheduler) {
        let driver = self.driver_ref();
        if self.enabled && !self.chains.is_empty() {
            scheduler.register(driver);
        } else {
            scheduler.unregister(&driver);
        }
    }
}

impl MotionDriver for SecondaryMotionSolver {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_alive(&self) -> bool {
        self.model.as_ref().map_or(false, |m| m.is_alive())
    }

    fn update(&mut self, dt: f32) -> Result<(), MotionError> {
        let report = self.step(dt);
        if report.failed > 0 {
            return Err(MotionError::ChainsFailed {
                solver: self.label.clone(),
                failed: report.failed,
                total: self.chains.len(),
            });
        }
        Ok(())
    }
}
