//! avatar-lens-session
//!
//! Viewer-side controller for one bound avatar. Binding a model rebuilds the
//! clip catalog and gives the model a fresh secondary-motion solver; `tick` is
//! what the host's idle callback calls every frame.

pub mod config;
pub mod instance;

use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use avatar_lens_api_core::{AvatarDescriptor, ClipId};
use avatar_lens_clips_core::{ClassifiedClip, ClipCatalog};
use avatar_lens_motion_core::{
    ChainPose, IdleHook, MotionRigSource, MotionScheduler, SecondaryMotionSolver, SharedSolver,
    TickReport,
};

pub use crate::config::SessionConfig;
pub use crate::instance::AvatarInstance;

/// The clip currently chosen in the dropdown, with every menu entry that plays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSelection {
    pub clip: ClipId,
    pub clip_name: String,
    pub entries: Vec<ClassifiedClip>,
}

#[derive(Debug)]
pub struct SessionFrame {
    pub epoch: u64,
    /// Raw host delta for this frame (non-finite or negative input reads as 0).
    pub dt: f32,
    pub elapsed_s: f64,
    pub motion: TickReport,
    /// Chain poses while the bound model's solver is scheduled; empty otherwise.
    pub poses: Vec<ChainPose>,
}

pub struct AvatarSession {
    config: SessionConfig,
    scheduler: MotionScheduler,
    solver: Option<SharedSolver>,
    avatar_name: Option<String>,
    catalog: ClipCatalog,
    selection: Option<ClipSelection>,
    epoch: u64,
    elapsed_s: f64,
}

impl AvatarSession {
    pub fn new(config: SessionConfig, hook: Box<dyn IdleHook>) -> Self {
        Self {
            config,
            scheduler: MotionScheduler::new(hook),
            solver: None,
            avatar_name: None,
            catalog: ClipCatalog::default(),
            selection: None,
            epoch: 0,
            elapsed_s: 0.0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bind a model, replacing any previous one.
    ///
    /// Dangling references in the descriptor are logged and otherwise tolerated;
    /// the catalog simply leaves out what cannot be resolved.
    pub fn bind_model(
        &mut self,
        descriptor: &AvatarDescriptor,
        model: Rc<dyn MotionRigSource>,
    ) -> &ClipCatalog {
        self.release_model();

        for problem in descriptor.problems() {
            log::warn!("{}: {}", descriptor.name, problem);
        }
        self.catalog = ClipCatalog::build(descriptor);

        let solver =
            SecondaryMotionSolver::new_shared(&descriptor.name, self.config.motion.clone());
        let chains = solver.borrow_mut().initialize(&mut self.scheduler, model);
        log::debug!(
            "{}: bound with {} clip entries and {} motion chain(s)",
            descriptor.name,
            self.catalog.len(),
            chains
        );
        self.solver = Some(solver);
        self.avatar_name = Some(descriptor.name.clone());

        if self.config.auto_select_first_clip {
            if let Some(first) = self.catalog.available_clips().first().copied() {
                self.selection = self.selection_for(first);
            }
        }
        &self.catalog
    }

    /// Parse a descriptor, wrap it in an [`AvatarInstance`] and bind it.
    pub fn bind_json(&mut self, json: &str) -> Result<Rc<AvatarInstance>> {
        let descriptor =
            AvatarDescriptor::from_json_str(json).context("parse avatar descriptor")?;
        let instance = AvatarInstance::new(&descriptor);
        self.bind_model(&descriptor, instance.clone());
        Ok(instance)
    }

    pub fn unbind_model(&mut self) {
        if let Some(name) = self.avatar_name.as_deref() {
            log::debug!("{name}: unbound");
        }
        self.release_model();
    }

    pub fn bound_avatar(&self) -> Option<&str> {
        self.avatar_name.as_deref()
    }

    pub fn catalog(&self) -> &ClipCatalog {
        &self.catalog
    }

    /// Select a clip by name. Unknown names leave the current selection alone.
    pub fn select_clip(&mut self, name: &str) -> Option<ClipSelection> {
        let Some(clip) = self.catalog.find_by_name(name) else {
            log::debug!("no selectable clip named '{name}'");
            return None;
        };
        self.selection = self.selection_for(clip);
        self.selection.clone()
    }

    pub fn selection(&self) -> Option<&ClipSelection> {
        self.selection.as_ref()
    }

    /// One idle-callback frame.
    pub fn tick(&mut self, dt: f32) -> SessionFrame {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.epoch = self.epoch.wrapping_add(1);
        self.elapsed_s += f64::from(dt);

        let motion = self.scheduler.tick(dt);
        let poses = self
            .solver
            .as_ref()
            .and_then(|s| s.try_borrow().ok())
            .filter(|s| s.is_registered(&self.scheduler))
            .map(|s| s.poses())
            .unwrap_or_default();

        SessionFrame {
            epoch: self.epoch,
            dt,
            elapsed_s: self.elapsed_s,
            motion,
            poses,
        }
    }

    pub fn set_motion_enabled(&mut self, enabled: bool) {
        self.config.motion.enabled = enabled;
        if let Some(solver) = &self.solver {
            solver.borrow_mut().set_enabled(&mut self.scheduler, enabled);
        }
    }

    pub fn is_motion_running(&self) -> bool {
        self.scheduler.is_loop_active()
    }

    pub fn motion_chain_count(&self) -> usize {
        self.solver
            .as_ref()
            .map_or(0, |s| s.borrow().chain_count())
    }

    /// End of session: drop the model and every scheduler entry.
    pub fn shutdown(&mut self) {
        self.release_model();
        self.scheduler.clear();
    }

    fn release_model(&mut self) {
        if let Some(solver) = self.solver.take() {
            solver.borrow_mut().dispose(&mut self.scheduler);
        }
        self.catalog = ClipCatalog::default();
        self.selection = None;
        self.avatar_name = None;
    }

    fn selection_for(&self, clip: ClipId) -> Option<ClipSelection> {
        let clip_name = self.catalog.clip_name(clip)?.to_string();
        let entries = self
            .catalog
            .entries_for_clip(clip)
            .into_iter()
            .cloned()
            .collect();
        Some(ClipSelection {
            clip,
            clip_name,
            entries,
        })
    }
}

impl Drop for AvatarSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
