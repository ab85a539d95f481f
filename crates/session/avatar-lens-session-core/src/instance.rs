use std::cell::Cell;
use std::rc::Rc;

use avatar_lens_api_core::{AvatarDescriptor, SecondaryMotionRig};
use avatar_lens_motion_core::{Collider, MotionRigSource, SecondaryMotionChain, SpringBoneChain};

/// Engine-agnostic stand-in for a loaded model.
///
/// Hosts that own real scene objects implement [`MotionRigSource`] themselves;
/// this one serves chains straight from the descriptor's rig.
#[derive(Debug)]
pub struct AvatarInstance {
    name: String,
    rig: SecondaryMotionRig,
    alive: Cell<bool>,
}

impl AvatarInstance {
    pub fn new(descriptor: &AvatarDescriptor) -> Rc<Self> {
        Rc::new(Self {
            name: descriptor.name.clone(),
            rig: descriptor.secondary_motion.clone(),
            alive: Cell::new(true),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark the model as destroyed. Solvers bound to it are evicted on the next tick.
    pub fn destroy(&self) {
        if self.alive.replace(false) {
            log::debug!("{}: destroyed", self.name);
        }
    }

    pub fn is_destroyed(&self) -> bool {
        !self.alive.get()
    }
}

impl MotionRigSource for AvatarInstance {
    fn is_alive(&self) -> bool {
        self.alive.get()
    }

    fn discover_chains(&self) -> Vec<Box<dyn SecondaryMotionChain>> {
        if self.is_destroyed() || self.rig.is_empty() {
            return Vec::new();
        }
        self.rig
            .chains
            .iter()
            .filter(|c| !c.joints.is_empty())
            .map(|c| Box::new(SpringBoneChain::from_desc(c)) as Box<dyn SecondaryMotionChain>)
            .collect()
    }

    fn discover_colliders(&self) -> Vec<Collider> {
        if self.is_destroyed() {
            return Vec::new();
        }
        self.rig.colliders.iter().map(Collider::from_desc).collect()
    }
}
