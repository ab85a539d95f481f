//! Secondary-motion rig descriptions (spring bone chains and colliders).
//!
//! Positions are in model space, metres, +Y up.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SecondaryMotionRig {
    #[serde(default)]
    pub chains: Vec<SpringChainDesc>,
    #[serde(default)]
    pub colliders: Vec<ColliderDesc>,
}

impl SecondaryMotionRig {
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

fn default_stiffness() -> f32 {
    1.0
}

fn default_drag() -> f32 {
    0.4
}

fn default_gravity_dir() -> [f32; 3] {
    [0.0, -1.0, 0.0]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpringChainDesc {
    pub name: String,
    /// Model-space position of the chain's fixed root bone.
    #[serde(default)]
    pub root: [f32; 3],
    /// Joints hanging from the root, each offset from the previous joint at rest.
    #[serde(default)]
    pub joints: Vec<SpringJointDesc>,
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    #[serde(default = "default_drag")]
    pub drag: f32,
    #[serde(default)]
    pub gravity_power: f32,
    #[serde(default = "default_gravity_dir")]
    pub gravity_dir: [f32; 3],
    /// Names of colliders this chain collides with. Empty means every collider.
    #[serde(default)]
    pub colliders: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpringJointDesc {
    pub name: String,
    pub rest_offset: [f32; 3],
    #[serde(default)]
    pub hit_radius: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColliderDesc {
    pub name: String,
    pub shape: ColliderShape,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColliderShape {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    Capsule {
        center: [f32; 3],
        tail: [f32; 3],
        radius: f32,
    },
}
