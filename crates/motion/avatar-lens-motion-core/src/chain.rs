//! Seams between the solver and whatever owns the bones.

use crate::collider::Collider;
use crate::error::MotionError;
use crate::math::Vec3;

/// Joint positions of one chain after the latest advance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChainPose {
    pub chain: String,
    pub joints: Vec<Vec3>,
}

/// One independently simulated chain of secondary-motion joints.
///
/// Implementations own their state; the solver only advances and resets them.
pub trait SecondaryMotionChain {
    fn name(&self) -> &str;

    /// Advance by `dt` seconds against the given colliders.
    fn advance(&mut self, dt: f32, colliders: &[Collider]) -> Result<(), MotionError>;

    /// Snap every joint back to its rest pose and drop accumulated velocity.
    fn reset_to_rest(&mut self);

    fn pose(&self) -> ChainPose {
        ChainPose {
            chain: self.name().to_string(),
            joints: Vec::new(),
        }
    }
}

/// A loaded model that can hand out its secondary-motion chains and colliders.
pub trait MotionRigSource {
    /// False once the model has been destroyed. Drivers bound to a dead model
    /// are evicted by the scheduler without being updated.
    fn is_alive(&self) -> bool;

    fn discover_chains(&self) -> Vec<Box<dyn SecondaryMotionChain>>;

    fn discover_colliders(&self) -> Vec<Collider>;
}
