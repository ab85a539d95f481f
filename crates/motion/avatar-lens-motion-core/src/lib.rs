//! Secondary motion for avatar-lens.
//!
//! A [`SecondaryMotionSolver`] is bound to one loaded model and advances the
//! chains discovered on it. All solvers share one [`MotionScheduler`], which
//! holds them weakly and keeps the host idle callback subscribed only while
//! something is registered.

pub mod chain;
pub mod collider;
pub mod config;
pub mod error;
pub mod math;
pub mod scheduler;
pub mod solver;
pub mod spring;

pub use chain::{ChainPose, MotionRigSource, SecondaryMotionChain};
pub use collider::Collider;
pub use config::{MotionConfig, DEFAULT_SIMULATION_STEP};
pub use error::MotionError;
pub use scheduler::{
    DriverFailure, DriverRef, IdleFlag, IdleHook, MotionDriver, MotionScheduler, NoopIdleHook,
    TickReport,
};
pub use solver::{SecondaryMotionSolver, SharedSolver, StepReport};
pub use spring::SpringBoneChain;
