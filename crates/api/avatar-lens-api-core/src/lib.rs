//! avatar-lens-api-core: shared avatar asset model (engine-agnostic)
//!
//! Read-only views over host-exported avatar data: animation layers and their
//! animator controllers, expression menus and parameters, and secondary-motion
//! rigs. Everything is serde-loadable so hosts can hand data over as JSON.

pub mod animator;
pub mod descriptor;
pub mod error;
pub mod ids;
pub mod menu;
pub mod rig;

pub use animator::{
    AnimationLayer, AnimatorController, BlendTree, BlendType, ChildMotion, Condition,
    ConditionMode, ControllerLayer, LayerKind, Motion, State, StateMachine, Transition,
};
pub use descriptor::{AnimationClip, AvatarDescriptor};
pub use error::AssetError;
pub use ids::{ClipId, MachineId, MenuId, StateId};
pub use menu::{
    Control, ControlType, ExpressionMenu, ExpressionMenuTree, ExpressionParameter, ParameterType,
};
pub use rig::{ColliderDesc, ColliderShape, SecondaryMotionRig, SpringChainDesc, SpringJointDesc};
