//! Animator layers, controllers and their state machine graphs.
//!
//! A controller owns flat arenas of machines and states. Machines reference
//! their states and child machines by id, transitions reference their
//! destination by id. Nothing here is validated on construction; see
//! [`AvatarDescriptor::validate`](crate::AvatarDescriptor::validate).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{ClipId, MachineId, StateId};

/// Playable layer slot of an avatar. Closed set.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Base,
    Additive,
    Gesture,
    Action,
    Fx,
    Sitting,
    TPose,
    IkPose,
}

impl LayerKind {
    pub fn label(self) -> &'static str {
        match self {
            LayerKind::Base => "Base",
            LayerKind::Additive => "Additive",
            LayerKind::Gesture => "Gesture",
            LayerKind::Action => "Action",
            LayerKind::Fx => "FX",
            LayerKind::Sitting => "Sitting",
            LayerKind::TPose => "TPose",
            LayerKind::IkPose => "IKPose",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A playable layer slot holding an optional animator controller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationLayer {
    pub kind: LayerKind,
    #[serde(default)]
    pub controller: Option<AnimatorController>,
}

impl AnimationLayer {
    pub fn new(kind: LayerKind, controller: AnimatorController) -> Self {
        Self {
            kind,
            controller: Some(controller),
        }
    }

    /// A slot with nothing assigned.
    pub fn empty(kind: LayerKind) -> Self {
        Self {
            kind,
            controller: None,
        }
    }
}

fn default_weight() -> f32 {
    1.0
}

/// One layer inside a controller; its machine is a root state graph.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ControllerLayer {
    pub name: String,
    pub state_machine: MachineId,
    #[serde(default = "default_weight")]
    pub default_weight: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimatorController {
    pub name: String,
    #[serde(default)]
    pub layers: Vec<ControllerLayer>,
    #[serde(default)]
    pub machines: Vec<StateMachine>,
    #[serde(default)]
    pub states: Vec<State>,
}

impl AnimatorController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn machine(&self, id: MachineId) -> Option<&StateMachine> {
        self.machines.get(id.index())
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index())
    }

    /// Add a root machine together with a controller layer pointing at it.
    pub fn add_layer(&mut self, name: impl Into<String>) -> MachineId {
        let name = name.into();
        let id = self.push_machine(StateMachine::new(name.clone()));
        self.layers.push(ControllerLayer {
            name,
            state_machine: id,
            default_weight: 1.0,
        });
        id
    }

    /// Add a machine nested under `parent`. Unknown parents leave the machine detached.
    pub fn add_child_machine(&mut self, parent: MachineId, name: impl Into<String>) -> MachineId {
        let id = self.push_machine(StateMachine::new(name));
        if let Some(p) = self.machines.get_mut(parent.index()) {
            p.children.push(id);
        }
        id
    }

    /// Add a state to `machine`.
    pub fn add_state(
        &mut self,
        machine: MachineId,
        name: impl Into<String>,
        motion: Option<Motion>,
    ) -> StateId {
        let id = StateId::from(self.states.len());
        self.states.push(State {
            name: name.into(),
            motion,
            transitions: Vec::new(),
        });
        if let Some(m) = self.machines.get_mut(machine.index()) {
            m.states.push(id);
        }
        id
    }

    /// Append an outgoing transition to `from`.
    pub fn add_transition(&mut self, from: StateId, transition: Transition) {
        if let Some(s) = self.states.get_mut(from.index()) {
            s.transitions.push(transition);
        }
    }

    /// Append an AnyState transition to `machine`.
    pub fn add_any_state_transition(&mut self, machine: MachineId, transition: Transition) {
        if let Some(m) = self.machines.get_mut(machine.index()) {
            m.any_state_transitions.push(transition);
        }
    }

    fn push_machine(&mut self, machine: StateMachine) -> MachineId {
        let id = MachineId::from(self.machines.len());
        self.machines.push(machine);
        id
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StateMachine {
    pub name: String,
    #[serde(default)]
    pub states: Vec<StateId>,
    #[serde(default)]
    pub any_state_transitions: Vec<Transition>,
    #[serde(default)]
    pub children: Vec<MachineId>,
}

impl StateMachine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    #[serde(default)]
    pub motion: Option<Motion>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// What a state (or blend tree child) plays.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Clip(ClipId),
    BlendTree(BlendTree),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Transition {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub destination: Option<StateId>,
}

impl Transition {
    pub fn to(destination: StateId) -> Self {
        Self {
            conditions: Vec::new(),
            destination: Some(destination),
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    If,
    IfNot,
    Greater,
    Less,
    Equals,
    NotEqual,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub parameter: String,
    pub mode: ConditionMode,
    #[serde(default)]
    pub threshold: f32,
}

impl Condition {
    pub fn new(parameter: impl Into<String>, mode: ConditionMode, threshold: f32) -> Self {
        Self {
            parameter: parameter.into(),
            mode,
            threshold,
        }
    }

    /// Shorthand for an `Equals` condition, the common case for int-driven menus.
    pub fn equals(parameter: impl Into<String>, threshold: f32) -> Self {
        Self::new(parameter, ConditionMode::Equals, threshold)
    }

    /// Parameter name, or `None` when the condition is unbound.
    pub fn parameter_name(&self) -> Option<&str> {
        if self.parameter.is_empty() {
            None
        } else {
            Some(&self.parameter)
        }
    }

    /// Parameter value that satisfies this condition.
    ///
    /// Bool modes ignore the stored threshold.
    pub fn trigger_value(&self) -> f32 {
        match self.mode {
            ConditionMode::If => 1.0,
            ConditionMode::IfNot => 0.0,
            _ => self.threshold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BlendType {
    #[serde(rename = "1d")]
    Simple1D,
    #[serde(rename = "2d_simple_directional")]
    SimpleDirectional2D,
    #[serde(rename = "2d_freeform_directional")]
    FreeformDirectional2D,
    #[serde(rename = "2d_freeform_cartesian")]
    FreeformCartesian2D,
}

impl BlendType {
    pub fn is_two_dimensional(self) -> bool {
        !matches!(self, BlendType::Simple1D)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlendTree {
    pub name: String,
    pub blend_type: BlendType,
    #[serde(default)]
    pub blend_parameter: String,
    #[serde(default)]
    pub blend_parameter_y: String,
    #[serde(default)]
    pub children: Vec<ChildMotion>,
}

impl BlendTree {
    pub fn one_d(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blend_type: BlendType::Simple1D,
            blend_parameter: parameter.into(),
            blend_parameter_y: String::new(),
            children: Vec::new(),
        }
    }

    pub fn two_d(
        name: impl Into<String>,
        blend_type: BlendType,
        parameter_x: impl Into<String>,
        parameter_y: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            blend_type,
            blend_parameter: parameter_x.into(),
            blend_parameter_y: parameter_y.into(),
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: ChildMotion) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChildMotion {
    #[serde(default)]
    pub motion: Option<Motion>,
    #[serde(default)]
    pub threshold: f32,
    #[serde(default)]
    pub position: [f32; 2],
}

impl ChildMotion {
    pub fn at_threshold(motion: Motion, threshold: f32) -> Self {
        Self {
            motion: Some(motion),
            threshold,
            position: [0.0, 0.0],
        }
    }

    pub fn at_position(motion: Motion, x: f32, y: f32) -> Self {
        Self {
            motion: Some(motion),
            threshold: 0.0,
            position: [x, y],
        }
    }
}
