//! The avatar descriptor: everything a host exports about one avatar.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::animator::{AnimationLayer, AnimatorController, Motion};
use crate::error::AssetError;
use crate::ids::ClipId;
use crate::menu::{ExpressionMenuTree, ExpressionParameter};
use crate::rig::SecondaryMotionRig;

/// A reusable animation motion asset. Identity is its [`ClipId`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub name: String,
    #[serde(default)]
    pub length_s: f32,
    #[serde(default)]
    pub looping: bool,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            length_s: 0.0,
            looping: false,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AvatarDescriptor {
    pub name: String,
    #[serde(default)]
    pub clips: Vec<AnimationClip>,
    #[serde(default)]
    pub layers: Vec<AnimationLayer>,
    #[serde(default)]
    pub expressions_menu: Option<ExpressionMenuTree>,
    #[serde(default)]
    pub expression_parameters: Vec<ExpressionParameter>,
    #[serde(default)]
    pub secondary_motion: SecondaryMotionRig,
}

impl AvatarDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, AssetError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(v: serde_json::Value) -> Result<Self, AssetError> {
        Ok(serde_json::from_value(v)?)
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(id.index())
    }

    /// Register a clip and return its id.
    pub fn add_clip(&mut self, clip: AnimationClip) -> ClipId {
        let id = ClipId::from(self.clips.len());
        self.clips.push(clip);
        id
    }

    pub fn find_clip(&self, name: &str) -> Option<ClipId> {
        self.clips
            .iter()
            .position(|c| c.name == name)
            .map(ClipId::from)
    }

    /// Check every cross reference, returning the first problem found.
    pub fn validate(&self) -> Result<(), AssetError> {
        match self.problems().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every dangling reference and duplicate declaration, in asset order.
    pub fn problems(&self) -> Vec<AssetError> {
        let mut out = Vec::new();
        for layer in &self.layers {
            if let Some(ctrl) = &layer.controller {
                self.controller_problems(ctrl, &mut out);
            }
        }
        if let Some(menu) = &self.expressions_menu {
            menu_problems(menu, &mut out);
        }
        let mut seen = HashSet::new();
        for p in &self.expression_parameters {
            if !seen.insert(p.name.as_str()) {
                out.push(AssetError::DuplicateParameter(p.name.clone()));
            }
        }
        out
    }

    fn controller_problems(&self, ctrl: &AnimatorController, out: &mut Vec<AssetError>) {
        for layer in &ctrl.layers {
            if ctrl.machine(layer.state_machine).is_none() {
                out.push(AssetError::MissingMachine {
                    owner: format!("{}/{}", ctrl.name, layer.name),
                    id: layer.state_machine,
                });
            }
        }
        let mut listed = HashSet::new();
        for machine in &ctrl.machines {
            let owner = || format!("{}/{}", ctrl.name, machine.name);
            for &child in &machine.children {
                if ctrl.machine(child).is_none() {
                    out.push(AssetError::MissingMachine {
                        owner: owner(),
                        id: child,
                    });
                }
            }
            for &state in &machine.states {
                if ctrl.state(state).is_none() {
                    out.push(AssetError::MissingState {
                        owner: owner(),
                        id: state,
                    });
                } else if !listed.insert(state) {
                    out.push(AssetError::SharedState {
                        controller: ctrl.name.clone(),
                        id: state,
                    });
                }
            }
            for t in &machine.any_state_transitions {
                if let Some(dest) = t.destination {
                    if ctrl.state(dest).is_none() {
                        out.push(AssetError::MissingState {
                            owner: owner(),
                            id: dest,
                        });
                    }
                }
            }
        }
        for state in &ctrl.states {
            let owner = format!("{}/{}", ctrl.name, state.name);
            if let Some(motion) = &state.motion {
                self.motion_problems(&owner, motion, out);
            }
            for t in &state.transitions {
                if let Some(dest) = t.destination {
                    if ctrl.state(dest).is_none() {
                        out.push(AssetError::MissingState {
                            owner: owner.clone(),
                            id: dest,
                        });
                    }
                }
            }
        }
    }

    fn motion_problems(&self, owner: &str, motion: &Motion, out: &mut Vec<AssetError>) {
        match motion {
            Motion::Clip(id) => {
                if self.clip(*id).is_none() {
                    out.push(AssetError::MissingClip {
                        owner: owner.to_string(),
                        id: *id,
                    });
                }
            }
            Motion::BlendTree(tree) => {
                let owner = format!("{owner}/{}", tree.name);
                for child in &tree.children {
                    if let Some(m) = &child.motion {
                        self.motion_problems(&owner, m, out);
                    }
                }
            }
        }
    }
}

fn menu_problems(tree: &ExpressionMenuTree, out: &mut Vec<AssetError>) {
    if let Some(root) = tree.root {
        if tree.menu(root).is_none() {
            out.push(AssetError::MissingMenu {
                owner: "expressions menu".to_string(),
                id: root,
            });
        }
    }
    for menu in &tree.menus {
        for control in &menu.controls {
            if let Some(sub) = control.sub_menu {
                if tree.menu(sub).is_none() {
                    out.push(AssetError::MissingMenu {
                        owner: format!("{}/{}", menu.name, control.name),
                        id: sub,
                    });
                }
            }
        }
    }
}
