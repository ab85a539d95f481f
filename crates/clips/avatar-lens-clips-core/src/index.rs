//! Parameter → clip index over animator layers.
//!
//! Every controller layer's root machine is walked depth-first (preorder,
//! children in declaration order). Output order is a stable contract:
//!
//! - layers in slot order, controller layers in declaration order;
//! - machines in preorder, states in machine order (a state listed by more
//!   than one machine counts once, at its first listing);
//! - per state, direct transitions first (source states in walk order, their
//!   transitions and conditions in declaration order), then AnyState
//!   transitions (machines in walk order);
//! - per blend tree leaf, condition records before blend-axis records.
//!
//! Missing pieces (no controller, no motion, dangling ids) contribute nothing.

use avatar_lens_api_core::{
    AnimationLayer, AnimatorController, BlendTree, ChildMotion, ClipId, Condition, LayerKind,
    MachineId, Motion, State, StateId,
};
use hashbrown::{HashMap, HashSet};

use crate::record::ParameterClipRecord;

/// Index every clip reachable from `layers`.
pub fn build_index(layers: &[AnimationLayer]) -> Vec<ParameterClipRecord> {
    let records: Vec<ParameterClipRecord> = layers.iter().flat_map(index_layer).collect();
    log::debug!(
        "indexed {} clip records from {} animation layers",
        records.len(),
        layers.len()
    );
    records
}

/// Index one playable layer slot. Unassigned slots yield nothing.
pub fn index_layer(layer: &AnimationLayer) -> Vec<ParameterClipRecord> {
    let Some(ctrl) = &layer.controller else {
        return Vec::new();
    };
    ctrl.layers
        .iter()
        .flat_map(|l| index_graph(ctrl, l.state_machine, layer.kind))
        .collect()
}

/// Index the machine tree rooted at `root`.
pub fn index_graph(
    ctrl: &AnimatorController,
    root: MachineId,
    layer: LayerKind,
) -> Vec<ParameterClipRecord> {
    let machines = machine_paths(ctrl, root);
    let reaching = ReachingConditions::collect(ctrl, &machines);

    let mut out = Vec::new();
    let mut indexed = HashSet::new();
    for (id, path) in &machines {
        let Some(machine) = ctrl.machine(*id) else {
            continue;
        };
        for &sid in &machine.states {
            let Some(state) = ctrl.state(sid) else {
                continue;
            };
            if !indexed.insert(sid) {
                log::debug!("{}: {sid} listed in more than one machine", ctrl.name);
                continue;
            }
            let state_path = format!("{path}/{}", state.name);
            out.extend(index_state(
                state,
                &state_path,
                layer,
                &reaching.for_state(sid),
            ));
        }
    }
    out
}

/// Machines under `root` in preorder, each with its slash-joined path.
///
/// A machine id is visited at most once, so self-referencing or shared
/// children cannot loop.
pub fn machine_paths(ctrl: &AnimatorController, root: MachineId) -> Vec<(MachineId, String)> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    walk_machine(ctrl, root, None, &mut visited, &mut out);
    out
}

fn walk_machine(
    ctrl: &AnimatorController,
    id: MachineId,
    parent_path: Option<&str>,
    visited: &mut HashSet<MachineId>,
    out: &mut Vec<(MachineId, String)>,
) {
    if !visited.insert(id) {
        log::debug!("{}: skipping revisit of {id}", ctrl.name);
        return;
    }
    let Some(machine) = ctrl.machine(id) else {
        return;
    };
    let path = match parent_path {
        Some(parent) => format!("{parent}/{}", machine.name),
        None => machine.name.clone(),
    };
    out.push((id, path.clone()));
    for &child in &machine.children {
        walk_machine(ctrl, child, Some(&path), visited, out);
    }
}

/// Conditions on the transitions entering each state of one machine tree.
#[derive(Debug, Default)]
pub struct ReachingConditions<'a> {
    direct: HashMap<StateId, Vec<&'a Condition>>,
    any_state: HashMap<StateId, Vec<&'a Condition>>,
}

impl<'a> ReachingConditions<'a> {
    pub fn collect(ctrl: &'a AnimatorController, machines: &[(MachineId, String)]) -> Self {
        let mut rc = Self::default();
        let mut sources = HashSet::new();
        for (id, _) in machines {
            let Some(machine) = ctrl.machine(*id) else {
                continue;
            };
            for &sid in &machine.states {
                if !sources.insert(sid) {
                    continue;
                }
                let Some(state) = ctrl.state(sid) else {
                    continue;
                };
                for t in &state.transitions {
                    if let Some(dest) = t.destination {
                        push_conditions(rc.direct.entry(dest).or_default(), &t.conditions);
                    }
                }
            }
        }
        for (id, _) in machines {
            let Some(machine) = ctrl.machine(*id) else {
                continue;
            };
            for t in &machine.any_state_transitions {
                if let Some(dest) = t.destination {
                    push_conditions(rc.any_state.entry(dest).or_default(), &t.conditions);
                }
            }
        }
        rc
    }

    /// Direct conditions followed by AnyState conditions.
    pub fn for_state(&self, id: StateId) -> Vec<&'a Condition> {
        let direct = self.direct.get(&id).into_iter().flatten();
        let any = self.any_state.get(&id).into_iter().flatten();
        direct.chain(any).copied().collect()
    }
}

fn push_conditions<'a>(into: &mut Vec<&'a Condition>, conditions: &'a [Condition]) {
    into.extend(conditions.iter().filter(|c| c.parameter_name().is_some()));
}

/// Where a record was found.
#[derive(Clone, Copy)]
struct Site<'s> {
    layer: LayerKind,
    state_path: &'s str,
    blend_tree_path: Option<&'s str>,
}

impl Site<'_> {
    fn record(
        self,
        clip: ClipId,
        parameter: Option<&str>,
        value: Option<f32>,
    ) -> ParameterClipRecord {
        ParameterClipRecord {
            parameter_name: parameter.map(str::to_string),
            clip,
            layer: self.layer,
            state_path: self.state_path.to_string(),
            trigger_value: value,
            blend_tree_path: self.blend_tree_path.map(str::to_string),
        }
    }

    fn condition_records(
        self,
        clip: ClipId,
        conditions: &[&Condition],
    ) -> Vec<ParameterClipRecord> {
        conditions
            .iter()
            .map(|c| self.record(clip, c.parameter_name(), Some(c.trigger_value())))
            .collect()
    }
}

/// Records for one state given the conditions that reach it.
pub fn index_state(
    state: &State,
    state_path: &str,
    layer: LayerKind,
    conditions: &[&Condition],
) -> Vec<ParameterClipRecord> {
    let site = Site {
        layer,
        state_path,
        blend_tree_path: None,
    };
    match &state.motion {
        None => Vec::new(),
        Some(Motion::Clip(clip)) => {
            if conditions.is_empty() {
                vec![site.record(*clip, None, None)]
            } else {
                site.condition_records(*clip, conditions)
            }
        }
        Some(Motion::BlendTree(tree)) => {
            index_blend_tree(tree, &tree.name, layer, state_path, conditions)
        }
    }
}

/// Records for every clip leaf under `tree`, whose own path is `tree_path`.
pub fn index_blend_tree(
    tree: &BlendTree,
    tree_path: &str,
    layer: LayerKind,
    state_path: &str,
    conditions: &[&Condition],
) -> Vec<ParameterClipRecord> {
    let site = Site {
        layer,
        state_path,
        blend_tree_path: Some(tree_path),
    };
    let mut out = Vec::new();
    for child in &tree.children {
        match &child.motion {
            None => {}
            Some(Motion::BlendTree(sub)) => {
                let sub_path = format!("{tree_path}/{}", sub.name);
                out.extend(index_blend_tree(sub, &sub_path, layer, state_path, conditions));
            }
            Some(Motion::Clip(clip)) => {
                let mut leaf = site.condition_records(*clip, conditions);
                leaf.extend(
                    axis_values(tree, child)
                        .into_iter()
                        .map(|(name, value)| site.record(*clip, Some(name), Some(value))),
                );
                if leaf.is_empty() {
                    leaf.push(site.record(*clip, None, None));
                }
                out.extend(leaf);
            }
        }
    }
    out
}

/// Blend parameter values at which `child` is fully weighted.
///
/// 1D trees use the child's threshold on the first axis. 2D trees use
/// `position.x` / `position.y` for the first / second axis. Empty parameter
/// names are skipped.
pub fn axis_values<'t>(tree: &'t BlendTree, child: &ChildMotion) -> Vec<(&'t str, f32)> {
    let mut out = Vec::with_capacity(2);
    let two_d = tree.blend_type.is_two_dimensional();
    if !tree.blend_parameter.is_empty() {
        let x = if two_d { child.position[0] } else { child.threshold };
        out.push((tree.blend_parameter.as_str(), x));
    }
    if two_d && !tree.blend_parameter_y.is_empty() {
        out.push((tree.blend_parameter_y.as_str(), child.position[1]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_lens_api_core::{BlendType, ConditionMode, Transition};

    fn clip_state(ctrl: &mut AnimatorController, m: MachineId, name: &str, clip: u32) -> StateId {
        ctrl.add_state(m, name, Some(Motion::Clip(ClipId(clip))))
    }

    fn fx(ctrl: AnimatorController) -> Vec<AnimationLayer> {
        vec![AnimationLayer::new(LayerKind::Fx, ctrl)]
    }

    fn params(records: &[ParameterClipRecord]) -> Vec<(Option<&str>, Option<f32>)> {
        records
            .iter()
            .map(|r| (r.parameter(), r.trigger_value))
            .collect()
    }

    #[test]
    fn one_record_per_transition_condition_pair() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("Toggles");
        let off = ctrl.add_state(root, "Off", None);
        let on = clip_state(&mut ctrl, root, "On", 0);
        ctrl.add_transition(
            off,
            Transition::to(on)
                .when(Condition::new("Enabled", ConditionMode::If, 0.0))
                .when(Condition::new("Level", ConditionMode::Greater, 0.5)),
        );
        ctrl.add_transition(off, Transition::to(on).when(Condition::equals("Mode", 2.0)));

        let records = build_index(&fx(ctrl));
        assert_eq!(
            params(&records),
            vec![
                (Some("Enabled"), Some(1.0)),
                (Some("Level"), Some(0.5)),
                (Some("Mode"), Some(2.0)),
            ]
        );
        assert!(records.iter().all(|r| r.state_path == "Toggles/On"));
        assert!(records.iter().all(|r| r.blend_tree_path.is_none()));
    }

    #[test]
    fn unreached_clip_state_yields_single_unparameterized_record() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("Base");
        clip_state(&mut ctrl, root, "Idle", 3);

        let records = build_index(&fx(ctrl));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parameter_name, None);
        assert_eq!(records[0].trigger_value, None);
        assert_eq!(records[0].clip, ClipId(3));
        assert_eq!(records[0].layer, LayerKind::Fx);
    }

    #[test]
    fn any_state_transitions_match_direct_transitions() {
        let mut direct = AnimatorController::new("FX");
        let root = direct.add_layer("L");
        let from = direct.add_state(root, "From", None);
        let to = clip_state(&mut direct, root, "To", 1);
        direct.add_transition(from, Transition::to(to).when(Condition::equals("P", 7.0)));

        let mut any = AnimatorController::new("FX");
        let root = any.add_layer("L");
        any.add_state(root, "From", None);
        let to = clip_state(&mut any, root, "To", 1);
        any.add_any_state_transition(root, Transition::to(to).when(Condition::equals("P", 7.0)));

        assert_eq!(build_index(&fx(direct)), build_index(&fx(any)));
    }

    #[test]
    fn direct_conditions_precede_any_state_conditions() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("L");
        let idle = ctrl.add_state(root, "Idle", None);
        let target = clip_state(&mut ctrl, root, "Target", 0);
        ctrl.add_any_state_transition(
            root,
            Transition::to(target).when(Condition::equals("Any", 1.0)),
        );
        ctrl.add_transition(idle, Transition::to(target).when(Condition::equals("Direct", 2.0)));

        let records = build_index(&fx(ctrl));
        assert_eq!(
            params(&records),
            vec![(Some("Direct"), Some(2.0)), (Some("Any"), Some(1.0))]
        );
    }

    #[test]
    fn nested_machines_extend_the_state_path() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("Hands");
        let left = ctrl.add_child_machine(root, "Left");
        let deep = ctrl.add_child_machine(left, "Deep");
        let idle = ctrl.add_state(root, "Idle", None);
        let fist = clip_state(&mut ctrl, deep, "Fist", 2);
        ctrl.add_transition(idle, Transition::to(fist).when(Condition::equals("Gesture", 1.0)));

        let records = build_index(&fx(ctrl));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state_path, "Hands/Left/Deep/Fist");
        assert_eq!(records[0].parameter(), Some("Gesture"));
    }

    #[test]
    fn self_referencing_machine_is_walked_once() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("Loop");
        ctrl.machines[root.index()].children.push(root);
        clip_state(&mut ctrl, root, "Only", 0);

        assert_eq!(machine_paths(&ctrl, root).len(), 1);
        assert_eq!(build_index(&fx(ctrl)).len(), 1);
    }

    #[test]
    fn state_listed_by_two_machines_counts_once() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("L");
        let child = ctrl.add_child_machine(root, "C");
        let off = ctrl.add_state(root, "Off", None);
        let on = clip_state(&mut ctrl, root, "On", 0);
        ctrl.add_transition(off, Transition::to(on).when(Condition::equals("Hat", 1.0)));
        ctrl.machines[child.index()].states.push(off);
        ctrl.machines[child.index()].states.push(on);

        let records = build_index(&fx(ctrl));
        assert_eq!(params(&records), vec![(Some("Hat"), Some(1.0))]);
        assert_eq!(records[0].state_path, "L/On");
    }

    #[test]
    fn missing_controller_motion_and_ids_contribute_nothing() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("L");
        ctrl.add_state(root, "Empty", None);
        ctrl.machines[root.index()].states.push(StateId(99));
        ctrl.machines[root.index()].children.push(MachineId(42));
        ctrl.add_any_state_transition(root, Transition::to(StateId(99)));

        let mut layers = fx(ctrl);
        layers.push(AnimationLayer::empty(LayerKind::Gesture));
        assert!(build_index(&layers).is_empty());
    }

    #[test]
    fn one_d_blend_tree_emits_condition_and_threshold_records() {
        let tree = BlendTree::one_d("Speed", "Speed")
            .with_child(ChildMotion::at_threshold(Motion::Clip(ClipId(0)), 0.0))
            .with_child(ChildMotion::at_threshold(Motion::Clip(ClipId(1)), 1.0));
        let mut ctrl = AnimatorController::new("Base");
        let root = ctrl.add_layer("Loco");
        let idle = ctrl.add_state(root, "Idle", None);
        let moving = ctrl.add_state(root, "Move", Some(Motion::BlendTree(tree)));
        ctrl.add_transition(idle, Transition::to(moving).when(Condition::equals("Speed", 0.5)));

        let records = build_index(&fx(ctrl));
        let by_clip: Vec<_> = records
            .iter()
            .map(|r| (r.clip, r.parameter(), r.trigger_value))
            .collect();
        assert_eq!(
            by_clip,
            vec![
                (ClipId(0), Some("Speed"), Some(0.5)),
                (ClipId(0), Some("Speed"), Some(0.0)),
                (ClipId(1), Some("Speed"), Some(0.5)),
                (ClipId(1), Some("Speed"), Some(1.0)),
            ]
        );
        assert!(records.iter().all(|r| {
            r.blend_tree_path.as_deref() == Some("Speed") && r.state_path == "Loco/Move"
        }));
    }

    #[test]
    fn one_d_tree_ignores_second_axis() {
        let mut tree = BlendTree::one_d("Speed", "Speed")
            .with_child(ChildMotion::at_threshold(Motion::Clip(ClipId(0)), 0.25));
        tree.blend_parameter_y = "Y".into();
        tree.children[0].position = [0.0, 0.75];
        assert_eq!(axis_values(&tree, &tree.children[0]), vec![("Speed", 0.25)]);

        let mut ctrl = AnimatorController::new("Base");
        let root = ctrl.add_layer("Loco");
        ctrl.add_state(root, "Move", Some(Motion::BlendTree(tree)));
        let records = build_index(&fx(ctrl));
        assert_eq!(params(&records), vec![(Some("Speed"), Some(0.25))]);
    }

    #[test]
    fn two_d_blend_trees_read_positions_and_nested_paths() {
        let inner = BlendTree::two_d("Crouch", BlendType::SimpleDirectional2D, "X", "")
            .with_child(ChildMotion::at_position(Motion::Clip(ClipId(2)), -1.0, 0.5));
        let tree = BlendTree::two_d("Walk", BlendType::FreeformCartesian2D, "X", "Y")
            .with_child(ChildMotion::at_position(Motion::Clip(ClipId(1)), 0.25, 0.75))
            .with_child(ChildMotion {
                motion: Some(Motion::BlendTree(inner)),
                ..Default::default()
            })
            .with_child(ChildMotion::default());
        let state = State {
            name: "Walk".into(),
            motion: Some(Motion::BlendTree(tree)),
            transitions: Vec::new(),
        };

        let records = index_state(&state, "Base/Walk", LayerKind::Base, &[]);
        let got: Vec<_> = records
            .iter()
            .map(|r| (r.clip, r.parameter(), r.trigger_value, r.blend_tree_path.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                (ClipId(1), Some("X"), Some(0.25), Some("Walk")),
                (ClipId(1), Some("Y"), Some(0.75), Some("Walk")),
                (ClipId(2), Some("X"), Some(-1.0), Some("Walk/Crouch")),
            ]
        );
    }

    #[test]
    fn parameterless_blend_leaf_is_not_dropped() {
        let tree = BlendTree::one_d("Static", "")
            .with_child(ChildMotion::at_threshold(Motion::Clip(ClipId(4)), 0.0));
        let state = State {
            name: "S".into(),
            motion: Some(Motion::BlendTree(tree)),
            transitions: Vec::new(),
        };
        let records = index_state(&state, "L/S", LayerKind::Fx, &[]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].parameter_name, None);
        assert_eq!(records[0].blend_tree_path.as_deref(), Some("Static"));
    }

    #[test]
    fn unbound_conditions_are_ignored() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("L");
        let a = ctrl.add_state(root, "A", None);
        let b = clip_state(&mut ctrl, root, "B", 0);
        ctrl.add_transition(a, Transition::to(b).when(Condition::equals("", 1.0)));

        let records = build_index(&fx(ctrl));
        assert_eq!(params(&records), vec![(None, None)]);
    }

    #[test]
    fn repeated_builds_are_identical() {
        let mut ctrl = AnimatorController::new("FX");
        let root = ctrl.add_layer("L");
        let child = ctrl.add_child_machine(root, "C");
        let a = clip_state(&mut ctrl, root, "A", 0);
        let b = clip_state(&mut ctrl, child, "B", 1);
        for v in 0..8 {
            ctrl.add_transition(
                a,
                Transition::to(b).when(Condition::equals(format!("P{v}"), v as f32)),
            );
            ctrl.add_any_state_transition(
                child,
                Transition::to(a).when(Condition::equals("Back", v as f32)),
            );
        }
        let layers = fx(ctrl);
        assert_eq!(build_index(&layers), build_index(&layers));
    }
}
