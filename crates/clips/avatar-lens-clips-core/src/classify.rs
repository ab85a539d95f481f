//! Join expression-menu controls against the parameter → clip index.

use avatar_lens_api_core::{Control, ControlType, ExpressionMenuTree, MenuId};
use hashbrown::{HashMap, HashSet};

use crate::record::{ClassifiedClip, ParameterClipRecord, NO_PARAMETER, UNCATEGORIZED_PATH};

/// Index records grouped by parameter name, preserving index order per name.
struct ParameterLookup<'a> {
    by_name: HashMap<&'a str, Vec<&'a ParameterClipRecord>>,
}

impl<'a> ParameterLookup<'a> {
    fn new(index: &'a [ParameterClipRecord]) -> Self {
        let mut by_name: HashMap<&str, Vec<&ParameterClipRecord>> = HashMap::new();
        for rec in index {
            if let Some(name) = rec.parameter() {
                by_name.entry(name).or_default().push(rec);
            }
        }
        Self { by_name }
    }

    fn matches(&self, parameter: &str) -> &[&'a ParameterClipRecord] {
        self.by_name.get(parameter).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Clips reachable from menu controls, in menu traversal order.
///
/// Sub-menus are entered unless they are already an ancestor on the current
/// path; a menu shared by several parents is classified under each of them.
pub fn classify(
    menu: Option<&ExpressionMenuTree>,
    index: &[ParameterClipRecord],
) -> Vec<ClassifiedClip> {
    let Some(tree) = menu else {
        return Vec::new();
    };
    let Some(root) = tree.root else {
        return Vec::new();
    };
    let lookup = ParameterLookup::new(index);
    let mut ancestors = HashSet::new();
    classify_menu(tree, root, "", &lookup, &mut ancestors)
}

fn classify_menu(
    tree: &ExpressionMenuTree,
    id: MenuId,
    path: &str,
    lookup: &ParameterLookup<'_>,
    ancestors: &mut HashSet<MenuId>,
) -> Vec<ClassifiedClip> {
    let Some(menu) = tree.menu(id) else {
        return Vec::new();
    };
    if !ancestors.insert(id) {
        log::warn!("expression menu '{}' contains itself; not re-entering", menu.name);
        return Vec::new();
    }

    let mut out = Vec::new();
    for control in &menu.controls {
        let control_path = join_path(path, &control.name);
        if control.control_type == ControlType::SubMenu {
            if let Some(sub) = control.sub_menu {
                out.extend(classify_menu(tree, sub, &control_path, lookup, ancestors));
            }
            continue;
        }
        out.extend(classify_control(control, &control_path, lookup));
    }

    ancestors.remove(&id);
    out
}

fn classify_control(
    control: &Control,
    control_path: &str,
    lookup: &ParameterLookup<'_>,
) -> Vec<ClassifiedClip> {
    let entry = |rec: &ParameterClipRecord, parameter: &str, trigger_value: Option<f32>| {
        ClassifiedClip {
            clip: rec.clip,
            control_type: control.control_type,
            parameter_name: parameter.to_string(),
            menu_path: control_path.to_string(),
            layer: rec.layer,
            trigger_value,
        }
    };

    let mut out = Vec::new();
    if let Some(parameter) = control.parameter_name() {
        for &rec in lookup.matches(parameter) {
            let value = if control.control_type.carries_value() {
                Some(control.value)
            } else {
                rec.trigger_value
            };
            out.push(entry(rec, parameter, value));
        }
    }
    for parameter in control.sub_parameter_names() {
        for &rec in lookup.matches(parameter) {
            out.push(entry(rec, parameter, None));
        }
    }
    out
}

/// Every parameter that [`classify`] looks up: primary and secondary
/// parameters of the non-sub-menu controls reachable from the root.
pub fn referenced_parameters(menu: Option<&ExpressionMenuTree>) -> HashSet<String> {
    let mut names = HashSet::new();
    let Some(tree) = menu else {
        return names;
    };
    let mut visited = HashSet::new();
    let mut pending: Vec<MenuId> = tree.root.into_iter().collect();
    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(m) = tree.menu(id) else {
            continue;
        };
        for control in &m.controls {
            if control.control_type == ControlType::SubMenu {
                pending.extend(control.sub_menu);
                continue;
            }
            if let Some(p) = control.parameter_name() {
                names.insert(p.to_string());
            }
            names.extend(control.sub_parameter_names().map(str::to_string));
        }
    }
    names
}

/// Records no menu control can trigger, surfaced as buttons under [`UNCATEGORIZED_PATH`].
pub fn uncategorized(
    menu: Option<&ExpressionMenuTree>,
    index: &[ParameterClipRecord],
) -> Vec<ClassifiedClip> {
    let used = referenced_parameters(menu);
    index
        .iter()
        .filter(|rec| match rec.parameter() {
            Some(name) => !used.contains(name),
            None => true,
        })
        .map(|rec| ClassifiedClip {
            clip: rec.clip,
            control_type: ControlType::Button,
            parameter_name: rec.parameter().unwrap_or(NO_PARAMETER).to_string(),
            menu_path: UNCATEGORIZED_PATH.to_string(),
            layer: rec.layer,
            trigger_value: rec.trigger_value,
        })
        .collect()
}

/// `classify ++ uncategorized`, keeping the first of each
/// (clip, control type, parameter, menu path, layer).
pub fn publish(
    menu: Option<&ExpressionMenuTree>,
    index: &[ParameterClipRecord],
) -> Vec<ClassifiedClip> {
    let mut seen = HashSet::new();
    let published: Vec<ClassifiedClip> = classify(menu, index)
        .into_iter()
        .chain(uncategorized(menu, index))
        .filter(|c| seen.insert(c.dedup_key()))
        .collect();
    log::debug!(
        "published {} classified clips from {} index records",
        published.len(),
        index.len()
    );
    published
}
