//! Expression menus and expression parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::MenuId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    Button,
    Toggle,
    SubMenu,
    TwoAxisPuppet,
    FourAxisPuppet,
    RadialPuppet,
}

impl ControlType {
    /// Whether the control sets its primary parameter to its own declared `value`.
    pub fn carries_value(self) -> bool {
        matches!(self, ControlType::Button | ControlType::Toggle)
    }

    pub fn label(self) -> &'static str {
        match self {
            ControlType::Button => "Button",
            ControlType::Toggle => "Toggle",
            ControlType::SubMenu => "SubMenu",
            ControlType::TwoAxisPuppet => "TwoAxisPuppet",
            ControlType::FourAxisPuppet => "FourAxisPuppet",
            ControlType::RadialPuppet => "RadialPuppet",
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Control {
    pub name: String,
    #[serde(rename = "type")]
    pub control_type: ControlType,
    #[serde(default)]
    pub parameter: Option<String>,
    #[serde(default)]
    pub value: f32,
    /// Puppet axis parameters, in axis order.
    #[serde(default)]
    pub sub_parameters: Vec<String>,
    #[serde(default)]
    pub sub_menu: Option<MenuId>,
}

impl Control {
    pub fn new(name: impl Into<String>, control_type: ControlType) -> Self {
        Self {
            name: name.into(),
            control_type,
            parameter: None,
            value: 1.0,
            sub_parameters: Vec::new(),
            sub_menu: None,
        }
    }

    pub fn toggle(name: impl Into<String>, parameter: impl Into<String>, value: f32) -> Self {
        Self::new(name, ControlType::Toggle)
            .with_parameter(parameter)
            .with_value(value)
    }

    pub fn button(name: impl Into<String>, parameter: impl Into<String>, value: f32) -> Self {
        Self::new(name, ControlType::Button)
            .with_parameter(parameter)
            .with_value(value)
    }

    pub fn sub_menu(name: impl Into<String>, menu: MenuId) -> Self {
        let mut c = Self::new(name, ControlType::SubMenu);
        c.sub_menu = Some(menu);
        c
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_value(mut self, value: f32) -> Self {
        self.value = value;
        self
    }

    pub fn with_sub_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.sub_parameters.push(parameter.into());
        self
    }

    /// Primary parameter, `None` when unset or empty.
    pub fn parameter_name(&self) -> Option<&str> {
        self.parameter.as_deref().filter(|p| !p.is_empty())
    }

    /// Non-empty secondary parameters.
    pub fn sub_parameter_names(&self) -> impl Iterator<Item = &str> {
        self.sub_parameters
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExpressionMenu {
    pub name: String,
    #[serde(default)]
    pub controls: Vec<Control>,
}

/// Arena of menus plus the root entry. Sub-menus are shared by id, so the same
/// menu may hang under several parents (or, in malformed assets, under itself).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExpressionMenuTree {
    #[serde(default)]
    pub root: Option<MenuId>,
    #[serde(default)]
    pub menus: Vec<ExpressionMenu>,
}

impl ExpressionMenuTree {
    /// Create a tree whose root menu is `root_name`.
    pub fn with_root(root_name: impl Into<String>) -> Self {
        Self {
            root: Some(MenuId(0)),
            menus: vec![ExpressionMenu {
                name: root_name.into(),
                controls: Vec::new(),
            }],
        }
    }

    pub fn menu(&self, id: MenuId) -> Option<&ExpressionMenu> {
        self.menus.get(id.index())
    }

    pub fn root_menu(&self) -> Option<&ExpressionMenu> {
        self.root.and_then(|id| self.menu(id))
    }

    pub fn add_menu(&mut self, name: impl Into<String>) -> MenuId {
        let id = MenuId::from(self.menus.len());
        self.menus.push(ExpressionMenu {
            name: name.into(),
            controls: Vec::new(),
        });
        id
    }

    /// Append a control to `menu`. Unknown menus drop the control.
    pub fn add_control(&mut self, menu: MenuId, control: Control) {
        if let Some(m) = self.menus.get_mut(menu.index()) {
            m.controls.push(control);
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Int,
    Float,
    Bool,
}

/// Synced avatar parameter declared alongside the menu.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionParameter {
    pub name: String,
    pub value_type: ParameterType,
    #[serde(default)]
    pub default_value: f32,
    #[serde(default = "default_saved")]
    pub saved: bool,
}

fn default_saved() -> bool {
    true
}
