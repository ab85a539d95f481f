//! Selectable clip list for one bound avatar.

use avatar_lens_api_core::{AnimationClip, AvatarDescriptor, ClipId};
use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::classify::publish;
use crate::index::build_index;
use crate::record::{ClassifiedClip, ParameterClipRecord, UNCATEGORIZED_PATH};

/// Published classification plus the clip names needed to present it.
///
/// Rebuilt from scratch whenever the bound avatar changes.
#[derive(Clone, Debug, Default)]
pub struct ClipCatalog {
    records: Vec<ParameterClipRecord>,
    entries: Vec<ClassifiedClip>,
    clips: Vec<AnimationClip>,
}

impl ClipCatalog {
    pub fn build(avatar: &AvatarDescriptor) -> Self {
        let records = build_index(&avatar.layers);
        let entries = publish(avatar.expressions_menu.as_ref(), &records);
        log::debug!(
            "{}: {} selectable entries over {} clips",
            avatar.name,
            entries.len(),
            avatar.clips.len()
        );
        Self {
            records,
            entries,
            clips: avatar.clips.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The published list, in classification order.
    pub fn entries(&self) -> &[ClassifiedClip] {
        &self.entries
    }

    /// The raw index the entries were classified from.
    pub fn records(&self) -> &[ParameterClipRecord] {
        &self.records
    }

    pub fn clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.get(id.index())
    }

    pub fn clip_name(&self, id: ClipId) -> Option<&str> {
        self.clip(id).map(|c| c.name.as_str())
    }

    /// Distinct clips in first-seen order. Dangling ids are left out.
    pub fn available_clips(&self) -> Vec<ClipId> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.clip)
            .filter(|id| self.clip(*id).is_some() && seen.insert(*id))
            .collect()
    }

    /// Entries grouped by menu path for the dropdown. Uncategorized goes last.
    pub fn categories(&self) -> IndexMap<&str, Vec<&ClassifiedClip>> {
        let mut out: IndexMap<&str, Vec<&ClassifiedClip>> = IndexMap::new();
        for e in &self.entries {
            out.entry(e.menu_path.as_str()).or_default().push(e);
        }
        if let Some(rest) = out.shift_remove(UNCATEGORIZED_PATH) {
            out.insert(UNCATEGORIZED_PATH, rest);
        }
        out
    }

    pub fn find_by_name(&self, name: &str) -> Option<ClipId> {
        self.available_clips()
            .into_iter()
            .find(|id| self.clip_name(*id) == Some(name))
    }

    pub fn entries_for_clip(&self, id: ClipId) -> Vec<&ClassifiedClip> {
        self.entries.iter().filter(|e| e.clip == id).collect()
    }

    /// Human-readable dropdown label, e.g. `Hat/HatOn (Hat = 1)`.
    pub fn label(&self, entry: &ClassifiedClip) -> String {
        let name = self.clip_name(entry.clip).unwrap_or("<missing clip>");
        match entry.trigger_value {
            Some(v) => format!(
                "{}/{} ({} = {})",
                entry.menu_path, name, entry.parameter_name, v
            ),
            None => format!("{}/{} ({})", entry.menu_path, name, entry.parameter_name),
        }
    }
}
