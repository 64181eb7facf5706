use serde::{Deserialize, Serialize};

/// Agents picked for side-by-side comparison, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct SelectionSet {
    ids: Vec<u32>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deselect `id` if present, otherwise append it. Returns whether the id
    /// is selected afterwards.
    pub fn toggle(&mut self, id: u32) -> bool {
        if let Some(pos) = self.ids.iter().position(|&x| x == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Comparison needs at least two agents.
    pub fn can_compare(&self) -> bool {
        self.ids.len() >= 2
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<u32> for SelectionSet {
    /// Builds by toggling, so a repeated id cancels itself out.
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut set = SelectionSet::new();
        for id in iter {
            set.toggle(id);
        }
        set
    }
}

impl From<Vec<u32>> for SelectionSet {
    /// Keeps the first occurrence of each id, so a list coming from outside
    /// can't smuggle in duplicates.
    fn from(raw: Vec<u32>) -> Self {
        let mut ids = Vec::with_capacity(raw.len());
        for id in raw {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        SelectionSet { ids }
    }
}

impl From<SelectionSet> for Vec<u32> {
    fn from(set: SelectionSet) -> Self {
        set.ids
    }
}
