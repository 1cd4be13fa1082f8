//! Row selection of the admin user table.

use std::collections::BTreeSet;

use crate::domain::types::UserId;

/// Selected row ids, kept independently of the rows currently loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<UserId>,
}

impl Selection {
    pub fn from_ids(ids: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn toggle(&mut self, id: UserId) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    /// Selects exactly the rows of the current page, dropping anything else.
    pub fn select_all(&mut self, page_ids: impl IntoIterator<Item = UserId>) {
        self.ids = page_ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> Vec<UserId> {
        self.ids.iter().cloned().collect()
    }
}
