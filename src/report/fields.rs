//! Which columns a report includes.

use crate::table::Column;

/// Ordered column key -> included flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    fields: Vec<(String, bool)>,
}

impl FieldSelection {
    /// Every visible, non-action column, all included.
    pub fn defaults(columns: &[Column]) -> Self {
        Self {
            fields: columns
                .iter()
                .filter(|c| c.is_exportable())
                .map(|c| (c.key.clone(), true))
                .collect(),
        }
    }

    /// Build from explicit `(key, included)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Follow a change of the column set without discarding the user's toggles.
    ///
    /// Defaults replace the selection only when the exportable keys differ from the keys
    /// currently tracked. Returns `true` if the selection was replaced.
    pub fn reconcile(&mut self, columns: &[Column]) -> bool {
        let defaults = Self::defaults(columns);
        let same_keys = defaults.fields.len() == self.fields.len()
            && defaults
                .fields
                .iter()
                .zip(&self.fields)
                .all(|((a, _), (b, _))| a == b);

        if same_keys {
            false
        } else {
            *self = defaults;
            true
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, v)| k == key && *v)
    }

    pub fn set(&mut self, key: &str, included: bool) {
        if let Some((_, v)) = self.fields.iter_mut().find(|(k, _)| k == key) {
            *v = included;
        }
    }

    pub fn toggle(&mut self, key: &str) {
        if let Some((_, v)) = self.fields.iter_mut().find(|(k, _)| k == key) {
            *v = !*v;
        }
    }

    pub fn set_all(&mut self, included: bool) {
        for (_, v) in &mut self.fields {
            *v = included;
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn selected_count(&self) -> usize {
        self.fields.iter().filter(|(_, v)| *v).count()
    }

    /// Selected, exportable columns in table order.
    pub fn selected_columns<'a>(&self, columns: &'a [Column]) -> Vec<&'a Column> {
        columns
            .iter()
            .filter(|c| c.is_exportable() && self.is_selected(&c.key))
            .collect()
    }
}
