use crate::elements::LeafRef;

/// Final accumulated outcomes of one request.
///
/// Entries are in delivery order: list order for sequential trees, completion order for
/// parallel ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Leaves that reported success.
    pub loaded: Vec<LeafRef>,
    /// Leaves that reported failure (including deadline expiry).
    pub failed: Vec<LeafRef>,
}

impl LoadReport {
    /// Identifiers of loaded leaves, in delivery order.
    pub fn loaded_ids(&self) -> Vec<&str> {
        self.loaded.iter().map(|l| l.id()).collect()
    }

    /// Identifiers of failed leaves, in delivery order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|l| l.id()).collect()
    }

    /// Returns `true` if no leaf emitted an outcome.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, leaf: LeafRef, succeeded: bool) {
        if succeeded {
            self.loaded.push(leaf);
        } else {
            self.failed.push(leaf);
        }
    }
}
