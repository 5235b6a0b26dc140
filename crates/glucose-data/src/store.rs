//! Append-only in-memory collection of classified observations.

use glucose_core::models::Observation;

/// Ordered observation collection, bulk-loaded once and read-only afterwards.
///
/// There is no removal or reordering; `query` always yields matches in
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observations` after the existing ones.
    pub fn append(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.observations.extend(observations);
    }

    /// Lazily yield every observation matching `predicate`, in insertion order.
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Observation> + 'a
    where
        P: Fn(&Observation) -> bool + 'a,
    {
        self.observations.iter().filter(move |o| predicate(o))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl FromIterator<Observation> for ObservationStore {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ObservationStore {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
