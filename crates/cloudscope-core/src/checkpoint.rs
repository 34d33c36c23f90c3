//! Named camera checkpoints, kept per dataset.

use std::collections::{BTreeMap, HashMap};

use crate::camera_path::CameraPose;

/// Stores camera checkpoints for every dataset that was loaded in this session.
///
/// Checkpoints are keyed by the dataset descriptor name; loading a dataset
/// switches the active set.
#[derive(Debug, Clone, Default)]
pub struct CheckpointRegistry {
    active_dataset: Option<String>,
    checkpoints: HashMap<String, BTreeMap<String, CameraPose>>,
}

impl CheckpointRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to the checkpoints of the dataset named `descriptor_name`.
    pub fn on_load_dataset(&mut self, descriptor_name: &str) {
        self.active_dataset = Some(descriptor_name.to_string());
        self.checkpoints
            .entry(descriptor_name.to_string())
            .or_default();
    }

    /// Returns the descriptor name of the active dataset.
    #[must_use]
    pub fn active_dataset(&self) -> Option<&str> {
        self.active_dataset.as_deref()
    }

    fn active(&self) -> Option<&BTreeMap<String, CameraPose>> {
        self.checkpoints.get(self.active_dataset.as_deref()?)
    }

    /// Adds or replaces a checkpoint for the active dataset.
    ///
    /// Returns false if no dataset is active.
    pub fn insert(&mut self, name: impl Into<String>, pose: CameraPose) -> bool {
        let Some(dataset) = self.active_dataset.as_deref() else {
            return false;
        };
        self.checkpoints
            .entry(dataset.to_string())
            .or_default()
            .insert(name.into(), pose);
        true
    }

    /// Removes a checkpoint of the active dataset.
    pub fn remove(&mut self, name: &str) -> Option<CameraPose> {
        let dataset = self.active_dataset.as_deref()?;
        self.checkpoints.get_mut(dataset)?.remove(name)
    }

    /// Returns a checkpoint of the active dataset.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CameraPose> {
        self.active()?.get(name).copied()
    }

    /// Returns the checkpoint names of the active dataset in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.active()
            .into_iter()
            .flat_map(|m| m.keys())
            .map(String::as_str)
    }
}
