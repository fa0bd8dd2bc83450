//! Registry of the latest sensor values per node

use ruuvi_epaper_types::{Metric, NodeValues};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

/// Errors from registry updates
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// The node was not registered at startup
    #[error("unknown node '{0}'")]
    UnknownNode(String),
}

struct RegistryState {
    /// Display order, fixed at construction
    order: Vec<String>,
    values: HashMap<String, NodeValues>,
}

/// Latest temperature and humidity per node
///
/// The set of nodes is fixed when the registry is created; updates only
/// overwrite values. Cloning yields another handle to the same state, so the
/// ingestion task and the render loop can each own one.
#[derive(Clone)]
pub struct SensorRegistry {
    state: Arc<RwLock<RegistryState>>,
}

impl SensorRegistry {
    /// Create a registry with every node set to the initial values
    ///
    /// Duplicate ids keep their first position.
    pub fn new<I, S>(node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut order = Vec::new();
        let mut values = HashMap::new();
        for id in node_ids {
            let id = id.into();
            if values.contains_key(&id) {
                continue;
            }
            values.insert(id.clone(), NodeValues::default());
            order.push(id);
        }

        Self {
            state: Arc::new(RwLock::new(RegistryState { order, values })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        // A panicked writer cannot leave a half-written f64 behind, so the data is still valid
        self.state.read().unwrap_or_else(|poisoned| {
            log::warn!("Sensor registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|poisoned| {
            log::warn!("Sensor registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Overwrite one metric of one node
    pub fn update(&self, node: &str, metric: Metric, value: f64) -> Result<(), RegistryError> {
        let mut state = self.write();
        let entry = state
            .values
            .get_mut(node)
            .ok_or_else(|| RegistryError::UnknownNode(node.to_string()))?;
        entry.set(metric, value);
        Ok(())
    }

    /// Copy of every node's values, in display order
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.read();
        let nodes = state
            .order
            .iter()
            .map(|id| (id.clone(), state.values.get(id).copied().unwrap_or_default()))
            .collect();
        RegistrySnapshot { nodes }
    }

    /// Values of a single node
    pub fn get(&self, node: &str) -> Option<NodeValues> {
        self.read().values.get(node).copied()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.read().values.contains_key(node)
    }

    /// Registered node ids in display order
    pub fn node_ids(&self) -> Vec<String> {
        self.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable copy of the registry taken at one point in time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrySnapshot {
    nodes: Vec<(String, NodeValues)>,
}

impl RegistrySnapshot {
    /// Build a snapshot directly from ordered values
    pub fn from_nodes(nodes: Vec<(String, NodeValues)>) -> Self {
        Self { nodes }
    }

    /// Nodes in display order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeValues)> {
        self.nodes.iter().map(|(id, values)| (id.as_str(), values))
    }

    pub fn get(&self, node: &str) -> Option<&NodeValues> {
        self.nodes
            .iter()
            .find(|(id, _)| id == node)
            .map(|(_, values)| values)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
