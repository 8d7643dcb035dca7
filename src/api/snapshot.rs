use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::core::{ParamIndices, ParamMap, ParameterKind};
use crate::error::{ControlsError, ControlsResult};

use super::Controls;

/// Serializable view of a registry's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlsSnapshot {
    pub backend: BackendKind,
    pub params: ParamMap,
    pub indices: ParamIndices,
    pub controls: IndexMap<String, ParameterKind>,
    /// Registered update functions per parameter.
    pub update_funcs: IndexMap<String, usize>,
    /// Registered user callbacks per parameter.
    pub user_callbacks: IndexMap<String, usize>,
}

impl ControlsSnapshot {
    pub fn to_json_pretty(&self) -> ControlsResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ControlsError::Config(format!("failed to serialize snapshot: {e}")))
    }
}

impl Controls {
    #[must_use]
    pub fn snapshot(&self) -> ControlsSnapshot {
        let state = self.inner.borrow();
        ControlsSnapshot {
            backend: state.backend.kind(),
            params: state.params.clone(),
            indices: state.indices.clone(),
            controls: state
                .controls
                .iter()
                .map(|(name, control)| (name.clone(), control.kind()))
                .collect(),
            update_funcs: state
                .update_funcs
                .iter()
                .map(|(name, registrations)| (name.clone(), registrations.len()))
                .collect(),
            user_callbacks: state
                .user_callbacks
                .iter()
                .map(|(name, registrations)| (name.clone(), registrations.len()))
                .collect(),
        }
    }
}
