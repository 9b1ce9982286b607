use serde::{Deserialize, Serialize};

use crate::{
    domain::{FramePosition, ViewSize},
    error::ProtocolError,
};

/// Wire envelope exchanged between rendering contexts.
///
/// Serialized as JSON text; the `type` tag selects the payload shape.
/// Decoded exactly once, at the transport boundary, before anything
/// reaches the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Envelope {
    /// Ask the controller to enter hint-selection mode.
    Start { new_tab: bool },
    /// Sent to self plus each direct child at Counting-entry. Geometry is
    /// the addressed frame's own bounding offset plus the overall viewport.
    RequestCountTargets {
        view_size: ViewSize,
        frame_position: FramePosition,
    },
    /// A frame reporting how many selectable targets it contains.
    ResponseCountTargets { count: usize },
    /// Unicast back to one replying frame: its disjoint slice of labels.
    CreateHints {
        keys_array: Vec<String>,
        new_tab: bool,
    },
    /// Broadcast of the typed prefix so every frame can re-filter.
    ShowHints { keys: String },
    /// Commit: frames activate the target whose label matches `keys`.
    Activate { keys: String },
    /// Tear down all hint UI.
    RemoveHints,
    /// A captured key forwarded to the controller.
    KeyPress { key: String },
}

impl Envelope {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
