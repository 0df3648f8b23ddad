//! Versioned binary snapshots of the registry state.

use serde::{Deserialize, Serialize};

use crate::state::RegistryState;
use crate::NodeError;

/// Bumped whenever [`RegistryState`] changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    state: RegistryState,
}

pub fn encode(state: &RegistryState) -> Result<Vec<u8>, NodeError> {
    bincode::serialize(&Snapshot {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    })
    .map_err(|e| NodeError::Snapshot(e.to_string()))
}

/// Decode a snapshot, rejecting other versions.
///
/// In-flight consensus events are not part of a snapshot.
pub fn decode(bytes: &[u8]) -> Result<RegistryState, NodeError> {
    let snapshot: Snapshot =
        bincode::deserialize(bytes).map_err(|e| NodeError::Snapshot(e.to_string()))?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(NodeError::Snapshot(format!(
            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
            snapshot.version
        )));
    }
    Ok(snapshot.state)
}
