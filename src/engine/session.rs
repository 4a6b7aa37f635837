//! Session persistence — YAML round-trip of everything the text cannot hold.
//!
//! Layout positions and bypass/solo flags live outside the document; this
//! snapshot keeps them across restarts. Entries are positional, matching the
//! engine's block-identity rule.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::{Block, NodeLayout};

/// Default path for the session snapshot.
pub fn default_session_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".noderack");
    path.push("session.yaml");
    path
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockState {
    pub layout: NodeLayout,
    pub bypassed: bool,
    pub solo: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub blocks: Vec<BlockState>,
}

impl Session {
    pub fn capture(blocks: &[Block]) -> Self {
        Session {
            blocks: blocks
                .iter()
                .map(|b| BlockState {
                    layout: b.layout,
                    bypassed: b.bypassed,
                    solo: b.solo,
                })
                .collect(),
        }
    }

    /// Apply saved state positionally; blocks beyond the snapshot keep their
    /// defaults.
    pub fn apply(&self, blocks: &mut [Block]) {
        for (block, state) in blocks.iter_mut().zip(&self.blocks) {
            block.layout = state.layout;
            block.bypassed = state.bypassed;
            block.solo = state.solo;
        }
    }
}

/// Load a session from a YAML file. Returns an empty session if the file
/// doesn't exist.
pub fn load_session(path: &Path) -> Result<Session, io::Error> {
    if !path.exists() {
        return Ok(Session::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a session to a YAML file, creating parent directories as needed.
pub fn save_session(path: &Path, session: &Session) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(session).map_err(io::Error::other)?;
    std::fs::write(path, yaml)
}
