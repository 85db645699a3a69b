// src/config.rs
//
// Configuration for the voicemail identity resolver.
//
// The marker file layout mirrors the stock deployment: the telephony stack
// drops a `vmid` file under `/dev/shm/contacts` when a voicemail identity is
// provisioned. Hosts embedding the resolver override every component of the
// path, and supply their own identity-marker GUID.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// GUID tag placed on the single voicemail contact record in the store.
/// Placeholder value; the host application supplies the real deployment GUID.
pub const DEFAULT_VOICEMAIL_CONTACT_GUID: &str = "8f4d6b0a-9c31-4f2e-b0d4-5a1c7e2f9d63";

pub const DEFAULT_MARKER_ROOT: &str = "/dev/shm";
pub const DEFAULT_MARKER_DIR_NAME: &str = "contacts";
pub const DEFAULT_MARKER_FILE_NAME: &str = "vmid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoicemailConfig {
    /// Parent of the marker directory (the marker directory is created under
    /// this root if absent).
    pub marker_root: PathBuf,
    /// Name of the watched directory under `marker_root`.
    pub marker_dir_name: String,
    /// Name of the marker file inside the marker directory.
    pub marker_file_name: String,
    /// Identity-marker GUID used to filter the contact store.
    pub identity_marker: String,
}

impl Default for VoicemailConfig {
    fn default() -> Self {
        Self {
            marker_root: PathBuf::from(DEFAULT_MARKER_ROOT),
            marker_dir_name: DEFAULT_MARKER_DIR_NAME.to_string(),
            marker_file_name: DEFAULT_MARKER_FILE_NAME.to_string(),
            identity_marker: DEFAULT_VOICEMAIL_CONTACT_GUID.to_string(),
        }
    }
}

impl VoicemailConfig {
    /// Full path of the watched directory.
    pub fn marker_dir(&self) -> PathBuf {
        self.marker_root.join(&self.marker_dir_name)
    }

    /// Full path of the marker file.
    pub fn marker_file_path(&self) -> PathBuf {
        self.marker_dir().join(&self.marker_file_name)
    }
}
