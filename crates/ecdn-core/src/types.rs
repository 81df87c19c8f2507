use serde::{Deserialize, Serialize};

/// One entry of the `/files` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    /// Local modification time, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "uploadDate")]
    pub upload_date: String,
}
