use std::path::PathBuf;

/// One included file: ownership, mode, resolved path and full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub owner_id: u32,
    pub group_id: u32,
    pub mode: u32,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl FileRecord {
    /// Raw path bytes, used as the ordering key.
    pub fn path_bytes(&self) -> &[u8] {
        self.path.as_os_str().as_encoded_bytes()
    }
}
