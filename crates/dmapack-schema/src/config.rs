/// Controls how layout documents are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Maximum bytes read from a layout file.
    pub max_layout_file_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            max_layout_file_size: 1024 * 1024,
        }
    }
}
