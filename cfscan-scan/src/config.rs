/// Run-time configuration of a scan node (no hidden constants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanNodeConfig {
    /// Maximum rows per returned batch.
    pub batch_size: usize,
    /// Maximum bytes of tuple storage per batch, counting both the fixed-length
    /// tuple buffer and variable-length data in the batch pool.
    pub max_batch_bytes: usize,
    /// Number of detailed conversion error messages kept for the close report.
    /// The error counter itself is never capped.
    pub max_error_messages: usize,
    /// Escape byte removed from string values before they are stored.
    pub escape_char: Option<u8>,
}

pub const DEFAULT_BATCH_SIZE: usize = 1024;
pub const DEFAULT_MAX_BATCH_BYTES: usize = 8 * 1024 * 1024;
pub const DEFAULT_MAX_ERROR_MESSAGES: usize = 100;

impl Default for ScanNodeConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_batch_bytes: DEFAULT_MAX_BATCH_BYTES,
            max_error_messages: DEFAULT_MAX_ERROR_MESSAGES,
            escape_char: None,
        }
    }
}

impl ScanNodeConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_batch_bytes(mut self, max_batch_bytes: usize) -> Self {
        self.max_batch_bytes = max_batch_bytes;
        self
    }

    pub fn with_max_error_messages(mut self, max_error_messages: usize) -> Self {
        self.max_error_messages = max_error_messages;
        self
    }

    pub fn with_escape_char(mut self, escape_char: u8) -> Self {
        self.escape_char = Some(escape_char);
        self
    }

    /// Rows a batch can hold for tuples of `tuple_byte_size` bytes.
    ///
    /// Zero means not even one tuple fits in `max_batch_bytes`.
    pub fn batch_capacity(&self, tuple_byte_size: usize) -> usize {
        if tuple_byte_size == 0 {
            return self.batch_size;
        }
        self.batch_size.min(self.max_batch_bytes / tuple_byte_size)
    }
}
