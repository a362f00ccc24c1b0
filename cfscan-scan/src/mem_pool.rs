//! Batch-scoped arena for variable-length slot payloads.
//!
//! String slots do not point into the pool; they store a [`StringRef`]
//! (offset and length) that is resolved against the pool of the batch that
//! owns the tuple. Growth of the backing buffer therefore never invalidates
//! slots already written.

/// Location of a payload inside a [`MemPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRef {
    pub offset: u64,
    pub len: u32,
}

#[derive(Debug, Default)]
pub struct MemPool {
    data: Vec<u8>,
    peak: usize,
}

impl MemPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            peak: 0,
        }
    }

    /// Copy `bytes` into the pool. Callers guarantee `bytes.len()` fits `u32`.
    pub fn append(&mut self, bytes: &[u8]) -> StringRef {
        debug_assert!(bytes.len() <= u32::MAX as usize);
        let offset = self.data.len() as u64;
        self.data.extend_from_slice(bytes);
        self.peak = self.peak.max(self.data.len());
        StringRef {
            offset,
            len: bytes.len() as u32,
        }
    }

    pub fn get(&self, string_ref: StringRef) -> Option<&[u8]> {
        let start = usize::try_from(string_ref.offset).ok()?;
        let end = start.checked_add(string_ref.len as usize)?;
        self.data.get(start..end)
    }

    /// Bytes currently held by the pool.
    pub fn allocated_bytes(&self) -> usize {
        self.data.len()
    }

    /// Largest number of bytes the pool has held since creation.
    pub fn peak_allocated_bytes(&self) -> usize {
        self.peak
    }

    /// Drop every payload while keeping the backing allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_survive_growth() {
        let mut pool = MemPool::with_capacity(2);
        let first = pool.append(b"hello");
        let second = pool.append(b"");
        let third = pool.append(&[7u8; 64]);

        assert_eq!(pool.get(first), Some(&b"hello"[..]));
        assert_eq!(pool.get(second), Some(&b""[..]));
        assert_eq!(pool.get(third).map(<[u8]>::len), Some(64));
        assert_eq!(pool.allocated_bytes(), 69);
    }

    #[test]
    fn clear_keeps_peak_and_rejects_stale_refs() {
        let mut pool = MemPool::new();
        let stale = pool.append(b"abc");
        pool.clear();
        assert_eq!(pool.allocated_bytes(), 0);
        assert_eq!(pool.peak_allocated_bytes(), 3);
        assert_eq!(pool.get(stale), None);
    }
}
