use std::fmt;

/// Declared type of a tuple slot.
///
/// The tag decides both the textual grammar a raw cell value is parsed with and
/// the fixed number of bytes the slot occupies inside a tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Float,
    Double,
    /// Variable-length payload. The slot stores an `(offset, len)` reference
    /// into the batch memory pool.
    String,
    /// Nanoseconds since the Unix epoch.
    Timestamp,
}

/// Bytes occupied by a string slot: `u64` pool offset, `u32` length, padding.
pub const STRING_SLOT_SIZE: usize = 16;

impl SlotType {
    /// Fixed number of bytes the slot occupies inside a tuple.
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            SlotType::Boolean | SlotType::TinyInt => 1,
            SlotType::SmallInt => 2,
            SlotType::Int | SlotType::Float => 4,
            SlotType::BigInt | SlotType::Double | SlotType::Timestamp => 8,
            SlotType::String => STRING_SLOT_SIZE,
        }
    }

    /// Natural alignment of the slot within a tuple.
    #[inline]
    pub const fn alignment(self) -> usize {
        let size = self.byte_size();
        if size > 8 { 8 } else { size }
    }

    /// Whether the slot references memory owned by the batch pool.
    #[inline]
    pub const fn is_var_len(self) -> bool {
        matches!(self, SlotType::String)
    }

    pub const fn name(self) -> &'static str {
        match self {
            SlotType::Boolean => "BOOLEAN",
            SlotType::TinyInt => "TINYINT",
            SlotType::SmallInt => "SMALLINT",
            SlotType::Int => "INT",
            SlotType::BigInt => "BIGINT",
            SlotType::Float => "FLOAT",
            SlotType::Double => "DOUBLE",
            SlotType::String => "STRING",
            SlotType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for SlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
