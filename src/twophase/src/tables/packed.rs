/// Depths mod 3 packed two bits per entry, sixteen entries per word, entry
/// `i` in bits `2 * (i % 16)..2 * (i % 16) + 2` of word `i / 16`.
#[derive(Debug, Clone)]
pub struct PackedDepthTable(Box<[u32]>);

impl PackedDepthTable {
    #[must_use]
    pub fn new(words: Box<[u32]>) -> Self {
        Self(words)
    }

    /// The 2-bit entry at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index / 16` is past the end of the table.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        ((self.0[index / 16] >> ((index % 16) * 2)) & 3) as u8
    }

    /// Number of entries the table can address.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.0.len() * 16
    }
}
