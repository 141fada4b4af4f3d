//! Splitting a byte stream into per-frame chunks.

/// Iterator over `(chunk, bit_length)` pairs of at most `payload_size` bytes.
///
/// Every chunk but the last is full; the last carries `8 * remaining` bits.
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    data: &'a [u8],
    payload_size: usize,
}

/// Split `data` into chunks sized for frames of `payload_size` bytes.
///
/// # Panics
///
/// Panics if `payload_size` is zero.
pub fn chunks(data: &[u8], payload_size: usize) -> Chunks<'_> {
    assert!(payload_size > 0, "payload size must be non-zero");
    Chunks { data, payload_size }
}

/// Number of frames needed to carry `len` bytes.
pub fn frame_count(len: usize, payload_size: usize) -> usize {
    len.div_ceil(payload_size)
}

impl<'a> Iterator for Chunks<'a> {
    type Item = (&'a [u8], usize);

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }
        let take = self.payload_size.min(self.data.len());
        let (chunk, rest) = self.data.split_at(take);
        self.data = rest;
        Some((chunk, chunk.len() * 8))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = frame_count(self.data.len(), self.payload_size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks<'_> {}
