//! Binary buffer writer with auto-growing capacity.

/// A binary buffer writer that grows automatically as needed.
///
/// The backing buffer and cursor are public so that callers can patch bytes
/// that were already written: the sereal encoder retrofits the track flag
/// onto a previously emitted tag byte when it discovers a back-reference.
///
/// # Example
///
/// ```
/// use sereal_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x2b);
/// writer.buf(&[0x01, 0x02]);
/// assert_eq!(writer.flush(), [0x2b, 0x01, 0x02]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Current cursor position. Everything below it is written output.
    pub x: usize,
    /// Allocation size when the buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with the default allocation size (16KB).
    pub fn new() -> Self {
        Self::with_alloc_size(16 * 1024)
    }

    /// Creates a new writer with a custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0u8; alloc_size],
            x: 0,
            alloc_size,
        }
    }

    /// Ensures at least `capacity` bytes are available past the cursor.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let required = self.x + capacity;
            let new_size = if required <= self.alloc_size {
                self.alloc_size
            } else {
                required * 2
            };
            self.uint8.resize(new_size, 0);
        }
    }

    /// Discards all written output and rewinds the cursor to zero.
    pub fn clear(&mut self) {
        self.x = 0;
    }

    /// Returns a copy of the written output and rewinds the cursor.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[..self.x].to_vec();
        self.x = 0;
        result
    }

    /// Returns a view of the written output without consuming it.
    pub fn written(&self) -> &[u8] {
        &self.uint8[..self.x]
    }

    /// Writes a single byte.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes a 32-bit float, little-endian.
    #[inline]
    pub fn f32(&mut self, val: f32) {
        self.ensure_capacity(4);
        self.uint8[self.x..self.x + 4].copy_from_slice(&val.to_le_bytes());
        self.x += 4;
    }

    /// Writes a 64-bit float, little-endian.
    #[inline]
    pub fn f64(&mut self, val: f64) {
        self.ensure_capacity(8);
        self.uint8[self.x..self.x + 8].copy_from_slice(&val.to_le_bytes());
        self.x += 8;
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        let bytes = s.as_bytes();
        self.buf(bytes);
        bytes.len()
    }

    /// Truncates the written output to `len` bytes.
    ///
    /// Used by the encoder to replace an uncompressed body with its
    /// compressed framing.
    pub fn truncate(&mut self, len: usize) {
        if len < self.x {
            self.x = len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let mut writer = Writer::new();
        writer.u8(0x01);
        writer.u8(0x02);
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_f32_little_endian() {
        let mut writer = Writer::new();
        writer.f32(2.2);
        assert_eq!(writer.flush(), 2.2f32.to_le_bytes());
    }

    #[test]
    fn test_f64_little_endian() {
        let mut writer = Writer::new();
        writer.f64(-0.5);
        assert_eq!(writer.flush(), (-0.5f64).to_le_bytes());
    }

    #[test]
    fn test_utf8() {
        let mut writer = Writer::new();
        writer.utf8("hello");
        assert_eq!(writer.flush(), b"hello");
    }

    #[test]
    fn test_grow_past_alloc_size() {
        let mut writer = Writer::with_alloc_size(4);
        writer.buf(&[0xab; 64]);
        let data = writer.flush();
        assert_eq!(data.len(), 64);
        assert!(data.iter().all(|&b| b == 0xab));
    }

    #[test]
    fn test_patch_written_byte() {
        let mut writer = Writer::new();
        writer.u8(0x28);
        writer.u8(0x2b);
        writer.uint8[0] |= 0x80;
        assert_eq!(writer.flush(), [0xa8, 0x2b]);
    }

    #[test]
    fn test_clear_rewinds() {
        let mut writer = Writer::new();
        writer.buf(b"abc");
        writer.clear();
        writer.u8(0x01);
        assert_eq!(writer.flush(), [0x01]);
    }

    #[test]
    fn test_truncate() {
        let mut writer = Writer::new();
        writer.buf(b"abcdef");
        writer.truncate(3);
        writer.u8(b'!');
        assert_eq!(writer.flush(), b"abc!");
    }
}
