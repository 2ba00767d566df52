//! Layout utilities.

/// Row alignment applied by allocators that do not report their own, in pixels.
pub const DEFAULT_ROW_ALIGN: u32 = 16;

/// Align a size up to the given power-of-two alignment.
#[inline]
pub const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

/// Row stride in pixels for a row of `width` pixels.
#[inline]
pub const fn row_stride(width: u32, align: u32) -> u32 {
    align_up(width as usize, align as usize) as u32
}

/// Bytes needed for `height` rows of `stride` pixels.
#[inline]
pub const fn buffer_len(stride: u32, height: u32, bytes_per_pixel: usize) -> usize {
    stride as usize * height as usize * bytes_per_pixel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 8), 16);
    }

    #[test]
    fn test_row_stride() {
        assert_eq!(row_stride(8, DEFAULT_ROW_ALIGN), 16);
        assert_eq!(row_stride(256, DEFAULT_ROW_ALIGN), 256);
        assert_eq!(row_stride(257, DEFAULT_ROW_ALIGN), 272);
        assert_eq!(buffer_len(16, 8, 4), 512);
    }
}
