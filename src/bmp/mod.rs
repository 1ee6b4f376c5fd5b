//! The BMP assembler (Component B) and the shared byte-layout constants
//! both the assembler and the decoder agree on.
//!
//! `BmpStructure` is pure buffer arithmetic — no Win32 calls — so it
//! compiles and is unit-tested on every platform. The Windows-only
//! capture engine (`crate::capture`) is the only caller that casts its
//! exposed regions into native pointers.

pub mod decode;

use serde::{Deserialize, Serialize};

use crate::errors::{CaptureError, Result};
use crate::palette;

/// File header size in bytes (`BITMAPFILEHEADER`).
pub const FILE_HEADER_SIZE: usize = 14;
/// Info header size in bytes (`BITMAPINFOHEADER`, BMP v3).
pub const INFO_HEADER_SIZE: usize = 40;
/// Bytes per palette entry (BGRA, reserved byte fixed at 0).
pub const PALETTE_ENTRY_SIZE: usize = 4;

/// Which 8-bit palette to emit. Ignored for every bit depth except 8;
/// the 8-bit branch always emits a full 256-entry palette regardless of
/// which variant is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteType {
    Grayscale,
    Halftone,
}

impl Default for PaletteType {
    fn default() -> Self {
        PaletteType::Halftone
    }
}

/// `floor((bit_depth * width + 31) / 32) * 4` — bytes per row including
/// padding to a 4-byte boundary.
pub fn stride_for(bit_depth: u16, width: u32) -> usize {
    let bits = bit_depth as u64 * width as u64;
    (((bits + 31) / 32) * 4) as usize
}

/// Number of palette entries a given bit depth emits: 2/16/256 for
/// 1/4/8-bit, 0 for 16/24/32-bit (no palette).
pub fn num_colors_for(bit_depth: u16) -> u32 {
    match bit_depth {
        1 => 2,
        4 => 16,
        8 => 256,
        _ => 0,
    }
}

fn palette_table(bit_depth: u16, palette_type: PaletteType) -> &'static [[u8; 4]] {
    match bit_depth {
        1 => palette::monochrome(),
        4 => palette::vga16(),
        8 => match palette_type {
            PaletteType::Grayscale => palette::grayscale8(),
            PaletteType::Halftone => palette::halftone8(),
        },
        _ => &[],
    }
}

/// An owned, self-contained BMP byte buffer: file header + info header +
/// optional palette + zero-filled pixel region, ready for a native
/// filler (or a test) to write pixels into.
#[derive(Debug, Clone)]
pub struct BmpStructure {
    buffer: Vec<u8>,
    pixel_offset: usize,
    stride: usize,
    width: u32,
    height: u32,
    bit_depth: u16,
}

impl BmpStructure {
    /// Build a complete BMP buffer for `width x height` at `bit_depth`,
    /// with `palette_type` observed only when `bit_depth == 8`.
    ///
    /// Invariants enforced: `pixel_offset == 14 + 40 + num_colors * 4`;
    /// `file_size == pixel_offset + stride * height`; for 16/24/32-bit,
    /// the palette region is absent (zero bytes), not just zero-valued.
    pub fn build(width: u32, height: u32, bit_depth: u16, palette_type: PaletteType) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidRegion(format!(
                "zero-size bitmap requested: {width}x{height}"
            )));
        }

        let num_colors = num_colors_for(bit_depth);
        let stride = stride_for(bit_depth, width);
        let palette_bytes = num_colors as usize * PALETTE_ENTRY_SIZE;
        let pixel_offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE + palette_bytes;
        let pixel_size = stride * height as usize;
        let file_size = pixel_offset + pixel_size;

        let mut buffer = vec![0u8; file_size];

        // --- File header (14 bytes) ---
        buffer[0] = b'B';
        buffer[1] = b'M';
        buffer[2..6].copy_from_slice(&(file_size as u32).to_le_bytes());
        // bytes [6..10] reserved, already zero.
        buffer[10..14].copy_from_slice(&(pixel_offset as u32).to_le_bytes());

        // --- Info header (40 bytes), BITMAPINFOHEADER layout ---
        let ih = FILE_HEADER_SIZE;
        buffer[ih..ih + 4].copy_from_slice(&(INFO_HEADER_SIZE as u32).to_le_bytes());
        buffer[ih + 4..ih + 8].copy_from_slice(&(width as i32).to_le_bytes());
        buffer[ih + 8..ih + 12].copy_from_slice(&(height as i32).to_le_bytes()); // positive: bottom-up
        buffer[ih + 12..ih + 14].copy_from_slice(&1u16.to_le_bytes()); // planes
        buffer[ih + 14..ih + 16].copy_from_slice(&bit_depth.to_le_bytes());
        buffer[ih + 16..ih + 20].copy_from_slice(&0u32.to_le_bytes()); // BI_RGB
        buffer[ih + 20..ih + 24].copy_from_slice(&(pixel_size as u32).to_le_bytes());
        // X/Y pels per meter: 0,0 (bytes [24..32] already zero)
        buffer[ih + 32..ih + 36].copy_from_slice(&num_colors.to_le_bytes());
        buffer[ih + 36..ih + 40].copy_from_slice(&num_colors.to_le_bytes());

        // --- Palette ---
        if num_colors > 0 {
            let table = palette_table(bit_depth, palette_type);
            debug_assert_eq!(table.len(), num_colors as usize);
            let palette_start = ih + INFO_HEADER_SIZE;
            for (i, entry) in table.iter().enumerate() {
                let at = palette_start + i * PALETTE_ENTRY_SIZE;
                buffer[at..at + 4].copy_from_slice(entry);
            }
        }

        Ok(BmpStructure {
            buffer,
            pixel_offset,
            stride,
            width,
            height,
            bit_depth,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> u16 {
        self.bit_depth
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn pixel_offset(&self) -> usize {
        self.pixel_offset
    }

    /// The complete BMP byte stream, ready to hand to a caller.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The `BITMAPINFOHEADER` + color table region, contiguous from
    /// offset 14, bit-compatible with a Win32 `BITMAPINFO*` when the
    /// palette is sized to match `biClrUsed` (which it always is here).
    /// This is what `GetDIBits`/`CreateDIBSection` are given as the
    /// format descriptor.
    pub fn info_header_and_palette(&self) -> &[u8] {
        &self.buffer[FILE_HEADER_SIZE..self.pixel_offset]
    }

    pub fn info_header_and_palette_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[FILE_HEADER_SIZE..self.pixel_offset]
    }

    /// The zero-filled pixel region a native filler (or a test) writes
    /// `stride * height` bytes into.
    pub fn pixel_region(&self) -> &[u8] {
        &self.buffer[self.pixel_offset..]
    }

    pub fn pixel_region_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[self.pixel_offset..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_pixel_consistency_24bit() {
        let bmp = BmpStructure::build(3, 2, 24, PaletteType::Halftone).unwrap();
        assert_eq!(bmp.pixel_offset(), 14 + 40); // no palette
        assert_eq!(bmp.stride(), stride_for(24, 3));
        assert_eq!(bmp.as_bytes().len(), bmp.pixel_offset() + bmp.stride() * 2);
        assert_eq!(&bmp.as_bytes()[0..2], b"BM");
    }

    #[test]
    fn header_pixel_consistency_8bit_has_256_entry_palette() {
        let bmp = BmpStructure::build(10, 10, 8, PaletteType::Grayscale).unwrap();
        assert_eq!(bmp.pixel_offset(), 14 + 40 + 256 * 4);
        assert_eq!(bmp.info_header_and_palette().len(), 40 + 256 * 4);
    }

    #[test]
    fn stride_rounds_up_to_4_byte_boundary() {
        // 1-bit, width 1 -> 1 bit of data, padded to 4 bytes.
        assert_eq!(stride_for(1, 1), 4);
        // 24-bit, width 2 -> 6 bytes of data, padded to 8.
        assert_eq!(stride_for(24, 2), 8);
        // 32-bit is always a multiple of 4 already.
        assert_eq!(stride_for(32, 5), 20);
    }

    #[test]
    fn zero_size_is_invalid_region() {
        let err = BmpStructure::build(0, 10, 24, PaletteType::Halftone).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidRegion(_)));
    }

    #[test]
    fn high_color_depths_emit_no_palette_bytes() {
        for depth in [16u16, 24, 32] {
            let bmp = BmpStructure::build(4, 4, depth, PaletteType::Halftone).unwrap();
            assert_eq!(bmp.pixel_offset(), 14 + 40);
            assert_eq!(bmp.info_header_and_palette().len(), 40);
        }
    }
}
