//! The BMP decoder (Component G): a pure function from BMP bytes to a
//! packed RGB/RGBA buffer.
//!
//! Supports uncompressed (BI_RGB), RLE4, RLE8, and BITFIELDS streams at
//! bit depths 1/4/8/16/24/32, top-down and bottom-up orientation. No
//! Win32 calls — this module is platform-agnostic, matching the system
//! overview's split between the Windows-only capture engine and the
//! portable decoder.

use serde::Serialize;

use crate::errors::{CaptureError, Result};

/// Decoded image: top-down, packed RGB or RGBA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RGBImage {
    pub width: u32,
    pub height: u32,
    /// 3 (RGB) or 4 (RGBA) — 4 only when the source bit depth was 32.
    pub channels: u8,
    pub data: Vec<u8>,
}

const FILE_HEADER_SIZE: usize = 14;

// ---------------------------------------------------------------------------
// Bounds-checked little-endian readers
// ---------------------------------------------------------------------------

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    bytes
        .get(at..at + 2)
        .map(|s| u16::from_le_bytes([s[0], s[1]]))
        .ok_or_else(|| CaptureError::InvalidBmp(format!("truncated header at offset {at}")))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .map(|s| u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| CaptureError::InvalidBmp(format!("truncated header at offset {at}")))
}

fn read_i32(bytes: &[u8], at: usize) -> Result<i32> {
    bytes
        .get(at..at + 4)
        .map(|s| i32::from_le_bytes([s[0], s[1], s[2], s[3]]))
        .ok_or_else(|| CaptureError::InvalidBmp(format!("truncated header at offset {at}")))
}

/// Row in storage order (0 = first stored scanline) that maps to output
/// row `y` (0 = visual top), given orientation.
fn src_row(y: usize, height: usize, is_top_down: bool) -> usize {
    if is_top_down {
        y
    } else {
        height - 1 - y
    }
}

// ---------------------------------------------------------------------------
// Parsed header
// ---------------------------------------------------------------------------

struct Header {
    pixel_offset: usize,
    info_header_size: usize,
    width: u32,
    height: u32,
    is_top_down: bool,
    bit_depth: u16,
    compression: u32,
    colors_used: u32,
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < FILE_HEADER_SIZE + 4 || &bytes[0..2] != b"BM" {
        return Err(CaptureError::InvalidBmp("missing 'BM' signature".into()));
    }

    let pixel_offset = read_u32(bytes, 10)? as usize;
    let info_header_size = read_u32(bytes, 14)? as usize;
    let width_raw = read_i32(bytes, 18)?;
    let signed_height = read_i32(bytes, 22)?;
    let bit_depth = read_u16(bytes, 28)?;
    let compression = read_u32(bytes, 30)?;
    let mut colors_used = read_u32(bytes, 46)?;

    if width_raw <= 0 {
        return Err(CaptureError::InvalidBmp(format!("non-positive width {width_raw}")));
    }
    let width = width_raw as u32;

    let is_top_down = signed_height < 0;
    let height = signed_height.unsigned_abs();
    if height == 0 {
        return Err(CaptureError::InvalidBmp("zero height".into()));
    }

    if colors_used == 0 && bit_depth <= 8 {
        colors_used = 1u32 << bit_depth;
    }

    Ok(Header {
        pixel_offset,
        info_header_size,
        width,
        height,
        is_top_down,
        bit_depth,
        compression,
        colors_used,
    })
}

/// Read the BGRA palette starting at `14 + 40`, `colors_used` entries,
/// returned as `(r, g, b)` tuples.
fn read_palette(bytes: &[u8], colors_used: u32) -> Result<Vec<(u8, u8, u8)>> {
    let base = FILE_HEADER_SIZE + 40;
    let mut out = Vec::with_capacity(colors_used as usize);
    for i in 0..colors_used as usize {
        let at = base + i * 4;
        let entry = bytes.get(at..at + 4).ok_or_else(|| {
            CaptureError::InvalidBmp(format!("palette entry {i} out of bounds"))
        })?;
        // BGRA -> (R, G, B)
        out.push((entry[2], entry[1], entry[0]));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Decode a BMP byte stream into a packed top-down RGB/RGBA image.
pub fn bmp_to_rgb(bytes: &[u8]) -> Result<RGBImage> {
    let header = parse_header(bytes)?;
    log::debug!(
        "decoding {}x{} bmp, {}bpp, compression={}, top_down={}",
        header.width,
        header.height,
        header.bit_depth,
        header.compression,
        header.is_top_down
    );
    let channels: u8 = if header.bit_depth == 32 { 4 } else { 3 };
    let mut data = vec![0u8; header.width as usize * header.height as usize * channels as usize];

    match header.compression {
        0 => decode_bi_rgb(bytes, &header, channels, &mut data)?,
        1 => decode_rle8(bytes, &header, &mut data)?,
        2 => decode_rle4(bytes, &header, &mut data)?,
        3 => decode_bitfields(bytes, &header, channels, &mut data)?,
        other => {
            return Err(CaptureError::UnsupportedCompression(format!(
                "compression type {other}"
            )))
        }
    }

    Ok(RGBImage {
        width: header.width,
        height: header.height,
        channels,
        data,
    })
}

/// Look up `idx` in an indexed-color palette, falling back to black for
/// an out-of-range index. `colorsUsed` may be smaller than `2^bitDepth`
/// (a common real-world optimization), so a structurally valid pixel
/// byte can still reference a slot the palette doesn't have; that's
/// malformed pixel data, not a reason to panic.
fn palette_lookup(palette: Option<&Vec<(u8, u8, u8)>>, idx: usize) -> (u8, u8, u8) {
    palette.and_then(|p| p.get(idx)).copied().unwrap_or((0, 0, 0))
}

fn put_pixel(data: &mut [u8], width: usize, channels: usize, x: usize, y: usize, rgb: (u8, u8, u8), a: Option<u8>) {
    let at = (y * width + x) * channels;
    data[at] = rgb.0;
    data[at + 1] = rgb.1;
    data[at + 2] = rgb.2;
    if channels == 4 {
        data[at + 3] = a.unwrap_or(255);
    }
}

// ---------------------------------------------------------------------------
// BI_RGB (uncompressed)
// ---------------------------------------------------------------------------

fn decode_bi_rgb(bytes: &[u8], h: &Header, channels: u8, out: &mut [u8]) -> Result<()> {
    let width = h.width as usize;
    let height = h.height as usize;
    let stride = crate::bmp::stride_for(h.bit_depth, h.width);
    let palette = if h.bit_depth <= 8 {
        Some(read_palette(bytes, h.colors_used)?)
    } else {
        None
    };

    for y in 0..height {
        let src_y = src_row(y, height, h.is_top_down);
        let row_start = h.pixel_offset + src_y * stride;
        let row = bytes.get(row_start..row_start + stride).ok_or_else(|| {
            CaptureError::InvalidBmp(format!("pixel row {src_y} out of bounds"))
        })?;

        for x in 0..width {
            let (rgb, a) = match h.bit_depth {
                1 => {
                    let byte = row[x / 8];
                    let idx = ((byte >> (7 - (x % 8))) & 1) as usize;
                    (palette_lookup(palette.as_ref(), idx), None)
                }
                4 => {
                    let byte = row[x / 2];
                    let nibble = ((byte >> (4 * (1 - (x % 2)))) & 0xF) as usize;
                    (palette_lookup(palette.as_ref(), nibble), None)
                }
                8 => {
                    let idx = row[x] as usize;
                    (palette_lookup(palette.as_ref(), idx), None)
                }
                16 => {
                    let p = u16::from_le_bytes([row[x * 2], row[x * 2 + 1]]);
                    let r = (((p >> 10) & 0x1F) as u32 * 255 / 31) as u8;
                    let g = (((p >> 5) & 0x1F) as u32 * 255 / 31) as u8;
                    let b = ((p & 0x1F) as u32 * 255 / 31) as u8;
                    ((r, g, b), None)
                }
                24 => {
                    let at = x * 3;
                    ((row[at + 2], row[at + 1], row[at]), None)
                }
                32 => {
                    let at = x * 4;
                    ((row[at + 2], row[at + 1], row[at]), Some(row[at + 3]))
                }
                other => {
                    return Err(CaptureError::UnsupportedCompression(format!(
                        "unsupported bit depth {other} for BI_RGB"
                    )))
                }
            };
            put_pixel(out, width, channels as usize, x, y, rgb, a);
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// RLE8 / RLE4
// ---------------------------------------------------------------------------

/// Decode an 8-bit RLE stream into a storage-order (row 0 = first stored
/// scanline) index buffer, one byte per pixel.
fn decode_rle8_indices(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut indices = vec![0u8; width * height];
    let (mut x, mut y) = (0usize, 0usize);
    let mut pos = 0usize;

    while pos < data.len() {
        let count = *data.get(pos).ok_or_else(eof)?;
        let value = *data.get(pos + 1).ok_or_else(eof)?;
        pos += 2;

        if count > 0 {
            for _ in 0..count {
                if y < height && x < width {
                    indices[y * width + x] = value;
                }
                x += 1;
            }
            continue;
        }

        match value {
            0 => {
                y += 1;
                x = 0;
            }
            1 => break,
            2 => {
                let dx = *data.get(pos).ok_or_else(eof)? as usize;
                let dy = *data.get(pos + 1).ok_or_else(eof)? as usize;
                pos += 2;
                x += dx;
                y += dy;
            }
            n if n >= 3 => {
                let n = n as usize;
                let run = data.get(pos..pos + n).ok_or_else(eof)?;
                for (i, &v) in run.iter().enumerate() {
                    if y < height && x + i < width {
                        indices[y * width + x + i] = v;
                    }
                }
                x += n;
                pos += n;
                if n % 2 == 1 {
                    pos += 1; // pad to 16-bit boundary
                }
            }
            _ => unreachable!(),
        }
    }

    Ok(indices)
}

/// Decode a 4-bit RLE stream into a storage-order index buffer, one byte
/// per pixel holding a 0..16 nibble value.
fn decode_rle4_indices(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let mut indices = vec![0u8; width * height];
    let (mut x, mut y) = (0usize, 0usize);
    let mut pos = 0usize;

    while pos < data.len() {
        let count = *data.get(pos).ok_or_else(eof)?;
        let value = *data.get(pos + 1).ok_or_else(eof)?;
        pos += 2;

        if count > 0 {
            let hi = (value >> 4) & 0xF;
            let lo = value & 0xF;
            for j in 0..count as usize {
                let v = if j % 2 == 0 { hi } else { lo };
                if y < height && x < width {
                    indices[y * width + x] = v;
                }
                x += 1;
            }
            continue;
        }

        match value {
            0 => {
                y += 1;
                x = 0;
            }
            1 => break,
            2 => {
                let dx = *data.get(pos).ok_or_else(eof)? as usize;
                let dy = *data.get(pos + 1).ok_or_else(eof)? as usize;
                pos += 2;
                x += dx;
                y += dy;
            }
            n if n >= 3 => {
                let n = n as usize;
                let nbytes = (n + 1) / 2;
                let run = data.get(pos..pos + nbytes).ok_or_else(eof)?;
                for k in 0..n {
                    let byte = run[k / 2];
                    let v = if k % 2 == 0 { (byte >> 4) & 0xF } else { byte & 0xF };
                    if y < height && x < width {
                        indices[y * width + x] = v;
                    }
                    x += 1;
                }
                pos += nbytes;
                if nbytes % 2 == 1 {
                    pos += 1;
                }
            }
            _ => unreachable!(),
        }
    }

    Ok(indices)
}

fn eof() -> CaptureError {
    CaptureError::MalformedRle("opcode stream ended mid-sequence".into())
}

fn decode_rle8(bytes: &[u8], h: &Header, out: &mut [u8]) -> Result<()> {
    if h.bit_depth != 8 {
        return Err(CaptureError::UnsupportedCompression(
            "BI_RLE8 requires an 8-bit source".into(),
        ));
    }
    let width = h.width as usize;
    let height = h.height as usize;
    let palette = read_palette(bytes, h.colors_used)?;
    let data = bytes.get(h.pixel_offset..).ok_or_else(eof)?;
    let indices = decode_rle8_indices(data, width, height)?;
    expand_indexed(&indices, &palette, width, height, h.is_top_down, out);
    Ok(())
}

fn decode_rle4(bytes: &[u8], h: &Header, out: &mut [u8]) -> Result<()> {
    if h.bit_depth != 4 {
        return Err(CaptureError::UnsupportedCompression(
            "BI_RLE4 requires a 4-bit source".into(),
        ));
    }
    let width = h.width as usize;
    let height = h.height as usize;
    let palette = read_palette(bytes, h.colors_used)?;
    let data = bytes.get(h.pixel_offset..).ok_or_else(eof)?;
    let indices = decode_rle4_indices(data, width, height)?;
    expand_indexed(&indices, &palette, width, height, h.is_top_down, out);
    Ok(())
}

/// Flip a storage-order index buffer per orientation and expand each
/// index through `palette` into the (already top-down) RGB output.
fn expand_indexed(
    indices: &[u8],
    palette: &[(u8, u8, u8)],
    width: usize,
    height: usize,
    is_top_down: bool,
    out: &mut [u8],
) {
    for y in 0..height {
        let src_y = src_row(y, height, is_top_down);
        for x in 0..width {
            let idx = indices[src_y * width + x] as usize;
            let rgb = palette.get(idx).copied().unwrap_or((0, 0, 0));
            put_pixel(out, width, 3, x, y, rgb, None);
        }
    }
}

// ---------------------------------------------------------------------------
// BITFIELDS
// ---------------------------------------------------------------------------

struct ChannelMask {
    mask: u32,
    shift: u32,
    scale: f64,
}

impl ChannelMask {
    fn new(mask: u32) -> Self {
        if mask == 0 {
            return ChannelMask { mask: 0, shift: 0, scale: 0.0 };
        }
        let shift = mask.trailing_zeros();
        let bits = mask.count_ones();
        let max = (1u64 << bits) - 1;
        ChannelMask {
            mask,
            shift,
            scale: 255.0 / max as f64,
        }
    }

    fn extract(&self, pixel: u32) -> u8 {
        if self.mask == 0 {
            return 0;
        }
        let raw = (pixel & self.mask) >> self.shift;
        ((raw as f64 * self.scale).ceil().clamp(0.0, 255.0)) as u8
    }
}

fn decode_bitfields(bytes: &[u8], h: &Header, channels: u8, out: &mut [u8]) -> Result<()> {
    if h.bit_depth != 16 && h.bit_depth != 32 {
        return Err(CaptureError::UnsupportedCompression(
            "BI_BITFIELDS requires a 16- or 32-bit source".into(),
        ));
    }

    let base = FILE_HEADER_SIZE + 40;
    let mut r_mask = read_u32(bytes, base)?;
    let mut g_mask = read_u32(bytes, base + 4)?;
    let mut b_mask = read_u32(bytes, base + 8)?;
    let mut a_mask = 0u32;

    let has_alpha_slot =
        h.info_header_size >= 56 || (h.bit_depth == 32 && h.pixel_offset >= base + 16);
    if has_alpha_slot {
        a_mask = read_u32(bytes, base + 12).unwrap_or(0);
    }

    if r_mask == 0 && g_mask == 0 && b_mask == 0 {
        if h.bit_depth == 16 {
            r_mask = 0x7C00;
            g_mask = 0x03E0;
            b_mask = 0x001F;
        } else {
            b_mask = 0xFF;
            g_mask = 0xFF00;
            r_mask = 0xFF0000;
            a_mask = 0xFF000000;
        }
    }

    let r = ChannelMask::new(r_mask);
    let g = ChannelMask::new(g_mask);
    let b = ChannelMask::new(b_mask);
    let a = ChannelMask::new(a_mask);

    let width = h.width as usize;
    let height = h.height as usize;
    let stride = crate::bmp::stride_for(h.bit_depth, h.width);
    let bytes_per_pixel = (h.bit_depth / 8) as usize;

    for y in 0..height {
        let src_y = src_row(y, height, h.is_top_down);
        let row_start = h.pixel_offset + src_y * stride;
        let row = bytes
            .get(row_start..row_start + stride)
            .ok_or_else(|| CaptureError::InvalidBmp(format!("pixel row {src_y} out of bounds")))?;

        for x in 0..width {
            let at = x * bytes_per_pixel;
            let pixel: u32 = if h.bit_depth == 16 {
                u16::from_le_bytes([row[at], row[at + 1]]) as u32
            } else {
                u32::from_le_bytes([row[at], row[at + 1], row[at + 2], row[at + 3]])
            };

            let rgb = (r.extract(pixel), g.extract(pixel), b.extract(pixel));
            let alpha = if a_mask == 0 { 255 } else { a.extract(pixel) };
            put_pixel(out, width, channels as usize, x, y, rgb, Some(alpha));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u32(v: u32) -> [u8; 4] {
        v.to_le_bytes()
    }
    fn le_i32(v: i32) -> [u8; 4] {
        v.to_le_bytes()
    }
    fn le_u16(v: u16) -> [u8; 2] {
        v.to_le_bytes()
    }

    /// Build a minimal BI_RGB BMP with no palette (bit depth 16/24/32).
    fn build_rgb_bmp(width: u32, height: i32, bit_depth: u16, pixel_rows: &[u8]) -> Vec<u8> {
        let pixel_offset = 14 + 40;
        let mut buf = vec![0u8; pixel_offset];
        buf[0] = b'B';
        buf[1] = b'M';
        buf[10..14].copy_from_slice(&le_u32(pixel_offset as u32));
        buf[14..18].copy_from_slice(&le_u32(40));
        buf[18..22].copy_from_slice(&le_i32(width as i32));
        buf[22..26].copy_from_slice(&le_i32(height));
        buf[28..30].copy_from_slice(&le_u16(bit_depth));
        buf[30..34].copy_from_slice(&le_u32(0));
        buf.extend_from_slice(pixel_rows);
        buf
    }

    /// Scenario 1: 2x2 24-bit bottom-up BMP.
    #[test]
    fn scenario_1_bottom_up_24bit_round_trip_order() {
        #[rustfmt::skip]
        let rows = [
            // bottom row (y=1 in file) first: pixel0, pixel1, padding
            0u8, 0, 0,  1, 1, 1,  0, 0,
            // top row (y=0 in file) second
            2u8, 2, 2,  3, 3, 3,  0, 0,
        ];
        let bmp = build_rgb_bmp(2, 2, 24, &rows);
        let img = bmp_to_rgb(&bmp).unwrap();
        assert_eq!(img.width, 2);
        assert_eq!(img.height, 2);
        assert_eq!(img.channels, 3);
        // Output top row = last stored row = (2,2,2)-ish pixels; exact
        // values come from the B,G,R bytes above: stored (B=2,G=2,R=2)
        // and (B=3,G=3,R=3).
        assert_eq!(&img.data[0..6], &[2, 2, 2, 3, 3, 3]);
        assert_eq!(&img.data[6..12], &[0, 0, 0, 1, 1, 1]);
    }

    /// Scenario 2: 1-bit 8x1 BMP, top-down, byte 0xA5 = 10100101.
    #[test]
    fn scenario_2_one_bit_alternating_pattern() {
        let pixel_offset = 14 + 40 + 2 * 4;
        let mut buf = vec![0u8; pixel_offset];
        buf[0] = b'B';
        buf[1] = b'M';
        buf[10..14].copy_from_slice(&le_u32(pixel_offset as u32));
        buf[14..18].copy_from_slice(&le_u32(40));
        buf[18..22].copy_from_slice(&le_i32(8));
        buf[22..26].copy_from_slice(&le_i32(-1)); // top-down, height 1
        buf[28..30].copy_from_slice(&le_u16(1));
        buf[30..34].copy_from_slice(&le_u32(0));
        buf[46..50].copy_from_slice(&le_u32(0)); // colorsUsed=0 -> defaults to 2
        // palette: black, white
        let pal_off = 14 + 40;
        buf[pal_off..pal_off + 4].copy_from_slice(&[0, 0, 0, 0]);
        buf[pal_off + 4..pal_off + 8].copy_from_slice(&[255, 255, 255, 0]);
        // stride = floor((1*8+31)/32)*4 = 4 bytes; row = [0xA5, 0,0,0]
        buf.extend_from_slice(&[0xA5, 0, 0, 0]);

        let img = bmp_to_rgb(&buf).unwrap();
        assert_eq!(img.channels, 3);
        let expected: [u8; 24] = [
            0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
        ];
        assert_eq!(&img.data[..], &expected[..]);
    }

    /// Scenario 5: 16-bit BITFIELDS, 5-5-5 masks, single pixel 0x7FFF.
    #[test]
    fn scenario_5_bitfields_555_white() {
        let pixel_offset = 14 + 40 + 12;
        let mut buf = vec![0u8; pixel_offset];
        buf[0] = b'B';
        buf[1] = b'M';
        buf[10..14].copy_from_slice(&le_u32(pixel_offset as u32));
        buf[14..18].copy_from_slice(&le_u32(40));
        buf[18..22].copy_from_slice(&le_i32(1));
        buf[22..26].copy_from_slice(&le_i32(-1));
        buf[28..30].copy_from_slice(&le_u16(16));
        buf[30..34].copy_from_slice(&le_u32(3)); // BI_BITFIELDS
        let base = 14 + 40;
        buf[base..base + 4].copy_from_slice(&le_u32(0x7C00));
        buf[base + 4..base + 8].copy_from_slice(&le_u32(0x03E0));
        buf[base + 8..base + 12].copy_from_slice(&le_u32(0x001F));
        // stride = floor((16*1+31)/32)*4 = 4
        buf.extend_from_slice(&le_u16(0x7FFF));
        buf.extend_from_slice(&[0, 0]); // padding to stride 4

        let img = bmp_to_rgb(&buf).unwrap();
        assert_eq!(img.channels, 3);
        assert_eq!(&img.data[0..3], &[255, 255, 255]);
    }

    /// Scenario 6: RLE8 stream, width 5 height 2, top-down.
    #[test]
    fn scenario_6_rle8_literal_and_blank_row() {
        let palette_colors = 256u32;
        let pal_bytes = palette_colors as usize * 4;
        let pixel_offset = 14 + 40 + pal_bytes;
        let mut buf = vec![0u8; pixel_offset];
        buf[0] = b'B';
        buf[1] = b'M';
        buf[10..14].copy_from_slice(&le_u32(pixel_offset as u32));
        buf[14..18].copy_from_slice(&le_u32(40));
        buf[18..22].copy_from_slice(&le_i32(5));
        buf[22..26].copy_from_slice(&le_i32(-2)); // top-down, height 2
        buf[28..30].copy_from_slice(&le_u16(8));
        buf[30..34].copy_from_slice(&le_u32(1)); // BI_RLE8
        buf[46..50].copy_from_slice(&le_u32(palette_colors));
        let pal_off = 14 + 40;
        buf[pal_off + 0x41 * 4..pal_off + 0x41 * 4 + 4].copy_from_slice(&[30, 20, 10, 0]); // BGR for (10,20,30)
        buf[pal_off + 0x42 * 4..pal_off + 0x42 * 4 + 4].copy_from_slice(&[60, 50, 40, 0]); // BGR for (40,50,60)

        let rle = [0x03u8, 0x41, 0x00, 0x00, 0x02, 0x42, 0x00, 0x01];
        buf.extend_from_slice(&rle);

        let img = bmp_to_rgb(&buf).unwrap();
        assert_eq!(img.width, 5);
        assert_eq!(img.height, 2);
        // Row 0: three pixels of (10,20,30), then end-of-line; the
        // remaining two pixels stay at index 0 (black).
        let row0 = &img.data[0..15];
        assert_eq!(
            row0,
            &[10, 20, 30, 10, 20, 30, 10, 20, 30, 0, 0, 0, 0, 0, 0]
        );
        // Row 1: two pixels of (40,50,60), then end-of-bitmap; the
        // remaining three pixels stay at index 0 (black).
        let row1 = &img.data[15..30];
        assert_eq!(row1, &[40, 50, 60, 40, 50, 60, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn orientation_top_down_and_bottom_up_agree() {
        let rows_bottom_up = [0u8, 0, 0, 1, 1, 1, 0, 0, 2, 2, 2, 3, 3, 3, 0, 0];
        let bottom_up = build_rgb_bmp(2, 2, 24, &rows_bottom_up);

        let rows_top_down = [2u8, 2, 2, 3, 3, 3, 0, 0, 0, 0, 0, 1, 1, 1, 0, 0];
        let mut top_down_buf = build_rgb_bmp(2, 2, 24, &rows_top_down);
        top_down_buf[22..26].copy_from_slice(&(-2i32).to_le_bytes());

        let a = bmp_to_rgb(&bottom_up).unwrap();
        let b = bmp_to_rgb(&top_down_buf).unwrap();
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn unsupported_compression_is_rejected() {
        let mut buf = build_rgb_bmp(2, 2, 24, &[0u8; 16]);
        buf[30..34].copy_from_slice(&le_u32(4)); // BI_JPEG
        let err = bmp_to_rgb(&buf).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedCompression(_)));
    }

    #[test]
    fn missing_signature_is_invalid_bmp() {
        let err = bmp_to_rgb(&[0u8; 20]).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidBmp(_)));
    }

    #[test]
    fn decoder_size_contract_32bit_has_alpha_channel() {
        let rows = [10u8, 20, 30, 255];
        let mut buf = build_rgb_bmp(1, -1, 32, &rows);
        buf[22..26].copy_from_slice(&(-1i32).to_le_bytes());
        let img = bmp_to_rgb(&buf).unwrap();
        assert_eq!(img.channels, 4);
        assert_eq!(img.data.len(), 1 * 1 * 4);
        assert_eq!(&img.data, &[30, 20, 10, 255]);
    }

    #[test]
    fn rgb_image_serializes_to_json() {
        let img = RGBImage { width: 1, height: 1, channels: 3, data: vec![1, 2, 3] };
        let json = serde_json::to_string(&img).unwrap();
        assert!(json.contains("\"width\":1"));
        assert!(json.contains("[1,2,3]"));
    }
}
