//! Static color tables for 1-, 4-, and 8-bit BMP output (Component C).
//!
//! Built once and cached behind [`std::sync::OnceLock`], the same pattern
//! `wmcp_core::system_info` uses for its lazily-initialized `System`
//! singleton — here there's no mutable state to guard, so a plain
//! `OnceLock<Vec<[u8; 4]>>` per table is enough.
//!
//! Every table is encoded as 4-byte BGRA entries with the reserved alpha
//! byte fixed at 0, per the BMP palette format. One exception is
//! preserved bit-for-bit from the source this was distilled from: the
//! 4-bit VGA table writes each entry's three listed components straight
//! into the first three bytes of the BGRA slot *without* the R/B swap
//! every other table gets. Concretely, "dark red" (128, 0, 0) ends up
//! as bytes `[128, 0, 0, 0]`, not `[0, 0, 128, 0]`. Preserved rather than
//! "fixed" because the capture engine round-trips through this exact
//! byte layout and changing it would silently shift every 4-bit capture's
//! colors.

use std::sync::OnceLock;

/// 1-bit monochrome: black, white.
pub fn monochrome() -> &'static [[u8; 4]] {
    static TABLE: OnceLock<Vec<[u8; 4]>> = OnceLock::new();
    TABLE.get_or_init(|| vec![bgra(0, 0, 0), bgra(255, 255, 255)]).as_slice()
}

/// 4-bit, 16-color standard VGA palette, in the canonical DOS/Windows
/// console order. See the module doc for the byte-order quirk this
/// table alone preserves.
pub fn vga16() -> &'static [[u8; 4]] {
    static TABLE: OnceLock<Vec<[u8; 4]>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            const TRIPLES: [(u8, u8, u8); 16] = [
                (0, 0, 0),       // black
                (128, 0, 0),     // dark red
                (0, 128, 0),     // dark green
                (128, 128, 0),   // dark yellow
                (0, 0, 128),     // dark blue
                (128, 0, 128),   // dark magenta
                (0, 128, 128),   // dark cyan
                (192, 192, 192), // light gray
                (128, 128, 128), // dark gray
                (255, 0, 0),     // red
                (0, 255, 0),     // green
                (255, 255, 0),   // yellow
                (0, 0, 255),     // blue
                (255, 0, 255),   // magenta
                (0, 255, 255),   // cyan
                (255, 255, 255), // white
            ];
            TRIPLES
                .iter()
                .map(|&(c0, c1, c2)| [c0, c1, c2, 0])
                .collect()
        })
        .as_slice()
}

/// 8-bit grayscale ramp: entry `i` is `(i, i, i)` for `i` in `0..=255`.
pub fn grayscale8() -> &'static [[u8; 4]] {
    static TABLE: OnceLock<Vec<[u8; 4]>> = OnceLock::new();
    TABLE
        .get_or_init(|| (0u16..=255).map(|i| bgra(i as u8, i as u8, i as u8)).collect())
        .as_slice()
}

/// The 20 fixed colors Windows reserves at the start of an 8-bit system
/// palette — the same values `GetSystemPaletteEntries` returns for the
/// default palette's static slots.
const SYSTEM_20: [(u8, u8, u8); 20] = [
    (0, 0, 0),
    (128, 0, 0),
    (0, 128, 0),
    (128, 128, 0),
    (0, 0, 128),
    (128, 0, 128),
    (0, 128, 128),
    (192, 192, 192),
    (192, 220, 192),
    (166, 202, 240),
    (255, 251, 240),
    (160, 160, 164),
    (128, 128, 128),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (0, 0, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

/// 8-bit "halftone" palette: 20 system colors, a 6x6x6 color cube, then a
/// 20-step gray ramp. Indices match the testable property exactly:
/// `palette[20 + 36r + 6g + b] == (51r, 51g, 51b)` and
/// `palette[236 + i] == round(i * 255 / 19)` repeated across channels.
pub fn halftone8() -> &'static [[u8; 4]] {
    static TABLE: OnceLock<Vec<[u8; 4]>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            let mut entries = Vec::with_capacity(256);
            entries.extend(SYSTEM_20.iter().map(|&(r, g, b)| bgra(r, g, b)));

            const CUBE_STEPS: [u8; 6] = [0, 51, 102, 153, 204, 255];
            for &r in &CUBE_STEPS {
                for &g in &CUBE_STEPS {
                    for &b in &CUBE_STEPS {
                        entries.push(bgra(r, g, b));
                    }
                }
            }

            for i in 0..20u32 {
                let v = ((i * 255) as f64 / 19.0).round() as u8;
                entries.push(bgra(v, v, v));
            }

            debug_assert_eq!(entries.len(), 256);
            entries
        })
        .as_slice()
}

fn bgra(r: u8, g: u8, b: u8) -> [u8; 4] {
    [b, g, r, 0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monochrome_has_two_entries() {
        assert_eq!(monochrome(), &[[0, 0, 0, 0], [255, 255, 255, 0]]);
    }

    #[test]
    fn vga16_preserves_unswapped_byte_order() {
        let table = vga16();
        assert_eq!(table.len(), 16);
        // dark red (128,0,0) -> bytes [128,0,0,0], not BGRA-swapped.
        assert_eq!(table[1], [128, 0, 0, 0]);
        assert_eq!(table[0], [0, 0, 0, 0]);
        assert_eq!(table[15], [255, 255, 255, 0]);
    }

    #[test]
    fn grayscale8_is_identity_ramp() {
        let table = grayscale8();
        assert_eq!(table.len(), 256);
        assert_eq!(table[0], [0, 0, 0, 0]);
        assert_eq!(table[128], [128, 128, 128, 0]);
        assert_eq!(table[255], [255, 255, 255, 0]);
    }

    /// Palette correctness (8-bit halftone) testable property.
    #[test]
    fn halftone8_cube_and_ramp_indices_match_formula() {
        let table = halftone8();
        assert_eq!(table.len(), 256);

        for r in 0..6u32 {
            for g in 0..6u32 {
                for b in 0..6u32 {
                    let idx = 20 + 36 * r + 6 * g + b;
                    assert_eq!(
                        table[idx as usize],
                        [(b * 51) as u8, (g * 51) as u8, (r * 51) as u8, 0],
                        "cube entry r={r} g={g} b={b} at index {idx}"
                    );
                }
            }
        }

        for i in 0..20u32 {
            let v = ((i * 255) as f64 / 19.0).round() as u8;
            assert_eq!(table[236 + i as usize], [v, v, v, 0]);
        }

        assert_eq!(table[0], [0, 0, 0, 0]);
        assert_eq!(table[19], [255, 255, 255, 0]);
    }
}
