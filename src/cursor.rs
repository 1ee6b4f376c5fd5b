//! Cursor compositing (Component E).
//!
//! Draws the current system cursor into a capture DC, translated by the
//! capture origin and scaled by system DPI. Grounded on the
//! `GetCursorInfo`/`GetIconInfo`/`DrawIconEx` sequence the teacher's
//! screenshot module never needed (it captured desktop frames via DXGI,
//! which composites the cursor itself) but which the pack's
//! GDI-capture reference performs the same way this module does.

#![cfg(windows)]

use windows::Win32::Graphics::Gdi::HDC;
use windows::Win32::UI::HiDpi::GetDpiForSystem;
use windows::Win32::UI::WindowsAndMessaging::{
    DrawIconEx, GetCursorInfo, GetIconInfo, DI_NORMAL, ICONINFO,
};

use crate::errors::{CaptureError, Result};

/// Both bit 0x01 and bit 0x02 of the cursor-info flags must be set
/// before the cursor is drawn. Documented Win32 semantics mark only
/// 0x01 ("showing") as meaningful; this stricter test is preserved
/// rather than relaxed to a single bit — see DESIGN.md's Open Questions.
const CURSOR_SHOWING_MASK: u32 = 0x01 | 0x02;

/// Compose the current cursor into `target_dc`, translating by
/// `(origin_x, origin_y)` and scaling by the system DPI. A no-op (not
/// an error) when the OS reports the cursor as not showing.
pub fn compose(target_dc: HDC, origin_x: i32, origin_y: i32) -> Result<()> {
    let mut info = windows::Win32::UI::WindowsAndMessaging::CURSORINFO {
        cbSize: std::mem::size_of::<windows::Win32::UI::WindowsAndMessaging::CURSORINFO>() as u32,
        ..Default::default()
    };

    unsafe { GetCursorInfo(&mut info) }.map_err(|e| {
        log::debug!("GetCursorInfo failed: {e}");
        CaptureError::CursorUnavailable(format!("GetCursorInfo failed: {e}"))
    })?;

    if info.flags.0 & CURSOR_SHOWING_MASK != CURSOR_SHOWING_MASK {
        log::debug!("cursor not showing (flags={:#x}), skipping composite", info.flags.0);
        return Ok(());
    }

    let mut icon_info = ICONINFO::default();
    unsafe { GetIconInfo(info.hCursor, &mut icon_info) }.map_err(|e| {
        log::debug!("GetIconInfo failed: {e}");
        CaptureError::CursorUnavailable(format!("GetIconInfo failed: {e}"))
    })?;

    // The two bitmap handles in `icon_info` must be released on every
    // exit path, success or error.
    let result = draw_cursor(target_dc, &info, &icon_info, origin_x, origin_y);

    unsafe {
        if !icon_info.hbmMask.is_invalid() {
            let _ = windows::Win32::Graphics::Gdi::DeleteObject(icon_info.hbmMask.into());
        }
        if !icon_info.hbmColor.is_invalid() {
            let _ = windows::Win32::Graphics::Gdi::DeleteObject(icon_info.hbmColor.into());
        }
    }

    result
}

fn draw_cursor(
    target_dc: HDC,
    info: &windows::Win32::UI::WindowsAndMessaging::CURSORINFO,
    icon_info: &ICONINFO,
    origin_x: i32,
    origin_y: i32,
) -> Result<()> {
    let dpi = unsafe { GetDpiForSystem() };
    if dpi == 0 {
        return Err(CaptureError::DpiUnavailable("GetDpiForSystem returned 0".into()));
    }
    let scale = dpi as f64 / 96.0;

    let hotspot_x = icon_info.xHotspot as i32;
    let hotspot_y = icon_info.yHotspot as i32;

    let draw_x = (((info.ptScreenPos.x - origin_x - hotspot_x) as f64) * scale).round() as i32;
    let draw_y = (((info.ptScreenPos.y - origin_y - hotspot_y) as f64) * scale).round() as i32;

    unsafe {
        DrawIconEx(
            target_dc,
            draw_x,
            draw_y,
            info.hCursor,
            0,
            0,
            0,
            None,
            DI_NORMAL,
        )
    }
    .map_err(|e| CaptureError::CursorUnavailable(format!("DrawIconEx failed: {e}")))?;

    Ok(())
}

/// Drive the process to per-monitor DPI awareness once, best-effort.
/// Failure is not fatal: a non-DPI-aware process still captures
/// correctly, just without the cursor-scaling correction.
pub fn ensure_process_dpi_aware() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| unsafe {
        let _ = windows::Win32::UI::HiDpi::SetProcessDpiAwarenessContext(
            windows::Win32::UI::HiDpi::DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        );
    });
}

#[cfg(test)]
mod tests {
    use super::CURSOR_SHOWING_MASK;

    #[test]
    fn showing_mask_requires_both_bits() {
        assert_eq!(CURSOR_SHOWING_MASK, 0x03);
        assert_ne!(0x01 & CURSOR_SHOWING_MASK, CURSOR_SHOWING_MASK);
        assert_eq!(0x03 & CURSOR_SHOWING_MASK, CURSOR_SHOWING_MASK);
    }
}
