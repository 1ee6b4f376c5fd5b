//! Window enumeration and geometry (Component D).
//!
//! Mirrors the shape of the teacher's original window module (owned
//! snapshots, never raw handles escaping without a wrapper) but
//! reimplements enumeration as a `FindWindowExW` sibling walk instead of
//! `EnumWindows`, and geometry as DPI-scaled device pixels instead of
//! raw screen coordinates.

#![cfg(windows)]

use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;

use serde::Serialize;
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    GetDC, GetDeviceCaps, ReleaseDC, DESKTOPHORZRES, DESKTOPVERTRES,
};
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, GetClassNameW, GetWindowLongW, GetWindowRect, GetWindowTextLengthW,
    GetWindowTextW, GetWindowThreadProcessId, IsWindowVisible, GWL_STYLE, WS_DISABLED,
    WS_MAXIMIZE, WS_MINIMIZE,
};

use crate::errors::{CaptureError, Result};
use crate::geometry::Rect;

const TEXT_BUFFER_UNITS: usize = 256;

/// Opaque, OS-owned window identifier. The engine never allocates or
/// frees one, only borrows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    fn to_hwnd(self) -> HWND {
        HWND(self.0 as *mut core::ffi::c_void)
    }

    fn from_hwnd(hwnd: HWND) -> Self {
        WindowHandle(hwnd.0 as isize)
    }
}

/// One of four mutually exclusive ways to identify a top-level window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowIdentifier {
    Title(String),
    ClassName(String),
    ProcessId(u32),
    Handle(WindowHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowStyle {
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub is_disabled: bool,
}

impl WindowStyle {
    fn from_bits(style: u32) -> Self {
        WindowStyle {
            is_minimized: style & WS_MINIMIZE.0 != 0,
            is_maximized: style & WS_MAXIMIZE.0 != 0,
            is_disabled: style & WS_DISABLED.0 != 0,
        }
    }
}

/// An owned snapshot of a visible top-level window. The handle may
/// outlive or be invalidated independently of this snapshot; using a
/// stale handle surfaces as a native failure on next use, not here.
#[derive(Debug, Clone, Serialize)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    pub process_id: u32,
    pub position: Rect,
    pub style: WindowStyle,
}

// ---------------------------------------------------------------------------
// Low-level readers
// ---------------------------------------------------------------------------

fn read_title(hwnd: HWND) -> String {
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u16; (len as usize + 1).min(TEXT_BUFFER_UNITS)];
    let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
    if copied <= 0 {
        return String::new();
    }
    decode_utf16_truncated(&buf[..copied as usize])
}

fn read_class_name(hwnd: HWND) -> Result<String> {
    let mut buf = [0u16; TEXT_BUFFER_UNITS];
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    if len <= 0 {
        log::debug!("GetClassNameW returned zero length for handle {:?}", hwnd.0);
        return Err(CaptureError::ClassNameUnavailable(format!(
            "GetClassNameW returned zero length for handle {:?}",
            hwnd.0
        )));
    }
    Ok(decode_utf16_truncated(&buf[..len as usize]))
}

fn read_process_id(hwnd: HWND) -> Result<u32> {
    let mut pid: u32 = 0;
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    if pid == 0 {
        log::debug!("GetWindowThreadProcessId returned 0 for handle {:?}", hwnd.0);
        return Err(CaptureError::ProcessIdUnavailable(format!(
            "GetWindowThreadProcessId returned 0 for handle {:?}",
            hwnd.0
        )));
    }
    Ok(pid)
}

/// Style bits from `GWL_STYLE` (offset -16). A return of 0 is treated as
/// failure, preserving the stricter-than-correct source behavior: a
/// window with a literal style of 0 is legal and would be misreported
/// as `StyleUnavailable`. Not "fixed" — see DESIGN.md's Open Questions.
fn read_style(hwnd: HWND) -> Result<u32> {
    let style = unsafe { GetWindowLongW(hwnd, GWL_STYLE) } as u32;
    if style == 0 {
        log::debug!(
            "GetWindowLongW(GWL_STYLE) returned 0 for handle {:?}, treating as failure",
            hwnd.0
        );
        return Err(CaptureError::StyleUnavailable(format!(
            "GetWindowLongW(GWL_STYLE) returned 0 for handle {:?}",
            hwnd.0
        )));
    }
    Ok(style)
}

fn decode_utf16_truncated(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    let end = end.min(TEXT_BUFFER_UNITS);
    OsString::from_wide(&units[..end]).to_string_lossy().into_owned()
}

fn is_visible(hwnd: HWND) -> bool {
    unsafe { IsWindowVisible(hwnd) }.as_bool()
}

fn read_dpi(hwnd: HWND) -> Result<u32> {
    let dpi = unsafe { GetDpiForWindow(hwnd) };
    if dpi == 0 {
        return Err(CaptureError::DpiUnavailable(format!(
            "GetDpiForWindow returned 0 for handle {:?}",
            hwnd.0
        )));
    }
    Ok(dpi)
}

// ---------------------------------------------------------------------------
// Sibling traversal
// ---------------------------------------------------------------------------

/// Walk top-level siblings via `FindWindowExW(None, prev, None, None)`,
/// starting with `prev = None` (no parent, no prior child on the first
/// step), terminating when the call returns null.
struct SiblingWalk {
    prev: Option<HWND>,
    done: bool,
}

impl SiblingWalk {
    fn new() -> Self {
        SiblingWalk { prev: None, done: false }
    }
}

impl Iterator for SiblingWalk {
    type Item = HWND;

    fn next(&mut self) -> Option<HWND> {
        if self.done {
            return None;
        }
        let next = unsafe { FindWindowExW(None, self.prev, None, None) };
        match next {
            Ok(hwnd) if !hwnd.is_invalid() => {
                self.prev = Some(hwnd);
                Some(hwnd)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// `{0, 0, DESKTOP_HORZRES, DESKTOP_VERTRES}` read from the primary
/// screen DC, which is acquired and released within this call.
pub fn screen_rect() -> Result<Rect> {
    let dc = unsafe { GetDC(None) };
    if dc.is_invalid() {
        log::debug!("GetDC(NULL) failed while reading the screen rect");
        return Err(CaptureError::DcUnavailable("GetDC(NULL) failed".into()));
    }
    let width = unsafe { GetDeviceCaps(Some(dc), DESKTOPHORZRES) };
    let height = unsafe { GetDeviceCaps(Some(dc), DESKTOPVERTRES) };
    unsafe { ReleaseDC(None, dc) };

    Ok(Rect::new(0, 0, width, height))
}

/// Resolve `identifier` to a handle, read the raw OS rectangle, scale it
/// by the window's own DPI with per-edge ceiling rounding.
pub fn window_rect(identifier: &WindowIdentifier) -> Result<Rect> {
    let handle = resolve(identifier)?;
    let hwnd = handle.to_hwnd();

    let mut raw = RECT::default();
    unsafe { GetWindowRect(hwnd, &mut raw) }
        .map_err(|e| CaptureError::OsFailure(format!("GetWindowRect failed: {e}")))?;

    let dpi = read_dpi(hwnd)?;
    let raw_rect = Rect::new(raw.left, raw.top, raw.right, raw.bottom);
    Ok(raw_rect.scaled_by_dpi(dpi))
}

/// Iterate top-level windows via [`SiblingWalk`]; invisible windows are
/// skipped. Each surviving entry must yield a title (empty allowed),
/// class name, process id, and style bits, or the whole call fails.
pub fn enumerate() -> Result<Vec<WindowInfo>> {
    let mut out = Vec::new();

    for hwnd in SiblingWalk::new() {
        if !is_visible(hwnd) {
            continue;
        }

        let title = read_title(hwnd);
        let class_name = read_class_name(hwnd)?;
        let process_id = read_process_id(hwnd)?;
        let style_bits = read_style(hwnd)?;
        let handle = WindowHandle::from_hwnd(hwnd);
        let position = window_rect(&WindowIdentifier::Handle(handle))?;

        out.push(WindowInfo {
            handle,
            title,
            class_name,
            process_id,
            position,
            style: WindowStyle::from_bits(style_bits),
        });
    }

    Ok(out)
}

/// Resolve a [`WindowIdentifier`] to a [`WindowHandle`]. The `Handle`
/// variant is returned unvalidated and untested for visibility — a
/// caller holding a handle is trusted. The other three variants iterate
/// visible windows only and match case-sensitively.
pub fn resolve(identifier: &WindowIdentifier) -> Result<WindowHandle> {
    if let WindowIdentifier::Handle(handle) = identifier {
        return Ok(*handle);
    }

    for hwnd in SiblingWalk::new() {
        if !is_visible(hwnd) {
            continue;
        }

        let matched = match identifier {
            WindowIdentifier::Title(want) => read_title(hwnd) == *want,
            WindowIdentifier::ClassName(want) => {
                read_class_name(hwnd).map(|c| c == *want).unwrap_or(false)
            }
            WindowIdentifier::ProcessId(want) => {
                read_process_id(hwnd).map(|p| p == *want).unwrap_or(false)
            }
            WindowIdentifier::Handle(_) => unreachable!(),
        };

        if matched {
            return Ok(WindowHandle::from_hwnd(hwnd));
        }
    }

    log::debug!("no visible window matched identifier {identifier:?}");
    Err(CaptureError::WindowNotFound(format!("{identifier:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_style_bits_decode_independently() {
        let style = WindowStyle::from_bits(WS_MINIMIZE.0 | WS_DISABLED.0);
        assert!(style.is_minimized);
        assert!(style.is_disabled);
        assert!(!style.is_maximized);
    }

    #[test]
    fn truncation_stops_at_first_nul_or_256_units() {
        let mut units: Vec<u16> = "hello".encode_utf16().collect();
        units.push(0);
        units.extend_from_slice(&[b'X' as u16; 10]);
        assert_eq!(decode_utf16_truncated(&units), "hello");

        let long: Vec<u16> = std::iter::repeat(b'A' as u16).take(500).collect();
        assert_eq!(decode_utf16_truncated(&long).chars().count(), TEXT_BUFFER_UNITS);
    }

    #[test]
    fn handle_identifier_resolves_without_enumeration() {
        let handle = WindowHandle(0x1234);
        let resolved = resolve(&WindowIdentifier::Handle(handle)).unwrap();
        assert_eq!(resolved, handle);
    }

    #[test]
    fn window_info_serializes_to_json() {
        let info = WindowInfo {
            handle: WindowHandle(0x1234),
            title: "Notepad".into(),
            class_name: "Notepad".into(),
            process_id: 4242,
            position: Rect::new(0, 0, 800, 600),
            style: WindowStyle { is_minimized: false, is_maximized: true, is_disabled: false },
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("Notepad"));
        assert!(json.contains("4242"));
    }
}
