//! Scoped RAII release primitives for GDI handles (part of Component F's
//! resource-release discipline), modeled on the teacher's `COMGuard`
//! pattern: acquire in `new`, release in `Drop`, so every exit path —
//! success, early return, or panic — releases the handle exactly once.

#![cfg(windows)]

use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{
    DeleteDC, DeleteObject, ReleaseDC, HBITMAP, HDC,
};

/// A DC obtained from `GetDC`/`GetWindowDC`, released with `ReleaseDC`
/// against the same window handle (`None` for the screen DC).
pub struct WindowDcGuard {
    owner: Option<HWND>,
    dc: HDC,
}

impl WindowDcGuard {
    pub fn new(owner: Option<HWND>, dc: HDC) -> Self {
        WindowDcGuard { owner, dc }
    }

    pub fn handle(&self) -> HDC {
        self.dc
    }
}

impl Drop for WindowDcGuard {
    fn drop(&mut self) {
        if !self.dc.is_invalid() {
            unsafe {
                ReleaseDC(self.owner, self.dc);
            }
        }
    }
}

/// A memory DC from `CreateCompatibleDC`, released with `DeleteDC`.
pub struct MemDcGuard {
    dc: HDC,
}

impl MemDcGuard {
    pub fn new(dc: HDC) -> Self {
        MemDcGuard { dc }
    }

    pub fn handle(&self) -> HDC {
        self.dc
    }
}

impl Drop for MemDcGuard {
    fn drop(&mut self) {
        if !self.dc.is_invalid() {
            unsafe {
                let _ = DeleteDC(self.dc);
            }
        }
    }
}

/// A bitmap (compatible bitmap or DIB section), released with
/// `DeleteObject`. Must be deselected from its DC before this guard
/// drops — deleting a selected bitmap is a GDI error.
pub struct BitmapGuard {
    bitmap: HBITMAP,
}

impl BitmapGuard {
    pub fn new(bitmap: HBITMAP) -> Self {
        BitmapGuard { bitmap }
    }

    pub fn handle(&self) -> HBITMAP {
        self.bitmap
    }
}

impl Drop for BitmapGuard {
    fn drop(&mut self) {
        if !self.bitmap.is_invalid() {
            unsafe {
                let _ = DeleteObject(self.bitmap.into());
            }
        }
    }
}

/// Selects `bitmap` into `dc` on construction, restores the DC's
/// previous selection on drop — always before the bitmap itself is
/// deleted, since the two guards are dropped in declaration order when
/// stacked with the selection guard declared after the bitmap guard.
pub struct SelectionGuard {
    dc: HDC,
    previous: windows::Win32::Graphics::Gdi::HGDIOBJ,
}

impl SelectionGuard {
    pub fn select(dc: HDC, bitmap: HBITMAP) -> Self {
        let previous = unsafe { windows::Win32::Graphics::Gdi::SelectObject(dc, bitmap.into()) };
        SelectionGuard { dc, previous }
    }
}

impl Drop for SelectionGuard {
    fn drop(&mut self) {
        unsafe {
            windows::Win32::Graphics::Gdi::SelectObject(self.dc, self.previous);
        }
    }
}
