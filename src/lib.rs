//! `winshot` — Windows desktop/window screenshot capture via GDI, and a
//! standalone BMP decoder.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `CaptureError` enum via `thiserror` |
//! | [`geometry`] | `Rect`/`Size` and DPI-scaling math |
//! | [`palette`] | Static 1/4/8-bit color tables |
//! | [`bmp`] | BMP assembler (`BmpStructure`) and decoder (`bmp::decode`) |
//! | [`native`] | Native binding lifecycle (Windows only) |
//! | [`window`] | Window enumeration and geometry (Windows only) |
//! | [`cursor`] | Cursor compositing (Windows only) |
//! | [`gdi_guard`] | Scoped RAII release of GDI handles (Windows only) |
//! | [`capture`] | The capture engine (Windows only) |
//!
//! The BMP assembler/decoder and their supporting geometry and palette
//! math are platform-agnostic and compile and test everywhere; only the
//! modules that call into Win32 are gated behind `#[cfg(windows)]`.

pub mod bmp;
pub mod errors;
pub mod geometry;
pub mod palette;

#[cfg(windows)]
pub mod capture;
#[cfg(windows)]
pub mod cursor;
#[cfg(windows)]
pub mod gdi_guard;
#[cfg(windows)]
pub mod native;
#[cfg(windows)]
pub mod window;

pub use bmp::decode::{bmp_to_rgb, RGBImage};
pub use errors::{CaptureError, Result};
pub use geometry::{Rect, Size};

#[cfg(windows)]
pub use capture::{BitDepth, CaptureEngine, CaptureOptions, RectOverride};
#[cfg(windows)]
pub use window::{WindowHandle, WindowIdentifier, WindowInfo, WindowStyle};
