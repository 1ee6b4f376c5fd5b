//! Error types for `winshot`.
//!
//! All fallible operations in this crate funnel through [`CaptureError`],
//! which uses `thiserror` for `Display`/`Error` derives. Variants map
//! directly onto the error kinds named in the external-interface table:
//! each native-call failure is surfaced under the name of the logical
//! step that failed, not a generic "OS error".

use thiserror::Error;

/// Top-level error type for the `winshot` library.
///
/// Each variant corresponds to a distinct failure kind from the public
/// operation table: caller-input failures (`InvalidRegion`,
/// `WindowNotFound`, `InvalidBmp`, `UnsupportedCompression`), native-call
/// failures named after the step that failed (`BlitFailed`,
/// `PrintFailed`, `GetBitsFailed`, ...), and lifecycle (`Closed`).
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The library could not be constructed (native binding setup failed).
    #[error("LibLoadFailed: {0}")]
    LibLoadFailed(String),

    /// A capture region or window rectangle had non-positive width/height.
    #[error("InvalidRegion: {0}")]
    InvalidRegion(String),

    /// A device context could not be acquired or created.
    #[error("DcUnavailable: {0}")]
    DcUnavailable(String),

    /// `BitBlt` failed during screen capture.
    #[error("BlitFailed: {0}")]
    BlitFailed(String),

    /// `PrintWindow` failed during window capture.
    #[error("PrintFailed: {0}")]
    PrintFailed(String),

    /// `GetDIBits` failed to copy pixels out of a bitmap.
    #[error("GetBitsFailed: {0}")]
    GetBitsFailed(String),

    /// Cursor info/icon info could not be queried; cursor was not drawn.
    #[error("CursorUnavailable: {0}")]
    CursorUnavailable(String),

    /// A `WindowIdentifier` did not resolve to any window.
    #[error("WindowNotFound: {0}")]
    WindowNotFound(String),

    /// A native call unrelated to the above steps returned a failure.
    #[error("OsFailure: {0}")]
    OsFailure(String),

    /// Per-window or per-system DPI could not be read (returned 0).
    #[error("DpiUnavailable: {0}")]
    DpiUnavailable(String),

    /// Window enumeration itself failed (the traversal call errored).
    #[error("EnumFailed: {0}")]
    EnumFailed(String),

    /// A window's class name could not be read (zero-length result).
    #[error("ClassNameUnavailable: {0}")]
    ClassNameUnavailable(String),

    /// A window's owning process id could not be read (zero result).
    #[error("ProcessIdUnavailable: {0}")]
    ProcessIdUnavailable(String),

    /// A window's style bits could not be read (zero result).
    #[error("StyleUnavailable: {0}")]
    StyleUnavailable(String),

    /// A capture operation was attempted after `close()`.
    #[error("Closed: engine has been closed")]
    Closed,

    /// The input bytes are not a recognizable BMP stream.
    #[error("InvalidBmp: {0}")]
    InvalidBmp(String),

    /// The BMP declares a compression this decoder does not support.
    #[error("UnsupportedCompression: {0}")]
    UnsupportedCompression(String),

    /// An RLE4/RLE8 stream violated the opcode grammar.
    #[error("MalformedRle: {0}")]
    MalformedRle(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaptureError>;

#[cfg(windows)]
impl From<windows::core::Error> for CaptureError {
    fn from(err: windows::core::Error) -> Self {
        CaptureError::OsFailure(format!("Windows error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_name() {
        let err = CaptureError::InvalidRegion("right <= left".into());
        assert_eq!(err.to_string(), "InvalidRegion: right <= left");
        let err = CaptureError::Closed;
        assert_eq!(err.to_string(), "Closed: engine has been closed");
    }
}
