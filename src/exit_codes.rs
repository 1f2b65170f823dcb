//! Standard exit codes for the rompack builder
//!
//! The firmware makefile keys off these codes, so they are part of the
//! tool's contract and must stay stable.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Configuration error (unknown compression method, bad cover size,
/// bad or missing BIOS files, zip/7z archives left in roms/)
pub const EXIT_CONFIG_ERROR: i32 = 102;

/// Codec error (compression or container framing failed)
pub const EXIT_CODEC_ERROR: i32 = 103;

/// Packed output exceeds the external flash capacity
pub const EXIT_OVERFLOW_ERROR: i32 = 104;

/// Invalid command-line arguments
pub const EXIT_INVALID_ARGS: i32 = 105;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// No images found in any family folder
pub const EXIT_NO_IMAGES: i32 = 107;

/// External tool error (objcopy/ar invocation failed)
pub const EXIT_TOOL_ERROR: i32 = 108;
