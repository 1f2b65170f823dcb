// src/pack/defaults.rs
// Centralized tunable defaults. These encode hardware assumptions of
// the target handheld (cache sizes, partition alignment) and are all
// overridable through PackOptions / the builder CLI.

/// Number of adaptive banks the runtime can keep decompressed in cache
/// at once; the speed-priority strategy spends this as its credit.
pub const DEFAULT_COMPRESSION_CREDIT: usize = 26;

/// Compressed length at or below which an adaptive bank is considered
/// empty and kept compressed regardless of the credit budget.
pub const DEFAULT_NEAR_EMPTY_THRESHOLD: usize = 98;

/// Save regions are aligned up to flash erase-page granularity.
pub const SAVE_ALIGNMENT: u64 = 4 * 1024;

/// External flash capacity assumed when none is given.
pub const DEFAULT_FLASH_SIZE: u64 = 1024 * 1024;

// Cover art bounds. Width/height are clamped into these ranges and the
// pixel budget is a hard limit of the menu's decode buffer.
pub const COVER_MIN_WIDTH: u32 = 64;
pub const COVER_MAX_WIDTH: u32 = 180;
pub const COVER_MIN_HEIGHT: u32 = 64;
pub const COVER_MAX_HEIGHT: u32 = 136;
pub const COVER_MAX_PIXELS: u32 = 18_600;

pub const DEFAULT_COVER_WIDTH: u32 = 128;
pub const DEFAULT_COVER_HEIGHT: u32 = 96;
pub const DEFAULT_JPG_QUALITY: u8 = 90;

// Default save-region sizes per family folder, in bytes. Families with
// a header probe or an external estimator override these per image.
pub const SAVE_SIZE_NES: u32 = 24 * 1024; // only when using nofrendo
pub const SAVE_SIZE_SMS: u32 = 60 * 1024;
pub const SAVE_SIZE_GG: u32 = 60 * 1024;
pub const SAVE_SIZE_COL: u32 = 60 * 1024;
pub const SAVE_SIZE_SG: u32 = 60 * 1024;
pub const SAVE_SIZE_PCE: u32 = 76 * 1024;
pub const SAVE_SIZE_MSX: u32 = 272 * 1024;
pub const SAVE_SIZE_GW: u32 = 4 * 1024;
pub const SAVE_SIZE_WSV: u32 = 28 * 1024;
pub const SAVE_SIZE_MD: u32 = 144 * 1024;
pub const SAVE_SIZE_A7800: u32 = 36 * 1024;
pub const SAVE_SIZE_AMSTRAD: u32 = 132 * 1024;
