//! High-level packing API
//!
//! One entry point, `pack_firmware`, configured by `PackOptions` and
//! wired to the outside world through `Collaborators`. The builder
//! binary is a thin CLI shell over this module; embedders with their
//! own toolchain or artwork pipeline swap the collaborators.

use crate::emit::covers::CoverEncoder;
use crate::emit::objects::ObjectTool;
use crate::emit::{GameConfigFn, MapperFn};
use crate::exceptions::Result;
use crate::pack;
use crate::pack::codec::CompressionMethod;
use crate::pack::defaults::{
    DEFAULT_COMPRESSION_CREDIT, DEFAULT_FLASH_SIZE, DEFAULT_JPG_QUALITY,
    DEFAULT_NEAR_EMPTY_THRESHOLD,
};
use crate::pack::layout::LayoutTotals;
use crate::pack::savesize::SaveSizeFn;
use std::path::PathBuf;

/// Configuration for one packing run.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Root of the per-family image folders
    pub roms_dir: PathBuf,
    /// Staging area for objects, roms.a and the linker directives
    pub build_dir: PathBuf,
    /// Destination of the generated C descriptor tables
    pub tables_dir: PathBuf,
    /// External flash capacity in bytes
    pub flash_size: u64,
    /// None disables compression entirely
    pub method: Option<CompressionMethod>,
    /// Adaptive families: trade file size for zero cache churn
    pub speed_priority: bool,
    pub compression_credit: usize,
    pub near_empty_threshold: usize,
    /// Prepare and pack cover art
    pub coverflow: bool,
    pub jpg_quality: u8,
    /// Size the off-screen save region for the largest save state
    pub off_saveflash: bool,
    /// Allocate a save region for every image, not just the ones the
    /// override tables opt in
    pub force_save: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            roms_dir: PathBuf::from("roms"),
            build_dir: PathBuf::from("build"),
            tables_dir: PathBuf::from("Core/Src/retro-go"),
            flash_size: DEFAULT_FLASH_SIZE,
            method: None,
            speed_priority: false,
            compression_credit: DEFAULT_COMPRESSION_CREDIT,
            near_empty_threshold: DEFAULT_NEAR_EMPTY_THRESHOLD,
            coverflow: false,
            jpg_quality: DEFAULT_JPG_QUALITY,
            off_saveflash: false,
            force_save: true,
        }
    }
}

/// External services a run depends on. Only the object tool is
/// mandatory; the optional callbacks cover the family-specific
/// metadata probes.
pub struct Collaborators<'a> {
    pub object_tool: &'a dyn ObjectTool,
    pub cover_encoder: Option<&'a dyn CoverEncoder>,
    pub save_size_fn: Option<&'a SaveSizeFn>,
    pub mapper_fn: Option<&'a MapperFn>,
    pub game_config_fn: Option<&'a GameConfigFn>,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("cover_encoder", &self.cover_encoder.is_some())
            .field("save_size_fn", &self.save_size_fn.is_some())
            .field("mapper_fn", &self.mapper_fn.is_some())
            .field("game_config_fn", &self.game_config_fn.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Collaborators<'a> {
    pub fn new(object_tool: &'a dyn ObjectTool) -> Self {
        Collaborators {
            object_tool,
            cover_encoder: None,
            save_size_fn: None,
            mapper_fn: None,
            game_config_fn: None,
        }
    }
}

/// Result of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    pub totals: LayoutTotals,
}

/// Pack every discovered image into firmware build inputs.
pub fn pack_firmware(
    options: &PackOptions,
    collaborators: &Collaborators<'_>,
) -> Result<RunSummary> {
    pack::run(options, collaborators)
}
