//! Layout planner
//!
//! Walks the per-family image lists in the fixed declared order,
//! hands out global identifiers, accumulates ROM/save/cover totals and
//! the worst-case region sizes, and performs the single end-of-run
//! capacity check against the storage device. The accumulator is
//! explicit state owned by the caller; nothing here is global.

use super::defaults::SAVE_ALIGNMENT;
use super::family::FamilyPolicy;
use super::savesize::{self, SaveSizeFn};
use crate::catalog::RomImage;
use crate::exceptions::{Result, RomPackError};
use log::{debug, info};
use std::path::Path;

/// Run-wide accumulator. Mutated once per published image, read at the
/// end of the run to emit the region-size directives.
#[derive(Debug, Default)]
pub struct LayoutTotals {
    pub rom_bytes: u64,
    pub save_bytes: u64,
    pub art_bytes: u64,
    /// Next global identifier; also the published-image count
    pub next_id: u32,
    /// Largest single aligned save region seen; sizes the shared "hot"
    /// save partition, which holds one active save state at a time
    pub max_save_region: u64,
    /// Largest single raw image among cache-sharing families; sizes
    /// the shared decompression cache partition
    pub max_cache_rom: u64,
}

impl LayoutTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined bytes the storage device must hold.
    pub fn combined(&self) -> u64 {
        self.rom_bytes + self.save_bytes + self.art_bytes
    }
}

/// Planner output for one published image.
#[derive(Debug)]
pub struct PlannedRom {
    pub id: u32,
    /// Index into the family's image list
    pub image_index: usize,
    /// Aligned save-region size, 0 when save is disabled
    pub save_size: u64,
    /// Estimated size before alignment; the generated save array is
    /// declared at this length and aligned by attribute
    pub save_array_len: u32,
}

/// Planner output for one family pass.
#[derive(Debug, Default)]
pub struct FamilyPlan {
    pub entries: Vec<PlannedRom>,
    pub rom_bytes: u64,
    pub save_bytes: u64,
    pub art_bytes: u64,
}

/// Round `value` up to a multiple of `align`.
pub fn align_up(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}

/// Size of the image the decompression cache must hold: the raw form,
/// even when a packed counterpart is what gets stored.
fn raw_size(image: &RomImage) -> u64 {
    if image.packed.is_some() {
        return image.size;
    }
    let raw = image.raw_path();
    if raw != image.path {
        if let Ok(meta) = std::fs::metadata(&raw) {
            return meta.len();
        }
    }
    image.size
}

/// Plan one family: assign identifiers to its published images in
/// list order (the catalog sorted them by name) and fold their sizes
/// into the run totals. Unpublished images are skipped entirely: no
/// identifier, no storage, no table row.
pub fn plan_family(
    images: &[RomImage],
    policy: &FamilyPolicy,
    totals: &mut LayoutTotals,
    save_estimator: Option<&SaveSizeFn>,
) -> Result<FamilyPlan> {
    let mut plan = FamilyPlan::default();

    for (index, image) in images.iter().enumerate() {
        if !image.publish {
            debug!("{}: unpublished, no identifier", image.name);
            continue;
        }

        let id = totals.next_id;
        totals.next_id += 1;

        let (save_size, save_array_len) = if image.save_enabled {
            let estimated = savesize::estimate(image, policy, save_estimator)?;
            (align_up(u64::from(estimated), SAVE_ALIGNMENT), estimated)
        } else {
            (0, 0)
        };

        plan.rom_bytes += image.stored_size();
        plan.save_bytes += save_size;
        plan.art_bytes += image.art_size;
        if save_size > totals.max_save_region {
            totals.max_save_region = save_size;
        }
        if policy.shares_rom_cache {
            let raw = raw_size(image);
            if raw > totals.max_cache_rom {
                totals.max_cache_rom = raw;
            }
        }

        plan.entries.push(PlannedRom {
            id,
            image_index: index,
            save_size,
            save_array_len,
        });
    }

    totals.rom_bytes += plan.rom_bytes;
    totals.save_bytes += plan.save_bytes;
    totals.art_bytes += plan.art_bytes;

    debug!(
        "{}: {} published, {} rom bytes, {} save bytes",
        policy.folder,
        plan.entries.len(),
        plan.rom_bytes,
        plan.save_bytes
    );

    Ok(plan)
}

/// End-of-run terminal check, exactly once over the combined total:
/// partitions are carved from one shared device, so per-family checks
/// would miss the overflow. On overflow the staged object archive is
/// removed so the invoking build re-runs the packer next time.
pub fn check_capacity(totals: &LayoutTotals, flash_size: u64, build_dir: &Path) -> Result<()> {
    let combined = totals.combined();

    if combined == 0 {
        return Err(RomPackError::NoImages);
    }

    info!(
        "Save data:\t{} bytes\nROM data:\t{} bytes\nROMs Cache:\t{} bytes\nCover images:\t{} bytes\nTotal:\t\t{} / {} bytes (plus some metadata).",
        totals.save_bytes, totals.rom_bytes, totals.max_cache_rom, totals.art_bytes, combined, flash_size
    );

    if combined > flash_size {
        let archive = build_dir.join("roms.a");
        if archive.exists() {
            let _ = std::fs::remove_file(&archive);
        }
        return Err(RomPackError::StorageOverflow {
            needed: combined,
            capacity: flash_size,
        });
    }

    Ok(())
}
