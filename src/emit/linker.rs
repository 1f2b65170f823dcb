//! Linker directives and build configuration
//!
//! The firmware link consumes three tiny .ld fragments sizing the
//! save, off-screen save and decompression-cache regions, plus a
//! config.h naming the enabled cores. Files are only rewritten when
//! their content changes so an unchanged packing run does not trigger
//! a full firmware relink.

use crate::exceptions::Result;
use crate::pack::layout::LayoutTotals;
use log::debug;
use std::fs;
use std::path::Path;

/// Write `data` to `path` unless the file already holds exactly that
/// content. Returns whether the file was written.
pub fn write_if_changed(path: &Path, data: &str) -> Result<bool> {
    if let Ok(old) = fs::read_to_string(path) {
        if old == data {
            debug!("{} unchanged", path.display());
            return Ok(false);
        }
    }
    fs::write(path, data)?;
    Ok(true)
}

/// Emit the region-size directives and config.h from the finished run
/// totals. `defines` carries one `ENABLE_EMULATOR_*` line per family
/// that discovered images, in processing order.
pub fn write_directives(
    build_dir: &Path,
    totals: &LayoutTotals,
    off_saveflash: bool,
    defines: &[&str],
) -> Result<()> {
    write_if_changed(
        &build_dir.join("saveflash.ld"),
        &format!("__SAVEFLASH_LENGTH__ = {};\n", totals.save_bytes),
    )?;

    // The off-screen save region holds one active save state, sized by
    // the largest region any image needs.
    let off_length = if off_saveflash {
        totals.max_save_region
    } else {
        0
    };
    write_if_changed(
        &build_dir.join("offsaveflash.ld"),
        &format!("__OFFSAVEFLASH_LENGTH__ = {off_length};\n"),
    )?;

    write_if_changed(
        &build_dir.join("cacheflash.ld"),
        &format!("__CACHEFLASH_LENGTH__ = {};\n", totals.max_cache_rom),
    )?;

    let mut config = String::new();
    for define in defines {
        config.push_str(&format!("#define {define}\n"));
    }
    config.push_str(&format!("#define ROM_COUNT {}\n", totals.next_id));
    write_if_changed(&build_dir.join("config.h"), &config)?;

    Ok(())
}
