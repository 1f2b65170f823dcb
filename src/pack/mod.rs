//! Packing pipeline
//!
//! Orchestrates one run: archive guard, per-family discovery,
//! compression, cover preparation, layout planning and artifact
//! emission in the fixed family order, then the terminal capacity
//! check and the linker directives.

pub mod codec;
pub mod constants;
pub mod defaults;
pub mod engine;
pub mod family;
pub mod layout;
pub mod savesize;

use crate::api::{Collaborators, PackOptions, RunSummary};
use crate::catalog::{self, RomImage, bios, romdefs};
use crate::emit::{self, EmitContext, covers, linker};
use crate::exceptions::Result;
use crate::pack::engine::{EngineOptions, Outcome};
use crate::pack::family::{ContainerKind, FAMILY_ORDER, Family, FamilyPolicy};
use crate::pack::layout::LayoutTotals;
use log::{debug, info};
use std::path::PathBuf;

/// Compress every published raw image of one family in place, writing
/// the container next to the source file. Pre-compressed counterparts
/// and oversized images pass through untouched.
fn compress_family(
    images: &mut [RomImage],
    policy: &FamilyPolicy,
    options: &PackOptions,
) -> Result<()> {
    let Some(method) = options.method else {
        return Ok(());
    };
    if matches!(policy.container, ContainerKind::None) {
        return Ok(());
    }

    let engine_options = EngineOptions {
        method,
        speed_priority: options.speed_priority,
        compression_credit: options.compression_credit,
        near_empty_threshold: options.near_empty_threshold,
    };

    for image in images.iter_mut() {
        if !image.publish || image.is_precompressed(method) {
            continue;
        }

        debug!("Compressing: {} / {}", policy.system_name, image.name);
        let data = std::fs::read(&image.path)?;
        match engine::compress_image(&image.name, &data, policy, &engine_options)? {
            Outcome::Skipped => {}
            Outcome::Packed(container) => {
                let mut os = image.path.clone().into_os_string();
                os.push(method.suffix());
                let path = PathBuf::from(os);
                std::fs::write(&path, &container.bytes)?;
                image.packed = Some(catalog::PackedRom {
                    path,
                    size: container.bytes.len() as u64,
                    status: container.status,
                });
            }
        }
    }
    Ok(())
}

/// Run the whole pipeline. Families are processed in the fixed
/// declared order so identifier assignment is reproducible.
pub fn run(options: &PackOptions, collaborators: &Collaborators<'_>) -> Result<RunSummary> {
    catalog::scan_archives(&options.roms_dir)?;

    std::fs::create_dir_all(options.build_dir.join("roms"))?;
    // recreated empty so a stale mapper table never leaks into the
    // firmware build
    std::fs::write(options.build_dir.join("mappers.h"), "")?;

    let global_defs = romdefs::load_global(&options.roms_dir);
    let mut totals = LayoutTotals::new();
    let mut defines: Vec<&str> = Vec::new();
    let mut nes_has_images = false;

    for policy in FAMILY_ORDER {
        let defs = romdefs::load_for_folder(&options.roms_dir, policy.folder, &global_defs);

        // FDS BIOS images ride along only when there are NES games
        let mut images = if policy.family == Family::NesBios && !nes_has_images {
            Vec::new()
        } else {
            catalog::discover_family(
                &options.roms_dir,
                policy,
                &defs,
                options.method,
                options.force_save,
            )?
        };

        if policy.family == Family::Msx && !images.is_empty() {
            bios::verify_msx_bios(&options.roms_dir)?;
        }

        compress_family(&mut images, policy, options)?;

        let (cover_width, cover_height) =
            covers::clamp_cover_geometry(defs.cover_width, defs.cover_height)?;
        if options.coverflow {
            if let Some(encoder) = collaborators.cover_encoder {
                for image in images.iter_mut().filter(|i| i.publish) {
                    covers::prepare_cover(
                        encoder,
                        image,
                        cover_width,
                        cover_height,
                        options.jpg_quality,
                    )?;
                }
            }
        }

        let plan = layout::plan_family(&images, policy, &mut totals, collaborators.save_size_fn)?;

        let ctx = EmitContext {
            tables_dir: &options.tables_dir,
            build_dir: &options.build_dir,
            object_tool: collaborators.object_tool,
            coverflow: options.coverflow,
            cover_width,
            cover_height,
            mapper_fn: collaborators.mapper_fn,
            game_config_fn: collaborators.game_config_fn,
        };
        emit::emit_family(&ctx, policy, &images, &plan)?;

        if plan.rom_bytes > 0 {
            if policy.family == Family::Nes {
                nes_has_images = true;
            }
            if let Some(define) = policy.enable_define {
                defines.push(define);
            }
        }
    }

    layout::check_capacity(&totals, options.flash_size, &options.build_dir)?;
    linker::write_directives(
        &options.build_dir,
        &totals,
        options.off_saveflash,
        &defines,
    )?;

    info!("Packed {} roms", totals.next_id);
    Ok(RunSummary { totals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::objects::testutil::RecordingTool;
    use std::fs;
    use std::path::Path;

    fn gb_cart() -> Vec<u8> {
        let mut rom = vec![0u8; 0x8000];
        rom[0x143] = 0x00;
        rom[0x149] = 0;
        rom
    }

    fn options_at(root: &Path) -> PackOptions {
        PackOptions {
            roms_dir: root.join("roms"),
            build_dir: root.join("build"),
            tables_dir: root.join("tables"),
            ..PackOptions::default()
        }
    }

    #[test]
    fn test_run_packs_one_gameboy_rom() {
        let tmp = tempfile::tempdir().unwrap();
        let gb = tmp.path().join("roms/gb");
        fs::create_dir_all(&gb).unwrap();
        fs::write(gb.join("Game.gb"), gb_cart()).unwrap();

        let tool = RecordingTool::default();
        let options = options_at(tmp.path());
        let summary = run(&options, &Collaborators::new(&tool)).unwrap();

        assert_eq!(summary.totals.next_id, 1);
        let config = fs::read_to_string(tmp.path().join("build/config.h")).unwrap();
        assert!(config.contains("#define ENABLE_EMULATOR_GB\n"));
        assert!(config.contains("#define ROM_COUNT 1\n"));

        let table = fs::read_to_string(tmp.path().join("tables/gb_roms.c")).unwrap();
        assert!(table.contains(".name = \"Game\","));
        // saves default on; classic cart header gives 28 KiB
        assert!(table.contains("SAVE_GB_0[28672]"));

        // every family table exists even when empty
        assert!(tmp.path().join("tables/pce_roms.c").exists());
        assert!(tmp.path().join("build/mappers.h").exists());
    }

    #[test]
    fn test_run_with_no_roms_fails() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("roms")).unwrap();

        let tool = RecordingTool::default();
        let options = options_at(tmp.path());
        let err = run(&options, &Collaborators::new(&tool)).unwrap_err();
        assert!(matches!(err, crate::exceptions::RomPackError::NoImages));
    }

    #[test]
    fn test_run_compresses_eligible_rom() {
        let tmp = tempfile::tempdir().unwrap();
        let pce = tmp.path().join("roms/pce");
        fs::create_dir_all(&pce).unwrap();
        fs::write(pce.join("Shmup.pce"), vec![0x42u8; 64 * 1024]).unwrap();

        let tool = RecordingTool::default();
        let mut options = options_at(tmp.path());
        options.method = Some(codec::CompressionMethod::Lzma);
        run(&options, &Collaborators::new(&tool)).unwrap();

        assert!(pce.join("Shmup.pce.lzma").exists());
        let table = fs::read_to_string(tmp.path().join("tables/pce_roms.c")).unwrap();
        assert!(table.contains(".ext = \"lzma\","));
    }

    #[test]
    fn test_run_overflow_leaves_directives_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let gw = tmp.path().join("roms/gw");
        fs::create_dir_all(&gw).unwrap();
        fs::write(gw.join("Ball.gw"), vec![0u8; 4096]).unwrap();

        // directives from an earlier successful run
        let build = tmp.path().join("build");
        fs::create_dir_all(&build).unwrap();
        fs::write(build.join("saveflash.ld"), "__SAVEFLASH_LENGTH__ = 4096;\n").unwrap();

        let tool = RecordingTool::default();
        let mut options = options_at(tmp.path());
        options.flash_size = 1024;
        let err = run(&options, &Collaborators::new(&tool)).unwrap_err();
        assert!(matches!(
            err,
            crate::exceptions::RomPackError::StorageOverflow { .. }
        ));
        assert_eq!(
            fs::read_to_string(build.join("saveflash.ld")).unwrap(),
            "__SAVEFLASH_LENGTH__ = 4096;\n"
        );
    }
}
