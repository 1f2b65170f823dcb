//! Artifact emission
//!
//! Turns a planned family into firmware build inputs: staged ELF
//! objects in build/roms.a, the generated C descriptor table, and at
//! the end of the run the linker directives sizing the flash regions.

pub mod covers;
pub mod linker;
pub mod objects;
pub mod tables;

use crate::catalog::RomImage;
use crate::exceptions::Result;
use crate::pack::family::FamilyPolicy;
use crate::pack::layout::FamilyPlan;
use objects::ObjectTool;
use std::path::Path;
use tables::TableEntry;

/// External per-image metadata probes, e.g. the NES/MSX mapper
/// database lookups. Called for every published image; implementations
/// branch on `image.family`.
pub type MapperFn = dyn Fn(&RomImage) -> Result<u32>;
pub type GameConfigFn = dyn Fn(&RomImage) -> Result<u32>;

/// Hardware control-profile wildcard, "use the default mapping".
const GAME_CONFIG_DEFAULT: u32 = 0xff;

/// Everything family emission needs from the run.
pub struct EmitContext<'a> {
    pub tables_dir: &'a Path,
    pub build_dir: &'a Path,
    pub object_tool: &'a dyn ObjectTool,
    pub coverflow: bool,
    pub cover_width: u32,
    pub cover_height: u32,
    pub mapper_fn: Option<&'a MapperFn>,
    pub game_config_fn: Option<&'a GameConfigFn>,
}

impl std::fmt::Debug for EmitContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitContext")
            .field("tables_dir", &self.tables_dir)
            .field("build_dir", &self.build_dir)
            .field("coverflow", &self.coverflow)
            .field("cover_width", &self.cover_width)
            .field("cover_height", &self.cover_height)
            .finish_non_exhaustive()
    }
}

/// Stage one family's payloads and write its descriptor table. Covers
/// must already be prepared (`image.art_size` filled in). Families
/// with no published images still get a table file so the firmware
/// source list stays fixed.
pub fn emit_family(
    ctx: &EmitContext<'_>,
    policy: &FamilyPolicy,
    images: &[RomImage],
    plan: &FamilyPlan,
) -> Result<()> {
    let mut file = tables::system_proto(policy.variable_name);
    let mut body = String::new();
    let roms_name = format!("{}_roms", policy.folder);

    for entry in &plan.entries {
        let image = &images[entry.image_index];

        let symbol = objects::stage_into_archive(
            ctx.object_tool,
            ctx.build_dir,
            image.stored_path(),
            None,
            policy.byte_swap,
        )?;
        file.push_str(&tables::extern_decl(&symbol));

        let img_symbol = if ctx.coverflow && image.art_size > 0 {
            let symbol = objects::stage_into_archive(
                ctx.object_tool,
                ctx.build_dir,
                &image.cover_path(),
                Some(&image.extension),
                false,
            )?;
            file.push_str(&tables::extern_decl(&symbol));
            Some(symbol)
        } else {
            None
        };

        let save_name = if image.save_enabled {
            let name = format!("{}{}", policy.save_prefix, entry.image_index);
            file.push_str(&tables::save_array(&name, entry.save_array_len));
            Some(name)
        } else {
            None
        };

        let mapper = match ctx.mapper_fn {
            Some(f) => f(image)?,
            None => 0,
        };
        let game_config = match ctx.game_config_fn {
            Some(f) => f(image)?,
            None => GAME_CONFIG_DEFAULT,
        };

        body.push_str(&tables::rom_entry(&TableEntry {
            id: entry.id,
            name: &image.name,
            extension: image.stored_extension(),
            symbol: &symbol,
            size: image.stored_size(),
            img_symbol: img_symbol.as_deref(),
            img_size: image.art_size,
            save_name: save_name.as_deref(),
            region: tables::region_for(&image.stem),
            system: policy.variable_name,
            mapper,
            game_config,
        }));
    }

    file.push_str(&tables::rom_entries(&roms_name, &body, plan.entries.len()));
    file.push_str(&tables::system_struct(
        policy.variable_name,
        policy.system_name,
        &roms_name,
        policy.folder,
        ctx.cover_width,
        ctx.cover_height,
        plan.entries.len(),
    ));

    std::fs::create_dir_all(ctx.tables_dir)?;
    std::fs::write(ctx.tables_dir.join(policy.table_file), file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::family::{Family, FamilyPolicy};
    use crate::pack::layout::{LayoutTotals, plan_family};
    use objects::testutil::RecordingTool;
    use std::fs;
    use std::path::PathBuf;

    fn image(name: &str, size: u64, save: bool) -> RomImage {
        RomImage {
            family: Family::MasterSystem,
            name: name.to_string(),
            stem: name.to_string(),
            path: PathBuf::from(format!("roms/sms/{name}.sms")),
            extension: "sms".to_string(),
            publish: true,
            save_enabled: save,
            size,
            art_size: 0,
            packed: None,
        }
    }

    #[test]
    fn test_emit_family_writes_table_and_stages_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let policy = FamilyPolicy::for_family(Family::MasterSystem);
        let images = vec![image("Alpha (Europe)", 100, true), image("Beta", 200, false)];

        let mut totals = LayoutTotals::new();
        let plan = plan_family(&images, policy, &mut totals, None).unwrap();

        let tool = RecordingTool::default();
        let ctx = EmitContext {
            tables_dir: tmp.path(),
            build_dir: tmp.path(),
            object_tool: &tool,
            coverflow: false,
            cover_width: 128,
            cover_height: 96,
            mapper_fn: None,
            game_config_fn: None,
        };
        emit_family(&ctx, policy, &images, &plan).unwrap();

        let table = fs::read_to_string(tmp.path().join("sms_roms.c")).unwrap();
        assert!(table.contains("extern const rom_system_t sms_system;"));
        assert!(table.contains(".name = \"Alpha (Europe)\","));
        assert!(table.contains(".region = REGION_PAL,"));
        assert!(table.contains("SAVE_SMS_0[61440]"));
        assert!(table.contains(".save_address = NULL,"));
        assert!(table.contains("const uint32_t sms_roms_count = 2;"));

        assert_eq!(tool.staged.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_family_still_writes_table() {
        let tmp = tempfile::tempdir().unwrap();
        let policy = FamilyPolicy::for_family(Family::PcEngine);
        let tool = RecordingTool::default();
        let ctx = EmitContext {
            tables_dir: tmp.path(),
            build_dir: tmp.path(),
            object_tool: &tool,
            coverflow: false,
            cover_width: 128,
            cover_height: 96,
            mapper_fn: None,
            game_config_fn: None,
        };
        emit_family(&ctx, policy, &[], &FamilyPlan::default()).unwrap();

        let table = fs::read_to_string(tmp.path().join("pce_roms.c")).unwrap();
        assert!(table.contains("const uint32_t pce_roms_count = 0;"));
    }

    #[test]
    fn test_byte_swap_family_staged_with_swap() {
        let tmp = tempfile::tempdir().unwrap();
        let policy = FamilyPolicy::for_family(Family::Genesis);
        let mut md = image("Sonic", 100, false);
        md.family = Family::Genesis;
        md.path = PathBuf::from("roms/md/Sonic.md");
        md.extension = "md".to_string();
        let images = vec![md];

        let mut totals = LayoutTotals::new();
        let plan = plan_family(&images, policy, &mut totals, None).unwrap();

        let tool = RecordingTool::default();
        let ctx = EmitContext {
            tables_dir: tmp.path(),
            build_dir: tmp.path(),
            object_tool: &tool,
            coverflow: false,
            cover_width: 128,
            cover_height: 96,
            mapper_fn: None,
            game_config_fn: None,
        };
        emit_family(&ctx, policy, &images, &plan).unwrap();

        let staged = tool.staged.lock().unwrap();
        assert!(staged[0].2, "Genesis payloads must be byte swapped");
    }
}
