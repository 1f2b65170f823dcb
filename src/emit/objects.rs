//! Object staging
//!
//! Each stored image and cover becomes an ELF object whose data lands
//! in the external-flash section, collected into build/roms.a for the
//! firmware link. The cross-binutils live behind a trait so the
//! pipeline is testable without an ARM toolchain on PATH.

use crate::exceptions::{Result, RomPackError};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Section the image payload is linked into.
const FLASH_SECTION: &str = ".data=.extflash_game_rom,alloc,load,readonly,data,contents";

/// Stages binary files as linkable objects.
pub trait ObjectTool {
    /// Convert `source` into the ELF object `object`. `byte_swap`
    /// reverses 16-bit pairs for big-endian-bus cores.
    fn stage(&self, source: &Path, object: &Path, byte_swap: bool) -> Result<()>;

    /// Append `object` to the archive at `archive`.
    fn archive(&self, archive: &Path, object: &Path) -> Result<()>;
}

/// Replace every non-alphanumeric byte with `_`, the way binutils
/// derives `_binary_*` symbols from file names.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Linker symbol objcopy assigns to the start of `source`'s payload.
pub fn symbol_for(source: &Path) -> String {
    let parent = source
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("_binary_{}_start", sanitize(&format!("{parent}/{name}")))
}

/// Staging path of `source`'s object under build/roms/. Cover objects
/// get the image extension appended so a rom and its cover never
/// collide.
pub fn object_path(build_dir: &Path, source: &Path, qualifier: Option<&str>) -> PathBuf {
    let name = source
        .file_name()
        .map(|n| sanitize(&n.to_string_lossy()))
        .unwrap_or_default();
    let file = match qualifier {
        Some(q) => format!("{name}_{q}.o"),
        None => format!("{name}.o"),
    };
    build_dir.join("roms").join(file)
}

/// The GNU ARM binutils, resolved from GCC_PATH when set.
#[derive(Debug)]
pub struct ArmObjectTool;

impl ArmObjectTool {
    fn tool(name: &str) -> PathBuf {
        match std::env::var_os("GCC_PATH") {
            Some(prefix) => Path::new(&prefix).join(name),
            None => PathBuf::from(name),
        }
    }

    fn run(mut command: Command) -> Result<()> {
        debug!("running {command:?}");
        let output = command
            .output()
            .map_err(|e| RomPackError::Tool(format!("failed to spawn {command:?}: {e}")))?;
        if !output.status.success() {
            return Err(RomPackError::Tool(format!(
                "{command:?} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl ObjectTool for ArmObjectTool {
    fn stage(&self, source: &Path, object: &Path, byte_swap: bool) -> Result<()> {
        let mut command = Command::new(Self::tool("arm-none-eabi-objcopy"));
        command
            .arg("--rename-section")
            .arg(FLASH_SECTION)
            .args(["-I", "binary", "-O", "elf32-littlearm", "-B", "armv7e-m"]);
        if byte_swap {
            command.arg("--reverse-bytes=2");
        }
        command.arg(source).arg(object);
        Self::run(command)
    }

    fn archive(&self, archive: &Path, object: &Path) -> Result<()> {
        let mut command = Command::new(Self::tool("arm-none-eabi-ar"));
        command.arg("-cr").arg(archive).arg(object);
        Self::run(command)
    }
}

/// Stage `source` into the run archive and return its linker symbol.
pub fn stage_into_archive(
    tool: &dyn ObjectTool,
    build_dir: &Path,
    source: &Path,
    qualifier: Option<&str>,
    byte_swap: bool,
) -> Result<String> {
    let object = object_path(build_dir, source, qualifier);
    if let Some(parent) = object.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tool.stage(source, &object, byte_swap)?;
    tool.archive(&build_dir.join("roms.a"), &object)?;
    Ok(symbol_for(source))
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use std::sync::Mutex;

    /// Records staging calls instead of shelling out.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingTool {
        pub(crate) staged: Mutex<Vec<(PathBuf, PathBuf, bool)>>,
        pub(crate) archived: Mutex<Vec<PathBuf>>,
    }

    impl ObjectTool for RecordingTool {
        fn stage(&self, source: &Path, object: &Path, byte_swap: bool) -> Result<()> {
            self.staged
                .lock()
                .unwrap()
                .push((source.to_path_buf(), object.to_path_buf(), byte_swap));
            Ok(())
        }

        fn archive(&self, _archive: &Path, object: &Path) -> Result<()> {
            self.archived.lock().unwrap().push(object.to_path_buf());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::RecordingTool;
    use super::*;

    #[test]
    fn test_symbol_sanitizes_path() {
        let symbol = symbol_for(Path::new("roms/gb/Super Game (U).gb"));
        assert_eq!(symbol, "_binary_roms_gb_Super_Game__U__gb_start");
    }

    #[test]
    fn test_object_paths_for_rom_and_cover_differ() {
        let build = Path::new("build");
        let rom = object_path(build, Path::new("roms/gb/Game.gb"), None);
        let cover = object_path(build, Path::new("roms/gb/Game.img"), Some("gb"));
        assert_eq!(rom, Path::new("build/roms/Game_gb.o"));
        assert_eq!(cover, Path::new("build/roms/Game_img_gb.o"));
    }

    #[test]
    fn test_stage_into_archive_records_and_returns_symbol() {
        let tmp = tempfile::tempdir().unwrap();
        let tool = RecordingTool::default();
        let source = Path::new("roms/md/Sonic.md");

        let symbol =
            stage_into_archive(&tool, tmp.path(), source, None, true).unwrap();
        assert_eq!(symbol, "_binary_roms_md_Sonic_md_start");

        let staged = tool.staged.lock().unwrap();
        assert_eq!(staged.len(), 1);
        assert!(staged[0].2, "byte swap flag lost");
        assert_eq!(tool.archived.lock().unwrap().len(), 1);
    }
}
