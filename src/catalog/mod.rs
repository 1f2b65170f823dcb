//! Image catalog
//!
//! Enumerates candidate images per family folder and extension,
//! attaches the override-table metadata, and shadows raw files with
//! their pre-compressed counterparts. Produces the ordered image list
//! the compression engine and layout planner consume; those trust the
//! flags resolved here and never re-derive them.

pub mod bios;
pub mod romdefs;

use crate::exceptions::{Result, RomPackError};
use crate::pack::codec::CompressionMethod;
use crate::pack::engine::CompressionStatus;
use crate::pack::family::{Family, FamilyPolicy};
use glob::glob;
use log::{debug, info};
use romdefs::RomDefs;
use std::path::{Path, PathBuf};

/// Display-name suffix that disables save allocation, used by multi
/// disk games where only the first disk needs a save region.
const NO_SAVE_SUFFIX: &str = "_no_save";

/// Suffixes stripped when recovering an image's stem from a packed or
/// converted file name.
const PACKED_SUFFIXES: &[&str] = &["lzma", "cdk"];

/// How a published image ended the run.
#[derive(Debug, Clone)]
pub struct PackedRom {
    /// Container file written next to the source image
    pub path: PathBuf,
    pub size: u64,
    pub status: CompressionStatus,
}

/// One discovered image. Immutable after discovery except for the
/// compression result and cover-art size filled in by the pipeline.
#[derive(Debug, Clone)]
pub struct RomImage {
    pub family: Family,
    /// Display name (override table, else the file stem)
    pub name: String,
    /// File stem with any packed suffix removed
    pub stem: String,
    pub path: PathBuf,
    /// Lowercase extension of `path`, without the dot
    pub extension: String,
    pub publish: bool,
    pub save_enabled: bool,
    /// Byte length of `path`
    pub size: u64,
    /// Encoded cover-art byte length, 0 when absent
    pub art_size: u64,
    /// Filled by the compression engine for freshly packed images
    pub packed: Option<PackedRom>,
}

impl RomImage {
    /// Path of the original uncompressed image, with any packed
    /// suffix stripped; header probes read this file.
    pub fn raw_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        while let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if PACKED_SUFFIXES.contains(&ext.to_lowercase().as_str()) {
                path.set_extension("");
            } else {
                break;
            }
        }
        path
    }

    /// Path of the file the firmware will actually store.
    pub fn stored_path(&self) -> &Path {
        match &self.packed {
            Some(packed) => &packed.path,
            None => &self.path,
        }
    }

    /// Byte length of the stored file.
    pub fn stored_size(&self) -> u64 {
        match &self.packed {
            Some(packed) => packed.size,
            None => self.size,
        }
    }

    /// Extension the generated descriptor table carries; packed images
    /// advertise the container suffix so the runtime picks the
    /// decompressing loader.
    pub fn stored_extension(&self) -> &str {
        match self.stored_path().extension().and_then(|e| e.to_str()) {
            Some(ext) => ext,
            None => &self.extension,
        }
    }

    /// Whether `path` already is a compressed counterpart produced by
    /// an earlier run.
    pub fn is_precompressed(&self, method: CompressionMethod) -> bool {
        self.path
            .to_string_lossy()
            .to_lowercase()
            .ends_with(method.suffix())
    }

    /// Destination of this image's encoded cover art.
    pub fn cover_path(&self) -> PathBuf {
        self.path.with_file_name(format!("{}.img", self.stem))
    }
}

/// Stem of a discovered file with packed suffixes stripped, so the
/// override tables key the same entry for raw and packed forms.
fn image_stem(path: &Path) -> String {
    let mut path = path.to_path_buf();
    loop {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            break;
        };
        if PACKED_SUFFIXES.contains(&ext.to_lowercase().as_str()) {
            path.set_extension("");
        } else {
            path.set_extension("");
            break;
        }
    }
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find all images with one extension in a family folder, sorted by
/// file name. Missing folders yield an empty list.
pub fn find_images(
    roms_dir: &Path,
    policy: &FamilyPolicy,
    extension: &str,
    defs: &RomDefs,
    force_save: bool,
) -> Result<Vec<RomImage>> {
    let folder = roms_dir.join(policy.folder);
    if !folder.is_dir() {
        debug!("no {} folder, skipping", folder.display());
        return Ok(Vec::new());
    }

    let wanted = format!(".{}", extension.to_lowercase().trim_start_matches('.'));
    let mut files: Vec<PathBuf> = std::fs::read_dir(&folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_lowercase().ends_with(&wanted))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    let mut images = Vec::with_capacity(files.len());
    for path in files {
        let stem = image_stem(&path);
        let def = defs.get(&stem).cloned().unwrap_or_default();

        let mut name = def.name.unwrap_or_else(|| stem.clone());
        let mut save_enabled = def.enable_save.unwrap_or(false) || force_save;
        if let Some(trimmed) = name.strip_suffix(NO_SAVE_SUFFIX) {
            name = trimmed.to_string();
            save_enabled = false;
        }
        let publish = def.publish.unwrap_or(true);

        info!("Found rom {stem} will display name as: {name}");
        if !publish {
            info!("& will not Publish !");
        }

        let size = std::fs::metadata(&path)?.len();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        images.push(RomImage {
            family: policy.family,
            name,
            stem,
            path,
            extension,
            publish,
            save_enabled,
            size,
            art_size: 0,
            packed: None,
        });
    }
    Ok(images)
}

/// Discover a family's packing list: every configured extension, with
/// raw files dropped in favor of their pre-compressed counterparts,
/// sorted by display name for deterministic identifier assignment.
pub fn discover_family(
    roms_dir: &Path,
    policy: &FamilyPolicy,
    defs: &RomDefs,
    method: Option<CompressionMethod>,
    force_save: bool,
) -> Result<Vec<RomImage>> {
    let mut raw = Vec::new();
    for ext in policy.extensions {
        raw.extend(find_images(roms_dir, policy, ext, defs, force_save)?);
    }

    let mut counterparts = Vec::new();
    if let Some(method) = method {
        for ext in policy.extensions {
            let packed_ext = format!("{ext}{}", method.suffix());
            counterparts.extend(find_images(roms_dir, policy, &packed_ext, defs, force_save)?);
        }
    }

    let shadowed: std::collections::HashSet<String> =
        counterparts.iter().map(|c| c.name.clone()).collect();

    let mut images = counterparts;
    images.extend(raw.into_iter().filter(|r| !shadowed.contains(&r.name)));
    images.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(images)
}

/// Fatal guard: zip and 7z archives must be extracted by hand before
/// packing, otherwise their contents would silently be skipped.
pub fn scan_archives(roms_dir: &Path) -> Result<()> {
    let mut archives = Vec::new();
    for pattern in ["*/*.zip", "*/*.7z"] {
        let full = roms_dir.join(pattern);
        if let Ok(paths) = glob(&full.to_string_lossy()) {
            archives.extend(paths.filter_map(|p| p.ok()));
        }
    }

    if archives.is_empty() {
        return Ok(());
    }

    let listing = archives
        .iter()
        .map(|p| format!("    {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");
    Err(RomPackError::Config(format!(
        "zip and/or 7z rom files found. Please extract and delete them:\n{listing}"
    )))
}
