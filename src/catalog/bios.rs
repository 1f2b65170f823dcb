//! BIOS verification
//!
//! The MSX core only boots with a known-good BIOS set, so packing MSX
//! images first verifies every file against its SHA-1 digest. The
//! PANASONICDISK_ variant is produced here by patching the second FDD
//! controller off (frees RAM some games need); pressing CTRL at boot
//! would do the same, but not every game tolerates the patched BIOS,
//! so both variants are kept.

use crate::exceptions::{Result, RomPackError};
use log::info;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Required MSX BIOS files and their SHA-1 digests.
const MSX_BIOS_DIGESTS: &[(&str, &str)] = &[
    ("MSX2P.rom", "e90f80a61d94c617850c415e12ad70ac41e66bb7"),
    ("MSX2PEXT.rom", "fe0254cbfc11405b79e7c86c7769bd6322b04995"),
    ("MSX2PMUS.rom", "6354ccc5c100b1c558c9395fa8c00784d2e9b0a3"),
    ("MSX2.rom", "6103b39f1e38d1aa2d84b1c3219c44f1abb5436e"),
    ("MSX2EXT.rom", "5c1f9c7fb655e43d38e5dd1fcc6b942b2ff68b02"),
    ("MSX.rom", "e998f0c441f4f1800ef44e42cd1659150206cf79"),
];

const PANASONICDISK_ORIGINAL: &str = "7ed7c55e0359737ac5e68d38cb6903f9e5d7c2b6";
const PANASONICDISK_PATCHED: &str = "b9bce28fb74223ea902f82ebd107279624cf2aba";

/// Offset of the FDD-count byte inside PANASONICDISK.rom.
const FDD_COUNT_OFFSET: u64 = 0x17ec;

/// SHA-1 hex digest of a file, or None when it does not exist.
fn sha1_for_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; 16 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(Some(hex::encode(hasher.finalize())))
}

fn write_fdd_count(path: &Path, value: u8) -> Result<()> {
    let mut file = fs::OpenOptions::new().read(true).write(true).open(path)?;
    file.seek(SeekFrom::Start(FDD_COUNT_OFFSET))?;
    file.write_all(&[value])?;
    Ok(())
}

fn bad_bios(bios_dir: &Path, name: &str) -> RomPackError {
    RomPackError::Config(format!(
        "Bad or missing {}, check {}/README.md for info",
        bios_dir.join(name).display(),
        bios_dir.display()
    ))
}

/// Verify the MSX BIOS set under `roms/msx_bios/`, producing the
/// patched PANASONICDISK_ variant as needed. Runs only when the MSX
/// family discovered images.
pub fn verify_msx_bios(roms_dir: &Path) -> Result<()> {
    let bios_dir = roms_dir.join("msx_bios");

    for (name, digest) in MSX_BIOS_DIGESTS {
        if sha1_for_file(&bios_dir.join(name))?.as_deref() != Some(*digest) {
            return Err(bad_bios(&bios_dir, name));
        }
    }

    // Earlier releases patched PANASONICDISK.rom in place; revert that
    // so the pristine file and the patched copy stay distinct.
    let disk = bios_dir.join("PANASONICDISK.rom");
    if sha1_for_file(&disk)?.as_deref() == Some(PANASONICDISK_PATCHED) {
        info!("Reverting patch on {}", disk.display());
        write_fdd_count(&disk, 0x02)?;
    }
    if sha1_for_file(&disk)?.as_deref() != Some(PANASONICDISK_ORIGINAL) {
        return Err(bad_bios(&bios_dir, "PANASONICDISK.rom"));
    }

    let patched = bios_dir.join("PANASONICDISK_.rom");
    if sha1_for_file(&patched)?.as_deref() != Some(PANASONICDISK_PATCHED) {
        fs::copy(&disk, &patched)?;
        if sha1_for_file(&patched)?.as_deref() == Some(PANASONICDISK_ORIGINAL) {
            info!(
                "Patching {} to disable 2nd FDD controller (= more free RAM)",
                patched.display()
            );
            write_fdd_count(&patched, 0x00)?;
        } else {
            return Err(bad_bios(&bios_dir, "PANASONICDISK.rom"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_bios_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("msx_bios")).unwrap();
        let err = verify_msx_bios(tmp.path()).unwrap_err();
        assert!(matches!(err, RomPackError::Config(_)));
        assert!(err.to_string().contains("MSX2P.rom"));
    }

    #[test]
    fn test_wrong_digest_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let bios = tmp.path().join("msx_bios");
        std::fs::create_dir(&bios).unwrap();
        std::fs::write(bios.join("MSX2P.rom"), b"not a bios").unwrap();
        let err = verify_msx_bios(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("MSX2P.rom"));
    }

    #[test]
    fn test_sha1_for_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(sha1_for_file(&tmp.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn test_sha1_digest_matches_known_vector() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("abc");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            sha1_for_file(&path).unwrap().unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }
}
