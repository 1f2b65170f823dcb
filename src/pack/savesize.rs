//! Save-size estimation
//!
//! Most families reserve a fixed save region; the Game Boy family
//! probes the cartridge header, and families wired to an external
//! mapper tool go through a caller-supplied estimator.

use super::family::{FamilyPolicy, SaveSizeSource};
use crate::catalog::RomImage;
use crate::exceptions::{Result, RomPackError};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// External estimator callback, e.g. the NES mapper tool.
pub type SaveSizeFn = dyn Fn(&RomImage) -> Result<u32>;

/// Resolve the save-region size for one image, before alignment.
pub fn estimate(
    image: &RomImage,
    policy: &FamilyPolicy,
    external: Option<&SaveSizeFn>,
) -> Result<u32> {
    match policy.save_source {
        SaveSizeSource::Fixed => Ok(policy.default_save_size),
        SaveSizeSource::GameBoyHeader => gameboy_save_size(&image.raw_path()),
        SaveSizeSource::External => match external {
            Some(f) => f(image),
            None => Ok(policy.default_save_size),
        },
    }
}

/// Cartridge RAM size lookup by the header code at 0x149, in 8 KiB
/// units.
const GB_CART_RAM_BANKS: [u32; 6] = [1, 1, 1, 4, 16, 8];

/// Compute a Game Boy image's save size from its cartridge header:
/// 4 KiB of machine state, work/video RAM pages depending on the CGB
/// flag at 0x143, plus cartridge RAM per the code at 0x149.
pub fn gameboy_save_size(path: &Path) -> Result<u32> {
    let mut file = File::open(path)?;
    let mut total: u32 = 4096;

    let mut byte = [0u8; 1];
    file.seek(SeekFrom::Start(0x143))?;
    file.read_exact(&mut byte)?;
    let cgb = byte[0];

    // 0x80 = color-capable, 0xC0 = color-only
    if cgb & 0x80 != 0 || cgb == 0xC0 {
        // work RAM banks 0-7 plus two video RAM banks
        total += 8 * 4096;
        total += 4 * 4096;
    } else {
        // work RAM banks 0-1, one video RAM bank
        total += 2 * 4096;
        total += 2 * 4096;
    }

    file.seek(SeekFrom::Start(0x149))?;
    file.read_exact(&mut byte)?;
    let code = byte[0] as usize;
    let banks = GB_CART_RAM_BANKS.get(code).ok_or_else(|| {
        RomPackError::Codec(format!(
            "{}: invalid cartridge RAM size code {:#x}",
            path.display(),
            code
        ))
    })?;
    total += banks * 8 * 1024;

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fake_cart(cgb: u8, ram_code: u8) -> tempfile::NamedTempFile {
        let mut rom = vec![0u8; 0x150];
        rom[0x143] = cgb;
        rom[0x149] = ram_code;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&rom).unwrap();
        file
    }

    #[test]
    fn test_classic_cart_no_ram() {
        let file = fake_cart(0x00, 0);
        // 4 KiB state + 2 work + 2 video pages + one 8 KiB RAM bank
        assert_eq!(
            gameboy_save_size(file.path()).unwrap(),
            4096 + 4 * 4096 + 8 * 1024
        );
    }

    #[test]
    fn test_color_cart_large_ram() {
        let file = fake_cart(0xC0, 3);
        assert_eq!(
            gameboy_save_size(file.path()).unwrap(),
            4096 + 12 * 4096 + 4 * 8 * 1024
        );
    }

    #[test]
    fn test_invalid_ram_code_is_error() {
        let file = fake_cart(0x80, 9);
        assert!(gameboy_save_size(file.path()).is_err());
    }
}
