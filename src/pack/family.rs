//! Family policy table
//!
//! One supported game system = one `FamilyPolicy` row. The engine and
//! the planner are written once against this table and never branch on
//! a family name; adding a system is a data change here, not a code
//! change elsewhere.

use super::constants::{
    ADAPTIVE_BANK_SIZE, BANKED_BANK_SIZE, MAX_COMPRESSED_A7800_SIZE, MAX_COMPRESSED_MSX_SIZE,
    MAX_COMPRESSED_NES_SIZE, MAX_COMPRESSED_PCE_SIZE, MAX_COMPRESSED_SG_COL_SIZE,
    MAX_COMPRESSED_WSV_SIZE,
};
use super::defaults::{
    SAVE_SIZE_A7800, SAVE_SIZE_AMSTRAD, SAVE_SIZE_COL, SAVE_SIZE_GG, SAVE_SIZE_GW, SAVE_SIZE_MD,
    SAVE_SIZE_MSX, SAVE_SIZE_NES, SAVE_SIZE_PCE, SAVE_SIZE_SG, SAVE_SIZE_SMS, SAVE_SIZE_WSV,
};

/// Supported system family identifiers, in the fixed processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    GameBoy,
    Nes,
    NesBios,
    MasterSystem,
    GameGear,
    Genesis,
    Colecovision,
    Sg1000,
    PcEngine,
    GameAndWatch,
    Msx,
    MsxBios,
    Supervision,
    Atari7800,
    AmstradCpc,
}

/// How a family's images are framed when compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Never compressed
    None,
    /// Whole file through the codec as one segment
    Whole,
    /// Fixed-size banks behind a magic + length-table header, so the
    /// runtime can seek to any bank's payload
    Banked { bank_size: usize },
    /// Fixed-size banks concatenated without a header; bank boundaries
    /// are implicit from the original bank size table, bank 0 always
    /// raw, compression-credit policy optional
    Adaptive { bank_size: usize },
}

/// Where a family's per-image save size comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveSizeSource {
    /// The family's fixed default
    Fixed,
    /// Probed from the Game Boy cartridge header
    GameBoyHeader,
    /// Computed by an external estimator callback; falls back to the
    /// fixed default when none is supplied
    External,
}

/// Per-family packing policy. Read-only for the whole run.
#[derive(Debug)]
pub struct FamilyPolicy {
    pub family: Family,
    /// Human-readable system name baked into the generated table
    pub system_name: &'static str,
    /// C identifier of the generated `rom_system_t`
    pub variable_name: &'static str,
    /// Folder under roms/ and key into the override tables
    pub folder: &'static str,
    /// Image extensions, lowercase, in discovery order
    pub extensions: &'static [&'static str],
    /// Generated source file name
    pub table_file: &'static str,
    /// Prefix of generated save-slot array identifiers
    pub save_prefix: &'static str,
    /// `config.h` define emitted when the family has images; BIOS
    /// pseudo-families have none
    pub enable_define: Option<&'static str>,
    pub container: ContainerKind,
    /// Images larger than this stay raw (runtime decompression buffer
    /// size); None = no cap
    pub max_compressible_size: Option<u64>,
    pub default_save_size: u32,
    pub save_source: SaveSizeSource,
    /// Family participates in the shared runtime decompression cache,
    /// which must fit its largest raw image
    pub shares_rom_cache: bool,
    /// Object staging must swap byte pairs (big-endian bus)
    pub byte_swap: bool,
}

/// The fixed, deterministic family processing order. Identifier
/// assignment and totals accumulation walk this table top to bottom.
pub static FAMILY_ORDER: &[FamilyPolicy] = &[
    FamilyPolicy {
        family: Family::GameBoy,
        system_name: "Nintendo Gameboy",
        variable_name: "gb_system",
        folder: "gb",
        extensions: &["gb", "gbc"],
        table_file: "gb_roms.c",
        save_prefix: "SAVE_GB_",
        enable_define: Some("ENABLE_EMULATOR_GB"),
        container: ContainerKind::Adaptive {
            bank_size: ADAPTIVE_BANK_SIZE,
        },
        max_compressible_size: None,
        default_save_size: 0,
        save_source: SaveSizeSource::GameBoyHeader,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Nes,
        system_name: "Nintendo Entertainment System",
        variable_name: "nes_system",
        folder: "nes",
        extensions: &["nes", "fds", "nsf"],
        table_file: "nes_roms.c",
        save_prefix: "SAVE_NES_",
        enable_define: Some("ENABLE_EMULATOR_NES"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_NES_SIZE),
        default_save_size: SAVE_SIZE_NES,
        save_source: SaveSizeSource::External,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::NesBios,
        system_name: "NES_BIOS",
        variable_name: "nes_bios",
        folder: "nes_bios",
        extensions: &["rom", "nes"],
        table_file: "nes_bios.c",
        save_prefix: "SAVE_NESB_",
        enable_define: None,
        container: ContainerKind::None,
        max_compressible_size: None,
        default_save_size: 0,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::MasterSystem,
        system_name: "Sega Master System",
        variable_name: "sms_system",
        folder: "sms",
        extensions: &["sms"],
        table_file: "sms_roms.c",
        save_prefix: "SAVE_SMS_",
        enable_define: Some("ENABLE_EMULATOR_SMS"),
        container: ContainerKind::Banked {
            bank_size: BANKED_BANK_SIZE,
        },
        max_compressible_size: None,
        default_save_size: SAVE_SIZE_SMS,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: true,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::GameGear,
        system_name: "Sega Game Gear",
        variable_name: "gg_system",
        folder: "gg",
        extensions: &["gg"],
        table_file: "gg_roms.c",
        save_prefix: "SAVE_GG_",
        enable_define: Some("ENABLE_EMULATOR_GG"),
        container: ContainerKind::Banked {
            bank_size: BANKED_BANK_SIZE,
        },
        max_compressible_size: None,
        default_save_size: SAVE_SIZE_GG,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: true,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Genesis,
        system_name: "Sega Genesis",
        variable_name: "md_system",
        folder: "md",
        extensions: &["md", "gen", "bin"],
        table_file: "md_roms.c",
        save_prefix: "SAVE_MD_",
        enable_define: Some("ENABLE_EMULATOR_MD"),
        container: ContainerKind::Banked {
            bank_size: BANKED_BANK_SIZE,
        },
        max_compressible_size: None,
        default_save_size: SAVE_SIZE_MD,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: true,
        byte_swap: true,
    },
    FamilyPolicy {
        family: Family::Colecovision,
        system_name: "Colecovision",
        variable_name: "col_system",
        folder: "col",
        extensions: &["col"],
        table_file: "col_roms.c",
        save_prefix: "SAVE_COL_",
        enable_define: Some("ENABLE_EMULATOR_COL"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_SG_COL_SIZE),
        default_save_size: SAVE_SIZE_COL,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Sg1000,
        system_name: "Sega SG-1000",
        variable_name: "sg1000_system",
        folder: "sg",
        extensions: &["sg"],
        table_file: "sg1000_roms.c",
        save_prefix: "SAVE_SG1000_",
        enable_define: Some("ENABLE_EMULATOR_SG1000"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_SG_COL_SIZE),
        default_save_size: SAVE_SIZE_SG,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::PcEngine,
        system_name: "PC Engine",
        variable_name: "pce_system",
        folder: "pce",
        extensions: &["pce"],
        table_file: "pce_roms.c",
        save_prefix: "SAVE_PCE_",
        enable_define: Some("ENABLE_EMULATOR_PCE"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_PCE_SIZE),
        default_save_size: SAVE_SIZE_PCE,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::GameAndWatch,
        system_name: "Game & Watch",
        variable_name: "gw_system",
        folder: "gw",
        extensions: &["gw"],
        table_file: "gw_roms.c",
        save_prefix: "SAVE_GW_",
        enable_define: Some("ENABLE_EMULATOR_GW"),
        container: ContainerKind::None,
        max_compressible_size: None,
        default_save_size: SAVE_SIZE_GW,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Msx,
        system_name: "MSX",
        variable_name: "msx_system",
        folder: "msx",
        extensions: &["rom", "mx1", "mx2", "dsk", "cdk"],
        table_file: "msx_roms.c",
        save_prefix: "SAVE_MSX_",
        enable_define: Some("ENABLE_EMULATOR_MSX"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_MSX_SIZE),
        default_save_size: SAVE_SIZE_MSX,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::MsxBios,
        system_name: "MSX_BIOS",
        variable_name: "msx_bios",
        folder: "msx_bios",
        extensions: &["rom"],
        table_file: "msx_bios.c",
        save_prefix: "SAVE_MSXB_",
        enable_define: None,
        container: ContainerKind::None,
        max_compressible_size: None,
        default_save_size: 0,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Supervision,
        system_name: "Watara Supervision",
        variable_name: "wsv_system",
        folder: "wsv",
        extensions: &["bin", "sv"],
        table_file: "wsv_roms.c",
        save_prefix: "SAVE_WSV_",
        enable_define: Some("ENABLE_EMULATOR_WSV"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_WSV_SIZE),
        default_save_size: SAVE_SIZE_WSV,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::Atari7800,
        system_name: "Atari 7800",
        variable_name: "a7800_system",
        folder: "a7800",
        extensions: &["a78", "bin"],
        table_file: "a7800_roms.c",
        save_prefix: "SAVE_A7800_",
        enable_define: Some("ENABLE_EMULATOR_A7800"),
        container: ContainerKind::Whole,
        max_compressible_size: Some(MAX_COMPRESSED_A7800_SIZE),
        default_save_size: SAVE_SIZE_A7800,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
    FamilyPolicy {
        family: Family::AmstradCpc,
        system_name: "Amstrad CPC",
        variable_name: "amstrad_system",
        folder: "amstrad",
        extensions: &["dsk", "cdk"],
        table_file: "amstrad_roms.c",
        save_prefix: "SAVE_AMSTRAD_",
        enable_define: Some("ENABLE_EMULATOR_AMSTRAD"),
        container: ContainerKind::None,
        max_compressible_size: None,
        default_save_size: SAVE_SIZE_AMSTRAD,
        save_source: SaveSizeSource::Fixed,
        shares_rom_cache: false,
        byte_swap: false,
    },
];

impl FamilyPolicy {
    /// Look up the policy row for a family identifier.
    pub fn for_family(family: Family) -> &'static FamilyPolicy {
        FAMILY_ORDER
            .iter()
            .find(|p| p.family == family)
            .unwrap_or_else(|| unreachable!("every Family has a policy row"))
    }
}
