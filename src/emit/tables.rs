//! Generated C descriptor tables
//!
//! One generated .c file per family: extern declarations for the
//! staged payload symbols, the save arrays, the rom entry table and
//! the system descriptor the firmware menu walks. Pure string
//! generation; staging and file writing happen in the caller.

use std::fmt::Write;

/// File-name tags marking a PAL release.
const PAL_TAGS: &[&str] = &[
    "(E)",
    "(Europe)",
    "(Sweden)",
    "(Germany)",
    "(Italy)",
    "(France)",
    "(A)",
    "(Australia)",
];

/// Region constant for a file stem, from its release tags.
pub fn region_for(stem: &str) -> &'static str {
    if PAL_TAGS.iter().any(|tag| stem.contains(tag)) {
        "REGION_PAL"
    } else {
        "REGION_NTSC"
    }
}

/// Preamble of every generated table file: the COVERFLOW / EMU_DATA
/// plumbing and the system descriptor's forward declaration.
pub fn system_proto(variable_name: &str) -> String {
    format!(
        "\n#if !defined (COVERFLOW)\n  #define COVERFLOW 0\n#endif /* COVERFLOW */\n\
         #if !defined (BIG_BANK)\n#define BIG_BANK 1\n#endif\n\
         #if (BIG_BANK == 1) && (EXTFLASH_SIZE <= 128*1024*1024)\n\
         #define EMU_DATA \n#else\n\
         #define EMU_DATA __attribute__((section(\".extflash_emu_data\")))\n#endif\n\
         extern const rom_system_t {variable_name};\n"
    )
}

pub fn extern_decl(symbol: &str) -> String {
    format!("extern const uint8_t {symbol}[];\n")
}

/// Save-slot array, placed in the save partition and page aligned.
pub fn save_array(name: &str, size: u32) -> String {
    format!(
        "uint8_t {name}[{size}]  __attribute__((section (\".saveflash\"))) __attribute__((aligned(4096)));\n"
    )
}

/// Everything one rom entry row needs.
#[derive(Debug)]
pub struct TableEntry<'a> {
    pub id: u32,
    pub name: &'a str,
    pub extension: &'a str,
    pub symbol: &'a str,
    pub size: u64,
    pub img_symbol: Option<&'a str>,
    pub img_size: u64,
    /// Save array identifier, None when saves are disabled
    pub save_name: Option<&'a str>,
    pub region: &'a str,
    pub system: &'a str,
    pub mapper: u32,
    pub game_config: u32,
}

pub fn rom_entry(entry: &TableEntry<'_>) -> String {
    let (save_address, save_size) = match entry.save_name {
        Some(name) => (name.to_string(), format!("sizeof({name})")),
        None => ("NULL".to_string(), "0".to_string()),
    };
    let img_address = match entry.img_symbol {
        Some(symbol) if entry.img_size > 0 => symbol,
        _ => "NULL",
    };

    let mut out = String::new();
    let _ = writeln!(out, "\t{{");
    let _ = writeln!(out, "\t\t.id = {},", entry.id);
    let _ = writeln!(out, "\t\t.name = \"{}\",", entry.name);
    let _ = writeln!(out, "\t\t.ext = \"{}\",", entry.extension);
    let _ = writeln!(out, "\t\t.address = {},", entry.symbol);
    let _ = writeln!(out, "\t\t.size = {},", entry.size);
    let _ = writeln!(out, "\t\t#if COVERFLOW != 0");
    let _ = writeln!(out, "\t\t.img_address = {img_address},");
    let _ = writeln!(out, "\t\t.img_size = {},", entry.img_size);
    let _ = writeln!(out, "\t\t#endif");
    let _ = writeln!(out, "\t\t.save_address = {save_address},");
    let _ = writeln!(out, "\t\t.save_size = {save_size},");
    let _ = writeln!(out, "\t\t.system = &{},", entry.system);
    let _ = writeln!(out, "\t\t.region = {},", entry.region);
    let _ = writeln!(out, "\t\t.mapper = {},", entry.mapper);
    let _ = writeln!(out, "\t\t.game_config = {},", entry.game_config);
    let _ = writeln!(out, "\t}},");
    out
}

/// The rom entry array plus its published count.
pub fn rom_entries(name: &str, body: &str, rom_count: usize) -> String {
    format!(
        "\nconst retro_emulator_file_t {name}[] EMU_DATA = {{\n{body}}};\n\
         const uint32_t {name}_count = {rom_count};\n"
    )
}

/// The trailing system descriptor.
pub fn system_struct(
    variable_name: &str,
    system_name: &str,
    roms_name: &str,
    extension: &str,
    cover_width: u32,
    cover_height: u32,
    roms_count: usize,
) -> String {
    format!(
        "\nconst rom_system_t {variable_name} EMU_DATA = {{\n\
         \t.system_name = \"{system_name}\",\n\
         \t.roms = {roms_name},\n\
         \t.extension = \"{extension}\",\n\
         \t#if COVERFLOW != 0\n\
         \t.cover_width = {cover_width},\n\
         \t.cover_height = {cover_height},\n\
         \t#endif \n\
         \t.roms_count = {roms_count},\n\
         }};\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_detection() {
        assert_eq!(region_for("Game (Europe)"), "REGION_PAL");
        assert_eq!(region_for("Game (E) [!]"), "REGION_PAL");
        assert_eq!(region_for("Game (Australia)"), "REGION_PAL");
        assert_eq!(region_for("Game (U)"), "REGION_NTSC");
        assert_eq!(region_for("Game"), "REGION_NTSC");
    }

    #[test]
    fn test_rom_entry_with_save_and_cover() {
        let entry = rom_entry(&TableEntry {
            id: 3,
            name: "Super Game",
            extension: "lzma",
            symbol: "_binary_roms_gb_Super_Game_gb_lzma_start",
            size: 12345,
            img_symbol: Some("_binary_roms_gb_Super_Game_img_start"),
            img_size: 4000,
            save_name: Some("SAVE_GB_0"),
            region: "REGION_NTSC",
            system: "gb_system",
            mapper: 0,
            game_config: 0xff,
        });
        assert!(entry.contains(".id = 3,"));
        assert!(entry.contains(".ext = \"lzma\","));
        assert!(entry.contains(".save_address = SAVE_GB_0,"));
        assert!(entry.contains(".save_size = sizeof(SAVE_GB_0),"));
        assert!(entry.contains(".img_address = _binary_roms_gb_Super_Game_img_start,"));
        assert!(entry.contains(".game_config = 255,"));
    }

    #[test]
    fn test_rom_entry_without_save_or_cover() {
        let entry = rom_entry(&TableEntry {
            id: 0,
            name: "Game",
            extension: "nes",
            symbol: "_binary_roms_nes_Game_nes_start",
            size: 100,
            img_symbol: None,
            img_size: 0,
            save_name: None,
            region: "REGION_NTSC",
            system: "nes_system",
            mapper: 4,
            game_config: 0xff,
        });
        assert!(entry.contains(".save_address = NULL,"));
        assert!(entry.contains(".save_size = 0,"));
        assert!(entry.contains(".img_address = NULL,"));
        assert!(entry.contains(".mapper = 4,"));
    }

    #[test]
    fn test_save_array_is_page_aligned() {
        let decl = save_array("SAVE_SMS_0", 61440);
        assert!(decl.contains("SAVE_SMS_0[61440]"));
        assert!(decl.contains("aligned(4096)"));
        assert!(decl.contains(".saveflash"));
    }

    #[test]
    fn test_system_struct_fields() {
        let block = system_struct("gb_system", "Nintendo Gameboy", "gb_roms", "gb", 128, 96, 12);
        assert!(block.contains(".system_name = \"Nintendo Gameboy\","));
        assert!(block.contains(".roms = gb_roms,"));
        assert!(block.contains(".roms_count = 12,"));
    }
}
