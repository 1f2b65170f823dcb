// src/pack/constants.rs
// Core format constants that never change
// For tunable defaults and configuration, see defaults.rs

/// Magic prefix of the banked container header
pub const BANKED_MAGIC: &[u8; 4] = b"SMS+";

/// Bank size for the banked container families (Sega line)
pub const BANKED_BANK_SIZE: usize = 128 * 1024;

/// Bank size for the adaptive container family (Game Boy line)
pub const ADAPTIVE_BANK_SIZE: usize = 16 * 1024;

/// LZMA1 dictionary size the firmware decoder is built with
pub const LZMA_DICT_SIZE: u32 = 16 * 1024;

/// LZMA1 preset used by the encoder
pub const LZMA_PRESET: u32 = 6;

/// Length of the LZMA "alone" header (props + dict size + raw size)
/// stripped before storage; the firmware reconstructs decoder state
/// without it.
pub const LZMA_ALONE_HEADER_LEN: usize = 13;

// Maximum compressible input sizes per family. Each one is the size of
// the fixed runtime decompression buffer for that emulator core;
// exceeding it would corrupt execution, so bigger images stay raw.
pub const MAX_COMPRESSED_NES_SIZE: u64 = 0x0008_0010; // 512 KiB + 16 byte header
pub const MAX_COMPRESSED_PCE_SIZE: u64 = 0x0004_9000;
pub const MAX_COMPRESSED_WSV_SIZE: u64 = 0x0008_0000;
pub const MAX_COMPRESSED_SG_COL_SIZE: u64 = 60 * 1024;
pub const MAX_COMPRESSED_A7800_SIZE: u64 = 131_200;
pub const MAX_COMPRESSED_MSX_SIZE: u64 = 136 * 1024;
