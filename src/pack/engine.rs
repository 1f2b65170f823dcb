//! Compression engine
//!
//! Takes one image's raw bytes plus its family policy and produces the
//! container the firmware stores, or reports a designed skip when the
//! image is too large for the family's runtime decompression buffer.

use super::codec::{self, CompressionMethod, Mode};
use super::constants::BANKED_MAGIC;
use super::family::{ContainerKind, FamilyPolicy};
use crate::exceptions::{Result, RomPackError};
use log::{debug, info, trace};

/// Engine configuration for one run.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub method: CompressionMethod,
    /// Run the compression-credit policy on adaptive families
    pub speed_priority: bool,
    /// Banks the runtime cache can keep decompressed at once
    pub compression_credit: usize,
    /// Compressed length at or below which a bank counts as empty
    pub near_empty_threshold: usize,
}

/// How one image ended up stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStatus {
    /// Single compressed segment
    Whole,
    /// Every bank compressed
    FullyBanked,
    /// Some banks left raw by the credit policy (bank 0 always is)
    PartiallyBanked,
}

/// Output unit written to disk for one image.
#[derive(Debug)]
pub struct CompressedContainer {
    pub bytes: Vec<u8>,
    pub status: CompressionStatus,
}

/// Result of asking the engine to compress one image.
#[derive(Debug)]
pub enum Outcome {
    /// Image exceeds the family's compressible-size cap; caller keeps
    /// it raw. A designed skip, never an error.
    Skipped,
    Packed(CompressedContainer),
}

/// Compress one image according to its family policy.
///
/// Families with `ContainerKind::None` should not reach the engine;
/// asking anyway yields `Skipped`.
pub fn compress_image(
    name: &str,
    data: &[u8],
    policy: &FamilyPolicy,
    options: &EngineOptions,
) -> Result<Outcome> {
    if let Some(cap) = policy.max_compressible_size {
        if data.len() as u64 > cap {
            info!("{} is too large to compress, skipping compression!", name);
            return Ok(Outcome::Skipped);
        }
    }

    let container = match policy.container {
        ContainerKind::None => return Ok(Outcome::Skipped),
        ContainerKind::Whole => CompressedContainer {
            bytes: codec::compress(options.method, data, Mode::Default)?,
            status: CompressionStatus::Whole,
        },
        ContainerKind::Banked { bank_size } => compress_banked(data, bank_size, options)?,
        ContainerKind::Adaptive { bank_size } => compress_adaptive(data, bank_size, options)?,
    };

    debug!(
        "{}: {} -> {} bytes ({:?})",
        name,
        data.len(),
        container.bytes.len(),
        container.status
    );

    Ok(Outcome::Packed(container))
}

/// Split into fixed-size banks (last may be short), compress each, and
/// frame them behind a header so the runtime can seek to any bank:
/// magic, u32le bank count, u32le compressed length per bank, then the
/// concatenated payloads.
fn compress_banked(
    data: &[u8],
    bank_size: usize,
    options: &EngineOptions,
) -> Result<CompressedContainer> {
    let banks: Vec<&[u8]> = data.chunks(bank_size).collect();
    let mut payloads = Vec::with_capacity(banks.len());
    for bank in &banks {
        payloads.push(codec::compress(options.method, bank, Mode::Default)?);
    }

    let bank_count = u32::try_from(payloads.len())
        .map_err(|_| RomPackError::Codec("bank count exceeds u32".to_string()))?;

    let mut out = Vec::new();
    out.extend_from_slice(BANKED_MAGIC);
    out.extend_from_slice(&bank_count.to_le_bytes());
    for payload in &payloads {
        let len = u32::try_from(payload.len())
            .map_err(|_| RomPackError::Codec("bank payload exceeds u32".to_string()))?;
        out.extend_from_slice(&len.to_le_bytes());
    }
    for payload in &payloads {
        out.extend_from_slice(payload);
    }

    Ok(CompressedContainer {
        bytes: out,
        status: CompressionStatus::FullyBanked,
    })
}

/// Header-less banked container for systems with continuous bank
/// switching. Bank 0 stays raw so the runtime maps it without
/// decompression latency; every other bank is compressed, unless the
/// speed-priority credit policy re-frames the poorly-compressing ones
/// raw. Bank boundaries are implicit from the original bank size
/// table known to the runtime.
fn compress_adaptive(
    data: &[u8],
    bank_size: usize,
    options: &EngineOptions,
) -> Result<CompressedContainer> {
    let banks: Vec<&[u8]> = data.chunks(bank_size).collect();
    let mut payloads = Vec::with_capacity(banks.len());
    for bank in &banks {
        payloads.push(codec::compress(options.method, bank, Mode::Default)?);
    }

    // keep bank 0 uncompressed
    let mut keep_compressed = vec![true; banks.len()];
    if !banks.is_empty() {
        keep_compressed[0] = false;
    }

    if options.speed_priority && banks.len() > 1 {
        let lens: Vec<usize> = payloads[1..].iter().map(|p| p.len()).collect();
        for idx in select_raw_banks(
            &lens,
            options.compression_credit,
            options.near_empty_threshold,
        ) {
            trace!(
                "bank {} compresses poorly ({} bytes), storing raw",
                idx + 1,
                lens[idx]
            );
            keep_compressed[idx + 1] = false;
        }
    }

    let mut out = Vec::new();
    let mut forced_raw = 0usize;
    for (i, bank) in banks.iter().enumerate() {
        if keep_compressed[i] {
            out.extend_from_slice(&payloads[i]);
        } else {
            out.extend_from_slice(&codec::compress(options.method, bank, Mode::DontCompress)?);
            if i > 0 {
                forced_raw += 1;
            }
        }
    }

    let status = if forced_raw > 0 {
        CompressionStatus::PartiallyBanked
    } else {
        CompressionStatus::FullyBanked
    };

    Ok(CompressedContainer { bytes: out, status })
}

/// Compression-credit selection over the compressed lengths of banks
/// 1..n (`lens[i]` belongs to bank `i + 1`). Returns the indices into
/// `lens` of the banks to store raw.
///
/// Near-empty banks (length at or below `near_empty`) stay compressed
/// regardless: they cost almost nothing and keep the file small. Of
/// the remaining candidates the `min(credit, candidates - 1)` with the
/// smallest compressed lengths stay compressed - those are the banks
/// worth loading into the fixed decompression cache - and the rest are
/// stored raw. Ties break toward the earlier bank. An empty candidate
/// pool forces nothing raw.
pub(crate) fn select_raw_banks(lens: &[usize], credit: usize, near_empty: usize) -> Vec<usize> {
    let mut candidates: Vec<(usize, usize)> = lens
        .iter()
        .enumerate()
        .filter(|&(_, &len)| len > near_empty)
        .map(|(idx, &len)| (len, idx))
        .collect();

    if candidates.is_empty() {
        return Vec::new();
    }

    candidates.sort();
    let keep = credit.min(candidates.len() - 1);

    let mut raw: Vec<usize> = candidates[keep..].iter().map(|&(_, idx)| idx).collect();
    raw.sort_unstable();
    raw
}

#[cfg(test)]
mod tests {
    use super::super::codec::testutil::decompress_stripped;
    use super::super::constants::{ADAPTIVE_BANK_SIZE, BANKED_BANK_SIZE};
    use super::super::family::{Family, FamilyPolicy};
    use super::*;

    fn options(speed_priority: bool) -> EngineOptions {
        EngineOptions {
            method: CompressionMethod::Lzma,
            speed_priority,
            compression_credit: 26,
            near_empty_threshold: 98,
        }
    }

    fn repeating(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(seed)).collect()
    }

    #[test]
    fn test_oversized_image_is_skipped() {
        let policy = FamilyPolicy::for_family(Family::PcEngine);
        let too_big = vec![0u8; (policy.max_compressible_size.unwrap() + 1) as usize];
        let outcome = compress_image("big", &too_big, policy, &options(false)).unwrap();
        assert!(matches!(outcome, Outcome::Skipped));
    }

    #[test]
    fn test_whole_round_trip() {
        let policy = FamilyPolicy::for_family(Family::PcEngine);
        let data = repeating(64 * 1024, 7);
        let Outcome::Packed(container) =
            compress_image("whole", &data, policy, &options(false)).unwrap()
        else {
            panic!("expected packed output");
        };
        assert_eq!(container.status, CompressionStatus::Whole);
        assert_eq!(decompress_stripped(&container.bytes), data);
    }

    #[test]
    fn test_banked_container_layout_and_round_trip() {
        let policy = FamilyPolicy::for_family(Family::MasterSystem);
        // two full banks plus a short tail
        let data = repeating(2 * BANKED_BANK_SIZE + 512, 3);
        let Outcome::Packed(container) =
            compress_image("banked", &data, policy, &options(false)).unwrap()
        else {
            panic!("expected packed output");
        };
        assert_eq!(container.status, CompressionStatus::FullyBanked);

        let bytes = &container.bytes;
        assert_eq!(&bytes[..4], b"SMS+");
        let count = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        assert_eq!(count, 3);

        let mut lens = Vec::new();
        for i in 0..count {
            let at = 8 + i * 4;
            lens.push(u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap()) as usize);
        }

        let mut offset = 8 + count * 4;
        let mut rebuilt = Vec::new();
        for len in lens {
            rebuilt.extend_from_slice(&decompress_stripped(&bytes[offset..offset + len]));
            offset += len;
        }
        assert_eq!(offset, bytes.len());
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_adaptive_bank_zero_always_raw() {
        let policy = FamilyPolicy::for_family(Family::GameBoy);
        let data = repeating(3 * ADAPTIVE_BANK_SIZE, 5);
        for speed in [false, true] {
            let Outcome::Packed(container) =
                compress_image("gb", &data, policy, &options(speed)).unwrap()
            else {
                panic!("expected packed output");
            };
            assert_eq!(&container.bytes[..ADAPTIVE_BANK_SIZE], &data[..ADAPTIVE_BANK_SIZE]);
        }
    }

    #[test]
    fn test_adaptive_without_speed_flag_compresses_all_other_banks() {
        let policy = FamilyPolicy::for_family(Family::GameBoy);
        let data = repeating(4 * ADAPTIVE_BANK_SIZE, 9);
        let Outcome::Packed(container) =
            compress_image("gb", &data, policy, &options(false)).unwrap()
        else {
            panic!("expected packed output");
        };
        assert_eq!(container.status, CompressionStatus::FullyBanked);

        // the container has no length table, so rebuild it bank by
        // bank: bank 0 raw, every later bank as its own stream
        let mut expected = data[..ADAPTIVE_BANK_SIZE].to_vec();
        for bank in data[ADAPTIVE_BANK_SIZE..].chunks(ADAPTIVE_BANK_SIZE) {
            let stream = codec::compress(CompressionMethod::Lzma, bank, Mode::Default).unwrap();
            assert_eq!(decompress_stripped(&stream), bank);
            expected.extend_from_slice(&stream);
        }
        assert_eq!(container.bytes, expected);
    }

    #[test]
    fn test_select_raw_banks_single_credit_example() {
        // banks 1-3 compress to 500, 2000, 50; credit 1; threshold 98.
        // The 50-byte bank is near-empty and excluded; of {500, 2000}
        // the single credit keeps 500 compressed, 2000 is forced raw.
        let raw = select_raw_banks(&[500, 2000, 50], 1, 98);
        assert_eq!(raw, vec![1]);
    }

    #[test]
    fn test_select_raw_banks_count_law() {
        // uncompressed count == len(L) - min(k, len(L) - 1)
        let lens = [300, 700, 500, 900, 400];
        for credit in 0..8 {
            let raw = select_raw_banks(&lens, credit, 98);
            assert_eq!(raw.len(), lens.len() - credit.min(lens.len() - 1));
        }
    }

    #[test]
    fn test_select_raw_banks_ties_break_by_bank_order() {
        // credit keeps one of the two equal lengths compressed: the
        // earlier bank wins, the later one is stored raw.
        let raw = select_raw_banks(&[600, 600, 800], 1, 98);
        assert_eq!(raw, vec![1, 2]);
    }

    #[test]
    fn test_select_raw_banks_all_near_empty_forces_nothing() {
        let raw = select_raw_banks(&[98, 40, 12], 4, 98);
        assert!(raw.is_empty());
    }

    #[test]
    fn test_select_raw_banks_credit_exceeds_candidates() {
        // credit clamps to candidates - 1, so exactly one bank (the
        // largest) is left raw.
        let raw = select_raw_banks(&[300, 500], 26, 98);
        assert_eq!(raw, vec![1]);
    }
}
