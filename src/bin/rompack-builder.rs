//! rompack builder binary

use clap::Parser;
use rompack::emit::covers::JpegCoverEncoder;
use rompack::emit::objects::ArmObjectTool;
use rompack::exit_codes::{
    EXIT_CODEC_ERROR, EXIT_CONFIG_ERROR, EXIT_ERROR, EXIT_IO_ERROR, EXIT_NO_IMAGES,
    EXIT_OVERFLOW_ERROR, EXIT_PANIC, EXIT_SUCCESS, EXIT_TOOL_ERROR,
};
use rompack::{Collaborators, CompressionMethod, PackOptions, RomPackError, pack_firmware};
use std::{env, panic, path::PathBuf, process};

const VERSION: &str = rompack::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Import ROMs to the build environment")]
struct Args {
    /// Size of external SPI flash in bytes
    #[arg(short = 's', long, default_value_t = 1024 * 1024)]
    flash_size: u64,

    /// Compression method. Defaults to no compression
    #[arg(long)]
    compress: Option<String>,

    /// Apply only selective compression to gameboy banks. Only apply
    /// if bank decompression during switching is too slow
    #[arg(long, overrides_with = "no_compress_gb_speed")]
    compress_gb_speed: bool,

    #[arg(long, hide = true)]
    no_compress_gb_speed: bool,

    /// Compressed banks the runtime cache holds at once
    #[arg(long, default_value_t = 26)]
    compression_credit: usize,

    /// Compressed size at or below which a bank counts as empty
    #[arg(long, default_value_t = 98)]
    near_empty_threshold: usize,

    /// Pack cover art images
    #[arg(long)]
    coverflow: bool,

    /// Cover art JPEG quality
    #[arg(long, default_value_t = 90)]
    jpg_quality: u8,

    /// Set separate flash zone for off/on savestate
    #[arg(long)]
    off_saveflash: bool,

    /// Only allocate save regions for roms opted in by roms.json
    #[arg(long)]
    no_save: bool,

    /// Root of the per-family rom folders
    #[arg(long, default_value = "roms")]
    roms_dir: PathBuf,

    /// Staging area for objects and linker directives
    #[arg(long, default_value = "build")]
    build_dir: PathBuf,

    /// Destination of the generated descriptor tables
    #[arg(long, default_value = "Core/Src/retro-go")]
    tables_dir: PathBuf,

    /// Enable verbose prints
    #[arg(long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error; json: prefix for
    /// JSON lines)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {panic_info}");
        process::exit(EXIT_PANIC);
    }));

    // Wrap main logic in catch_unwind for extra safety
    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in builder");
            process::exit(EXIT_PANIC);
        }
    }
}

fn exit_code_for(error: &RomPackError) -> i32 {
    match error {
        RomPackError::Config(_) | RomPackError::JsonError(_) => EXIT_CONFIG_ERROR,
        RomPackError::Codec(_) => EXIT_CODEC_ERROR,
        RomPackError::StorageOverflow { .. } => EXIT_OVERFLOW_ERROR,
        RomPackError::NoImages => EXIT_NO_IMAGES,
        RomPackError::Tool(_) => EXIT_TOOL_ERROR,
        RomPackError::IoError(_) => EXIT_IO_ERROR,
        RomPackError::Artwork(_, _) | RomPackError::Generic(_) => EXIT_ERROR,
    }
}

fn run() -> i32 {
    // Handle --version before clap
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("rompack-builder {}", rompack::version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();

    if let Some(ref level) = args.log_level {
        rompack::logger::JsonLogger::init_with_level(level);
    } else if args.verbose {
        rompack::logger::JsonLogger::init_with_level("debug");
    } else {
        rompack::logger::JsonLogger::init();
    }

    let method = match args.compress.as_deref().map(CompressionMethod::parse) {
        Some(Ok(method)) => Some(method),
        Some(Err(e)) => {
            eprintln!("{e}");
            return EXIT_CONFIG_ERROR;
        }
        None => None,
    };

    let options = PackOptions {
        roms_dir: args.roms_dir,
        build_dir: args.build_dir,
        tables_dir: args.tables_dir,
        flash_size: args.flash_size,
        method,
        speed_priority: args.compress_gb_speed && !args.no_compress_gb_speed,
        compression_credit: args.compression_credit,
        near_empty_threshold: args.near_empty_threshold,
        coverflow: args.coverflow,
        jpg_quality: args.jpg_quality,
        off_saveflash: args.off_saveflash,
        force_save: !args.no_save,
    };

    let object_tool = ArmObjectTool;
    let cover_encoder = JpegCoverEncoder;
    let mut collaborators = Collaborators::new(&object_tool);
    if options.coverflow {
        collaborators.cover_encoder = Some(&cover_encoder);
    }

    match pack_firmware(&options, &collaborators) {
        Ok(summary) => {
            log::info!("Done, {} roms packed", summary.totals.next_id);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code_for(&e)
        }
    }
}
