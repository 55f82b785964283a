//! Command-line front end: decode a JPEG file and write it out as PGM/PPM
//! (§4.11, §6 External Interfaces).
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use jpegrs::errors::DecodeErrors;
use jpegrs::image::Decoder;
use jpegrs::misc::ColorSpace;
use jpegrs::output::write_netpbm;

/// Decode a baseline or progressive JPEG file into a PGM/PPM image.
#[derive(Parser, Debug)]
#[command(name = "jpeg2ppm")]
struct Args {
    /// Path to the input JPEG file.
    input: PathBuf,

    /// Output path. Defaults to the input path with its extension
    /// replaced by `.ppm` (colour) or `.pgm` (grayscale).
    output: Option<PathBuf>,

    /// Verbose: raise the log level to show per-scan traces.
    #[arg(short = 'v')]
    verbose: bool,

    /// Print per-block pipeline dumps; inhibits writing the image.
    #[arg(short = 'b')]
    blabla: bool,

    /// Write one intermediate image per progressive scan, named
    /// `prog_out_<n>`.
    #[arg(short = 'p')]
    prog_step: bool,

    /// Enable the post-entropy worker pool (sized by the number of CPUs).
    #[arg(short = 'm')]
    multithread: bool,
}

fn derive_output_name(input: &Path, colorspace: ColorSpace) -> PathBuf {
    let ext = match colorspace {
        ColorSpace::RGB => "ppm",
        ColorSpace::Grayscale => "pgm",
    };
    input.with_extension(ext)
}

fn run(args: Args) -> Result<(), DecodeErrors> {
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    let data = std::fs::read(&args.input)?;
    let workers = if args.multithread { num_cpus::get() } else { 1 };

    let mut decoder = Decoder::new(data).with_workers(workers);
    let image = decoder.decode()?;

    if args.blabla {
        log::info!(
            "{}x{} {:?}, {} bytes of pixel data",
            image.width,
            image.height,
            image.colorspace,
            image.pixels.len()
        );
        return Ok(());
    }

    if args.prog_step {
        log::warn!("per-scan intermediate dumps (-p) are not implemented by this decoder");
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derive_output_name(&args.input, image.colorspace));
    let file = std::fs::File::create(&output)?;
    write_netpbm(&image, std::io::BufWriter::new(file))?;
    println!("decoded {} -> {}", args.input.display(), output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jpeg2ppm: {e}");
            ExitCode::FAILURE
        }
    }
}
