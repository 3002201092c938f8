use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vstab::{apply_crop, compute_crop, stabilize, StabConfig, StabError};
use vstab_videoio::{read_video, write_video};

fn print_usage() {
    println!("Usage: vstab <FILE> [OPTIONS]");
    println!();
    println!("Stabilize a frame sequence (directory of images or animated GIF).");
    println!();
    println!("Options:");
    println!("  --debug    Draw correspondence arrows and trajectory traces");
    println!("  --help     Show this message");
}

struct Args {
    file: PathBuf,
    debug: bool,
}

fn parse_args() -> Result<Args, ExitCode> {
    let mut file = None;
    let mut debug = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" => {
                print_usage();
                return Err(ExitCode::FAILURE);
            }
            "--debug" => debug = true,
            other if !other.starts_with("--") => file = Some(PathBuf::from(other)),
            other => {
                eprintln!("Error: unknown option '{other}'");
                return Err(ExitCode::FAILURE);
            }
        }
    }

    let Some(file) = file else {
        eprintln!("Error: the option '--file' is required but missing");
        return Err(ExitCode::FAILURE);
    };

    Ok(Args { file, debug })
}

fn output_directory(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("video");
    input
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{stem}_stabilized"))
}

fn run(args: &Args) -> vstab::Result<()> {
    log::info!("reading video from {}", args.file.display());
    let video = read_video(&args.file)?;
    log::info!("loaded {} frames", video.len());

    let config = StabConfig::default().with_debug(args.debug);
    let output = stabilize(&video, &config);

    let cropped = match video.dimensions() {
        Some((width, height)) => match compute_crop(&output.corrections, width, height) {
            Ok(rect) => {
                log::info!(
                    "cropping to {}x{} at ({}, {})",
                    rect.width,
                    rect.height,
                    rect.x,
                    rect.y
                );
                apply_crop(&output.video, rect)
            }
            Err(StabError::NoValidCropRegion) => {
                log::warn!("no crop region valid across all frames; keeping borders");
                output.video
            }
            Err(e) => return Err(e),
        },
        None => output.video,
    };

    let out_dir = output_directory(&args.file);
    log::info!("writing stabilized frames to {}", out_dir.display());
    write_video(&cropped, &out_dir, "frame")?;

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
