//! Slice a TSX tileset into `tile_0000.png`, `tile_0001.png`, ...
//!
//! Run with: tsx_tile_extractor <tileset.tsx> [output-dir]

use celeste_editor::extract::extract_tiles;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "tsx_tile_extractor",
    about = "Export every tile of a TSX tileset as a PNG"
)]
struct Args {
    /// Tileset descriptor (.tsx)
    tsx: PathBuf,

    /// Output directory (default: <tsx dir>/tiles_out)
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match extract_tiles(&args.tsx, args.output.as_deref()) {
        Ok(report) => {
            println!("TSX file: {}", report.tsx.display());
            println!("Image file: {}", report.image.display());
            println!(
                "tilewidth={}, tileheight={}, columns={}, tilecount={}",
                report.tile_width, report.tile_height, report.columns, report.tile_count
            );
            println!("Output dir: {}", report.output_dir.display());
            if let Some(index) = report.stopped_at {
                println!("Stopping at tile index {} (out of bounds).", index);
            }
            println!("Wrote {} tiles.", report.written);
            println!("Done.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
