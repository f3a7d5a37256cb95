//! png2cur - convert a PNG image to a Windows cursor (.cur) file.
//!
//! The PNG is embedded as-is; only the cursor headers are generated.

mod config;
mod cur;
mod error;
mod probe;
mod validate;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use config::{load_config, save_config, Config};
use cur::{CurFileBuilder, ImageMetadata};

#[derive(Parser)]
#[command(name = "png2cur")]
#[command(about = "Convert a PNG image to a Windows cursor (.cur) file")]
#[command(version)]
struct Cli {
    /// Input file name, should be .png
    input: PathBuf,

    /// Output file name (default same as input but .cur)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Horizontal hotspot position from left
    #[arg(short = 'x', long, allow_negative_numbers = true)]
    hotspot_x: Option<i32>,

    /// Vertical hotspot position from top
    #[arg(short = 'y', long, allow_negative_numbers = true)]
    hotspot_y: Option<i32>,

    /// Remember the given hotspot as the default for future runs
    #[arg(long)]
    save_defaults: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        config.level_filter()
    };
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    run(cli, config)
}

fn run(cli: Cli, mut config: Config) -> Result<()> {
    let hotspot_x = cli.hotspot_x.unwrap_or(config.hotspot_x);
    let hotspot_y = cli.hotspot_y.unwrap_or(config.hotspot_y);

    if cli.save_defaults {
        config.hotspot_x = hotspot_x;
        config.hotspot_y = hotspot_y;
        let path = save_config(&config).context("Failed to save defaults")?;
        log::info!("Saved default hotspot ({}, {}) to {}", hotspot_x, hotspot_y, path.display());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input));

    // first get some info
    let info = probe::probe_png(&cli.input)?;
    println!("{} loaded ({}B)", display_name(&cli.input), info.payload_len);
    println!("{}×{} px", info.width, info.height);
    log::debug!(
        "Color model: {} (alpha: {})",
        info.color_model,
        info.color_model.has_alpha()
    );

    validate::validate(info.width, info.height, info.color_model)?;

    if !hotspot_in_bounds(hotspot_x, hotspot_y, info.width, info.height) {
        log::warn!(
            "Hotspot ({}, {}) lies outside the {}×{} image",
            hotspot_x,
            hotspot_y,
            info.width,
            info.height
        );
    }

    let metadata = ImageMetadata {
        width: info.width,
        height: info.height,
        hotspot_x,
        hotspot_y,
        payload_len: info.payload_len,
    };

    write_cursor(&cli.input, &output, metadata)?;
    println!("{} created", output.display());
    Ok(())
}

fn write_cursor(input: &Path, output: &Path, metadata: ImageMetadata) -> Result<()> {
    // Creating the output would truncate the payload before it is read.
    if same_file(input, output) {
        anyhow::bail!(
            "Output {} is the input image, choose another name with -o",
            output.display()
        );
    }

    let input_file = File::open(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let output_file = File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let mut writer = BufWriter::new(output_file);
    let result = CurFileBuilder::new(metadata).build(BufReader::new(input_file), &mut writer);
    drop(writer);

    match result {
        Ok(written) => {
            log::debug!("{} bytes written to {}", written, output.display());
            Ok(())
        }
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(output) {
                log::warn!("Could not remove partial {}: {}", output.display(), remove_err);
            }
            Err(e).with_context(|| format!("Failed to build {}", output.display()))
        }
    }
}

/// True when both paths exist and resolve to the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Same as the input but with a .cur extension.
fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("cur")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn hotspot_in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(default_output_path(Path::new("arrow.png")), PathBuf::from("arrow.cur"));
        assert_eq!(
            default_output_path(Path::new("icons/hand.v2.png")),
            PathBuf::from("icons/hand.v2.cur")
        );
        assert_eq!(default_output_path(Path::new("pointer")), PathBuf::from("pointer.cur"));
    }

    #[test]
    fn test_hotspot_bounds() {
        assert!(hotspot_in_bounds(0, 0, 32, 32));
        assert!(hotspot_in_bounds(31, 31, 32, 32));
        assert!(!hotspot_in_bounds(32, 0, 32, 32));
        assert!(!hotspot_in_bounds(-1, 4, 32, 32));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["png2cur", "arrow.png", "-x", "3", "-y", "-2", "-o", "out.cur"]);
        assert_eq!(cli.input, PathBuf::from("arrow.png"));
        assert_eq!(cli.output, Some(PathBuf::from("out.cur")));
        assert_eq!(cli.hotspot_x, Some(3));
        assert_eq!(cli.hotspot_y, Some(-2));
        assert!(!cli.verbose);
    }

    #[test]
    fn test_write_cursor_from_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("arrow.png");
        image::RgbaImage::new(32, 32).save(&input).unwrap();
        let png = std::fs::read(&input).unwrap();

        let info = probe::probe_png(&input).unwrap();
        validate::validate(info.width, info.height, info.color_model).unwrap();
        let metadata = ImageMetadata {
            width: info.width,
            height: info.height,
            hotspot_x: 4,
            hotspot_y: 5,
            payload_len: info.payload_len,
        };

        let output = default_output_path(&input);
        write_cursor(&input, &output, metadata).unwrap();

        let cursor = std::fs::read(&output).unwrap();
        assert_eq!(cursor.len(), 62 + png.len());
        assert_eq!(&cursor[0..6], &[0, 0, 2, 0, 1, 0]);
        assert_eq!(&cursor[10..14], &[4, 0, 5, 0]);
        assert_eq!(&cursor[62..], &png[..]);
    }

    #[test]
    fn test_write_cursor_refuses_to_overwrite_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("arrow.png");
        image::RgbaImage::new(8, 8).save(&input).unwrap();
        let png = std::fs::read(&input).unwrap();
        let info = probe::probe_png(&input).unwrap();

        let metadata = ImageMetadata {
            width: info.width,
            height: info.height,
            hotspot_x: 0,
            hotspot_y: 0,
            payload_len: info.payload_len,
        };

        let same_path = dir.path().join(".").join("arrow.png");
        assert!(write_cursor(&input, &same_path, metadata).is_err());
        assert!(write_cursor(&input, &input, metadata).is_err());
        assert_eq!(std::fs::read(&input).unwrap(), png);
    }

    #[test]
    fn test_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        std::fs::write(&a, b"x").unwrap();

        assert!(same_file(&a, &dir.path().join(".").join("a.png")));
        assert!(!same_file(&a, &dir.path().join("a.cur")));
    }

    #[test]
    fn test_write_cursor_removes_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("short.png");
        std::fs::write(&input, [0u8; 10]).unwrap();
        let output = dir.path().join("short.cur");

        let metadata = ImageMetadata {
            width: 16,
            height: 16,
            hotspot_x: 0,
            hotspot_y: 0,
            payload_len: 20,
        };
        let err = write_cursor(&input, &output, metadata).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::CurError>(),
            Some(error::CurError::PayloadRead { expected: 20, actual: 10, .. })
        ));
        assert!(!output.exists());
    }
}
