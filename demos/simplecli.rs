#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::{fmt::Display, path::PathBuf};

use clap::{Parser, ValueEnum};
use palette::Srgb;
use pixquant::{ColorSpace, Dither, ImagePipeline, MatrixKind, Palette, PalettePipeline};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, ValueEnum)]
enum CliColorSpace {
    Linear,
    Srgb,
}

impl From<CliColorSpace> for ColorSpace {
    fn from(value: CliColorSpace) -> Self {
        match value {
            CliColorSpace::Linear => ColorSpace::LinearSrgb,
            CliColorSpace::Srgb => ColorSpace::Srgb,
        }
    }
}

impl Display for CliColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CliColorSpace::Linear => "linear",
                CliColorSpace::Srgb => "srgb",
            }
        )
    }
}

#[derive(Parser)]
pub struct Options {
    /// Palette colors as hex codes, for example `--color 000000 --color ffffff`.
    /// If none are given, a median cut palette is computed from the image.
    #[arg(short, long = "color", value_parser = parse_color)]
    colors: Vec<Srgb<u8>>,

    /// Number of median cut rounds, giving `2^levels` colors.
    #[arg(short, long, default_value_t = PalettePipeline::DEFAULT_LEVELS)]
    levels: u8,

    /// Threshold matrix for ordered dithering: `bayer{w}x{h}` or a named matrix such as `clustered-dot-4x4` or `vertical-5x3`.
    #[arg(short, long, value_parser = parse_matrix)]
    matrix: Option<MatrixKind>,

    #[arg(long, default_value_t = Dither::DEFAULT_STRENGTH)]
    strength: f32,

    #[arg(long, default_value_t = CliColorSpace::Linear)]
    colorspace: CliColorSpace,

    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    #[arg(long)]
    verbose: bool,

    input: PathBuf,

    output: PathBuf,
}

fn parse_color(s: &str) -> Result<Srgb<u8>, String> {
    s.trim_start_matches('#').parse().map_err(|e| format!("{e}"))
}

fn parse_matrix(s: &str) -> Result<MatrixKind, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn main() {
    let Options {
        colors,
        levels,
        matrix,
        strength,
        colorspace,
        threads,
        verbose,
        input,
        output,
    } = Options::parse();

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let image = log!("read image", image::open(input).unwrap());

    let pipeline = ImagePipeline::new(image).colorspace(colorspace.into());

    let pipeline = if colors.is_empty() {
        pipeline.median_cut(levels)
    } else {
        pipeline.palette(Palette::from_srgb8(colors).unwrap())
    };

    let pipeline = match matrix {
        Some(matrix) => pipeline.dither(Dither::Ordered { matrix, strength }),
        None => pipeline,
    };

    let image = log!(
        "quantization and remapping",
        match threads {
            0 => pipeline.quantized_par(),
            1 => pipeline.quantized(),
            t => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(t.into())
                    .build()
                    .unwrap();

                pool.install(|| pipeline.quantized_par())
            }
        }
        .unwrap()
    );

    log!("write image", image.into_dynamic().save(output).unwrap())
}
