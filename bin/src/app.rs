//! Application related stuff

use clap::Parser;
use photosynthesis_core::common::{Float, Timestamp};

lazy_static! {
    /// The global application options.
    pub static ref OPTIONS: Options = Options::parse();
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Path to the field description.
    #[arg(
        long = "field",
        short = 'f',
        value_name = "FILE",
        help = "Read the field from the given JSON file. Defaults to an empty 4x4 m field."
    )]
    pub field_file: Option<String>,

    /// Latitude override.
    #[arg(
        long,
        value_name = "DEG",
        allow_negative_numbers = true,
        help = "Override the latitude of the field."
    )]
    pub latitude: Option<Float>,

    /// Render size override.
    #[arg(
        long = "render-size",
        value_name = "NUM",
        help = "Override the resolution of the light buffers."
    )]
    pub render_size: Option<u32>,

    /// Diffuse light count override.
    #[arg(
        long = "diffuse-count",
        value_name = "NUM",
        help = "Override the number of sky directions."
    )]
    pub diffuse_count: Option<usize>,

    /// Calculate a time series instead of a single moment.
    #[arg(long, help = "Calculate sunlight over a number of days instead of a single moment.")]
    pub year: bool,

    /// Seconds between two timesteps.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 600,
        help = "Seconds between two sunlight timesteps."
    )]
    pub step: u32,

    /// Number of days.
    #[arg(
        long,
        value_name = "NUM",
        default_value_t = 366,
        help = "Number of days from 21 December."
    )]
    pub days: u32,

    /// Hour of the moment.
    #[arg(
        long,
        value_name = "HOUR",
        default_value_t = 12.0,
        help = "Hour of the day of a single moment."
    )]
    pub hour: Timestamp,

    /// Day of the moment.
    #[arg(
        long,
        value_name = "NUM",
        default_value_t = 0,
        help = "Day of a single moment, counted from 21 December."
    )]
    pub day: u32,

    /// Number of threads to use for rendering.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 1,
        help = "Use specified number of threads for rendering."
    )]
    n_threads: usize,

    /// Path to the CSV file.
    #[arg(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        help = "Write the results to the given file instead of stdout."
    )]
    pub outfile: Option<String>,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => {
                warn!("Invalid nthreads");
                1
            }
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }
}
