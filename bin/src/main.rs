#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

mod app;
mod output;

use app::*;
use field::{FieldManager, FieldParameters};
use indicatif::{ProgressBar, ProgressStyle};
use output::*;
use photosynthesis_core::gpu::SoftwareDevice;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    if let Err(e) = run() {
        error!("{e}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let parameters = load_parameters().map_err(|e| e.to_string())?;

    let device = SoftwareDevice::new().with_threads(OPTIONS.threads());
    let mut manager = FieldManager::new(device).map_err(|e| e.to_string())?;
    manager.load_field(&parameters).map_err(|e| e.to_string())?;

    let mut out: Box<dyn Write> = match OPTIONS.outfile.as_ref() {
        Some(path) => {
            let file = File::create(path).map_err(|e| format!("Unable to create '{path}': {e}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    if OPTIONS.year {
        let progress = if OPTIONS.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(OPTIONS.days as u64)
        };
        progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} days {msg}")
                .map_err(|e| e.to_string())?,
        );
        progress.set_message("Calculating light");

        let result = manager
            .calculate_year(OPTIONS.step, OPTIONS.days, &mut |day: u32, _: u32| {
                progress.set_position(day as u64)
            })
            .map_err(|e| e.to_string())?;
        progress.finish_with_message("done");

        write_year(&mut out, manager.sensor_names(), &result).map_err(|e| e.to_string())?;
    } else {
        let result = manager
            .calculate_moment(OPTIONS.hour, OPTIONS.day)
            .map_err(|e| e.to_string())?;
        write_moment(&mut out, manager.sensor_names(), &result).map_err(|e| e.to_string())?;
    }

    out.flush().map_err(|e| e.to_string())
}

/// Returns the field from the command line, with overrides applied.
fn load_parameters() -> field::Result<FieldParameters> {
    let mut parameters = match OPTIONS.field_file.as_ref() {
        Some(path) => FieldParameters::from_file(path)?,
        None => FieldParameters::new([4.0, 4.0], [4, 4]),
    };

    if let Some(latitude) = OPTIONS.latitude {
        parameters.field.latitude = latitude;
    }
    if let Some(render_size) = OPTIONS.render_size {
        parameters.sensors.render_size = render_size;
    }
    if let Some(count) = OPTIONS.diffuse_count {
        parameters.sensors.diffuse_light_count = count;
    }
    if !OPTIONS.quiet {
        info!("Field: {:?}", parameters);
    }
    Ok(parameters)
}
