use qc_measure::config::load_config;
use qc_measure::image::io::{load_rgb_image, save_mask_png, write_json_file};
use qc_measure::pipeline::{FixedScale, MeasurementPipeline};
use qc_measure::profile::SizeGrade;
use qc_measure::segment::StandardSegmenter;
use qc_measure::MeasurementResult;
use serde::Serialize;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let frame = load_rgb_image(&config.input)?;
    let pipeline = MeasurementPipeline::new(config.params);
    let result = pipeline
        .measure(&frame, config.method, &FixedScale(config.mm_per_px))
        .map_err(|e| format!("Measurement failed: {e}"))?;

    println!(
        "Measured {}: length={:.1}mm width={:.1}mm ({:?}, {:?})",
        config.input.display(),
        result.length_mm,
        result.width_mm,
        result.method,
        result.provenance
    );

    let summary = MeasureSummary {
        passed: config.profile.as_ref().map(|p| p.check(&result)),
        grade: config.profile.as_ref().map(|p| p.grade(&result)),
        result,
    };
    if let (Some(passed), Some(grade)) = (summary.passed, summary.grade) {
        println!("Profile check: passed={passed} grade={grade:?}");
    }
    write_json_file(&config.output.result_json, &summary)?;

    if let Some(mask_path) = &config.output.mask_png {
        let segmented = StandardSegmenter::new(config.params.segment)
            .segment(&frame.to_luma_f32())
            .map_err(|e| format!("Mask dump failed: {e}"))?;
        save_mask_png(&segmented.mask, mask_path)?;
        println!("Saved mask to {}", mask_path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: measure_photo <config.json>".to_string()
}

#[derive(Debug, Serialize)]
struct MeasureSummary {
    result: MeasurementResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grade: Option<SizeGrade>,
}
