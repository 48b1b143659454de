use qc_measure::pipeline::{FixedScale, MeasurementPipeline, PipelineParams};
use qc_measure::types::MeasureMethod;
use qc_measure::FrameRgb8;

fn main() {
    // Demo stub: renders a synthetic article and measures it.
    let (w, h) = (640usize, 480usize);
    let mut frame = FrameRgb8::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let inside = (120..520).contains(&x) && (160..320).contains(&y);
            frame.set(x, y, if inside { [45, 40, 50] } else { [205, 205, 200] });
        }
    }

    let pipeline = MeasurementPipeline::new(PipelineParams::default());
    match pipeline.measure(&frame, MeasureMethod::Standard, &FixedScale(0.5)) {
        Ok(result) => println!(
            "length={:.1}mm width={:.1}mm provenance={:?} latency_ms={:.3}",
            result.length_mm, result.width_mm, result.provenance, result.latency_ms
        ),
        Err(err) => println!("measurement failed: {err}"),
    }
}
