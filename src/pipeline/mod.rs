//! Measurement orchestration.
//!
//! One call to [`MeasurementPipeline::measure`] walks a fixed sequence of
//! stages: mask acquisition (per configured method), optional refinement
//! and arbitration, principal-axis endpoint extraction, and millimetre
//! conversion. Each stage either produces its output or exits the call with
//! a typed [`MeasureError`].
//!
//! Inference collaborators are deliberately unreliable: timeouts, missing
//! backends and empty candidate lists are all absorbed by degrading the
//! call to the Standard segmentation path on the full frame. Only the
//! terminal stages (extraction, conversion) fail the call outright.
//!
//! The pipeline is immutable during `measure`; independent frames may be
//! measured concurrently from separate threads.

pub mod candidates;
pub mod collaborators;
pub mod params;

pub use candidates::{best_box_candidate, best_mask_candidate, CandidateOptions};
pub use collaborators::{Detection, FixedScale, InferenceBackend, ScaleProvider};
pub use params::{MethodParams, PipelineParams};

use std::sync::Arc;
use std::time::Instant;

use crate::arbiter::MaskArbiter;
use crate::color::color_foreground_mask;
use crate::error::{InferenceError, MeasureError};
use crate::extract::EndpointExtractor;
use crate::image::FrameRgb8;
use crate::mask::morphology::{close, erode_n, fill_holes, open, Kernel};
use crate::mask::{largest_component, Mask};
use crate::quality::score_mask;
use crate::refine::PrecisionRefiner;
use crate::segment::StandardSegmenter;
use crate::types::{MeasureMethod, MeasurementResult, Provenance};

/// Output of the mask-acquisition stage, fed into extraction.
struct Acquired {
    mask: Mask,
    provenance: Provenance,
    agreement: Option<f32>,
    quality: Option<f32>,
    inference_ms: f64,
}

/// The measurement engine. Construct once, measure many frames.
pub struct MeasurementPipeline {
    params: PipelineParams,
    segmenter: StandardSegmenter,
    refiner: PrecisionRefiner,
    arbiter: MaskArbiter,
    extractor: EndpointExtractor,
    fastsam: Option<Arc<dyn InferenceBackend>>,
    yolo_seg: Option<Arc<dyn InferenceBackend>>,
    advanced: Option<Arc<dyn InferenceBackend>>,
}

impl MeasurementPipeline {
    pub fn new(params: PipelineParams) -> Self {
        Self {
            segmenter: StandardSegmenter::new(params.segment),
            refiner: PrecisionRefiner::new(params.refine),
            arbiter: MaskArbiter::new(params.arbiter),
            extractor: EndpointExtractor::new(params.extract),
            params,
            fastsam: None,
            yolo_seg: None,
            advanced: None,
        }
    }

    /// Attach an inference collaborator for one AI method. Attaching one to
    /// `Standard` is a no-op; that method never calls inference.
    pub fn with_backend(
        mut self,
        method: MeasureMethod,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        match method {
            MeasureMethod::Standard => {
                log::debug!("MeasurementPipeline::with_backend ignored for Standard")
            }
            MeasureMethod::FastSam => self.fastsam = Some(backend),
            MeasureMethod::YoloSeg => self.yolo_seg = Some(backend),
            MeasureMethod::Advanced => self.advanced = Some(backend),
        }
        self
    }

    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Measure one frame with the given method and calibration source.
    pub fn measure(
        &self,
        frame: &FrameRgb8,
        method: MeasureMethod,
        scale: &dyn ScaleProvider,
    ) -> Result<MeasurementResult, MeasureError> {
        let started = Instant::now();
        log::debug!(
            "MeasurementPipeline::measure {}x{} method={method:?}",
            frame.width(),
            frame.height()
        );

        let acquired = match method {
            MeasureMethod::Standard => self.acquire_standard(frame, 0.0)?,
            MeasureMethod::FastSam => self.acquire_fastsam(frame)?,
            MeasureMethod::YoloSeg => self.acquire_yolo_seg(frame)?,
            MeasureMethod::Advanced => self.acquire_advanced(frame)?,
        };
        log::debug!(
            "MeasurementPipeline::measure mask acquired provenance={:?} area={}",
            acquired.provenance,
            acquired.mask.area()
        );

        let endpoints = self.extractor.extract(&acquired.mask)?;

        let mm_per_px = scale
            .millimeters_per_pixel()
            .filter(|v| *v > 0.0)
            .ok_or(MeasureError::CalibrationUnavailable)?;

        let latency_ms = started.elapsed().as_secs_f64() * 1e3;
        log::debug!(
            "MeasurementPipeline::measure done length={:.2}mm width={:.2}mm in {latency_ms:.1}ms",
            endpoints.length_px * mm_per_px,
            endpoints.width_px * mm_per_px
        );
        Ok(MeasurementResult {
            method,
            provenance: acquired.provenance,
            length_px: endpoints.length_px,
            width_px: endpoints.width_px,
            length_mm: endpoints.length_px * mm_per_px,
            width_mm: endpoints.width_px * mm_per_px,
            agreement: acquired.agreement,
            quality: acquired.quality,
            latency_ms,
            inference_ms: acquired.inference_ms,
        })
    }

    /// Standard path: classical segmentation on the full frame. Also the
    /// landing zone for every absorbed AI failure, which passes along the
    /// inference time already spent.
    fn acquire_standard(&self, frame: &FrameRgb8, inference_ms: f64) -> Result<Acquired, MeasureError> {
        let segmented = self.segmenter.segment(&frame.to_luma_f32())?;
        Ok(Acquired {
            mask: segmented.mask,
            provenance: Provenance::Standard,
            agreement: None,
            quality: Some(segmented.quality.score),
            inference_ms,
        })
    }

    fn run_inference(
        &self,
        backend: Option<&Arc<dyn InferenceBackend>>,
        frame: &FrameRgb8,
    ) -> (Result<Vec<Detection>, InferenceError>, f64) {
        let started = Instant::now();
        let result = match backend {
            Some(backend) => backend.detect(frame),
            None => Err(InferenceError::Unavailable),
        };
        (result, started.elapsed().as_secs_f64() * 1e3)
    }

    /// FastSAM path: best segmentation candidate, halo erosion, largest
    /// component. No refinement rival and no arbitration.
    fn acquire_fastsam(&self, frame: &FrameRgb8) -> Result<Acquired, MeasureError> {
        let (w, h) = (frame.width(), frame.height());
        let (result, inference_ms) = self.run_inference(self.fastsam.as_ref(), frame);
        let detections = match result {
            Ok(d) => d,
            Err(err) => {
                log::debug!("MeasurementPipeline::acquire_fastsam inference failed: {err}");
                return self.acquire_standard(frame, inference_ms);
            }
        };
        let Some((mask, _)) = best_mask_candidate(&detections, w, h, &self.params.candidates)
        else {
            log::debug!("MeasurementPipeline::acquire_fastsam no usable candidate");
            return self.acquire_standard(frame, inference_ms);
        };

        // Strong isotropic erosion strips the halo of soft-boundary bleed
        // FastSAM masks carry.
        let eroded = erode_n(
            &mask,
            Kernel::Square(self.params.method.fastsam_erode_size),
            self.params.method.fastsam_erode_iters,
        );
        let Some(component) = largest_component(&eroded) else {
            log::debug!("MeasurementPipeline::acquire_fastsam mask vanished under erosion");
            return self.acquire_standard(frame, inference_ms);
        };
        let quality = score_mask(&component.mask, &self.params.quality);
        Ok(Acquired {
            mask: component.mask,
            provenance: Provenance::AiFallback,
            agreement: None,
            quality: Some(quality.score),
            inference_ms,
        })
    }

    /// YOLO-Seg path: detector box expanded, edge refinement inside the
    /// ROI, arbitration between learned and refined masks.
    fn acquire_yolo_seg(&self, frame: &FrameRgb8) -> Result<Acquired, MeasureError> {
        let (w, h) = (frame.width(), frame.height());
        let (result, inference_ms) = self.run_inference(self.yolo_seg.as_ref(), frame);
        let detections = match result {
            Ok(d) => d,
            Err(err) => {
                log::debug!("MeasurementPipeline::acquire_yolo_seg inference failed: {err}");
                return self.acquire_standard(frame, inference_ms);
            }
        };
        let Some((learned, bbox)) = best_mask_candidate(&detections, w, h, &self.params.candidates)
        else {
            log::debug!("MeasurementPipeline::acquire_yolo_seg no usable candidate");
            return self.acquire_standard(frame, inference_ms);
        };
        // Collaborator boxes are not trusted: a degenerate or out-of-frame
        // box falls back to the learned mask's own extent.
        let roi = bbox
            .map(|b| b.clamped(w, h))
            .filter(|b| !b.is_empty())
            .or_else(|| learned.bounding_box());
        let Some(roi) = roi else {
            return self.acquire_standard(frame, inference_ms);
        };

        let roi = roi.expanded(self.params.method.yolo_margin, w, h);
        let refined = match self.refiner.refine(&frame.crop(roi)) {
            Ok(refined) => Some(refined.mask.embed(w, h, roi)),
            Err(err) => {
                log::debug!("MeasurementPipeline::acquire_yolo_seg refinement declined: {err}");
                None
            }
        };

        match self.arbiter.arbitrate(learned, refined) {
            Ok(arb) => {
                let quality = score_mask(&arb.mask, &self.params.quality);
                Ok(Acquired {
                    mask: arb.mask,
                    provenance: arb.provenance,
                    agreement: arb.agreement,
                    quality: Some(quality.score),
                    inference_ms,
                })
            }
            Err(err) => {
                log::debug!("MeasurementPipeline::acquire_yolo_seg arbitration failed: {err}");
                self.acquire_standard(frame, inference_ms)
            }
        }
    }

    /// Advanced path: box-prompted SAM-style mask behind a quality gate
    /// with a dark-object rescue, then a light local clean-up. The gate
    /// relaxes when only a point-prompted (box-less) candidate exists.
    fn acquire_advanced(&self, frame: &FrameRgb8) -> Result<Acquired, MeasureError> {
        let (w, h) = (frame.width(), frame.height());
        let method = &self.params.method;
        let (result, inference_ms) = self.run_inference(self.advanced.as_ref(), frame);
        let detections = match result {
            Ok(d) => d,
            Err(err) => {
                log::debug!("MeasurementPipeline::acquire_advanced inference failed: {err}");
                return self.acquire_standard(frame, inference_ms);
            }
        };

        let (learned, bbox, gate) =
            match best_box_candidate(&detections, w, h, &self.params.candidates) {
                Some((bbox, det)) => match det.mask {
                    Some(mask) => (mask, Some(bbox), method.advanced_gate),
                    None => {
                        log::debug!("MeasurementPipeline::acquire_advanced box without mask");
                        return self.acquire_standard(frame, inference_ms);
                    }
                },
                None => {
                    match best_mask_candidate(&detections, w, h, &self.params.candidates) {
                        Some((mask, bbox)) => (mask, bbox, method.advanced_gate_relaxed),
                        None => {
                            log::debug!("MeasurementPipeline::acquire_advanced no candidate");
                            return self.acquire_standard(frame, inference_ms);
                        }
                    }
                }
            };

        if learned.area_fraction(w * h) > self.params.arbiter.max_area_frac {
            log::debug!("MeasurementPipeline::acquire_advanced learned mask covers background");
            return self.acquire_standard(frame, inference_ms);
        }

        let learned_quality = score_mask(&learned, &self.params.quality);
        let (mut mask, mut quality, mut rescued) = (learned, learned_quality, false);
        if quality.score < gate {
            log::debug!(
                "MeasurementPipeline::acquire_advanced quality {:.3} below gate {gate:.2}, \
                 trying dark-object rescue",
                quality.score
            );
            let dark_raw = color_foreground_mask(
                frame,
                self.params.refine.border_ring,
                self.params.refine.delta_e_thresh,
            );
            let cleaned = fill_holes(&close(&dark_raw, Kernel::Square(method.advanced_clean_size)));
            let rescue = largest_component(&cleaned)
                .map(|comp| {
                    let q = score_mask(&comp.mask, &self.params.quality);
                    (comp.mask, q)
                })
                .filter(|(_, q)| {
                    q.score > quality.score && q.score >= method.advanced_gate_relaxed
                });
            match rescue {
                Some((dark_mask, dark_quality)) => {
                    log::debug!(
                        "MeasurementPipeline::acquire_advanced dark rescue {:.3}",
                        dark_quality.score
                    );
                    mask = dark_mask;
                    quality = dark_quality;
                    rescued = true;
                }
                None => return self.acquire_standard(frame, inference_ms),
            }
        }

        // Local close + open smooths the boundary without the full refiner.
        // The detector box no longer bounds a rescued mask.
        let clean_roi = if rescued { None } else { bbox }
            .map(|b| b.clamped(w, h))
            .filter(|b| !b.is_empty())
            .or_else(|| mask.bounding_box());
        if let Some(roi) = clean_roi {
            let roi = roi.expanded(method.advanced_margin, w, h);
            let crop = mask.crop(roi);
            let kernel = Kernel::Square(method.advanced_clean_size);
            let cleaned = open(&close(&crop, kernel), kernel);
            if let Some(comp) = largest_component(&cleaned) {
                mask = comp.mask.embed(w, h, roi);
            }
        }

        Ok(Acquired {
            mask,
            provenance: Provenance::AiFallback,
            agreement: None,
            quality: Some(quality.score),
            inference_ms,
        })
    }
}
