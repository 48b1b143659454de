//! Owned 3-channel 8-bit frame in interleaved row-major layout.
//!
//! The immutable input of a measurement call. The core never mutates a frame
//! in place; every stage works on derived luminance/mask buffers or ROI
//! copies produced here.

use super::ImageF32;
use crate::roi::RoiRect;

#[derive(Clone, Debug)]
pub struct FrameRgb8 {
    w: usize,
    h: usize,
    /// Interleaved RGB bytes, `3 * w` per row.
    data: Vec<u8>,
}

impl FrameRgb8 {
    /// Construct a black frame of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0u8; w * h * 3],
        }
    }

    /// Wrap raw interleaved RGB bytes. `data.len()` must equal `3 * w * h`.
    pub fn from_raw(w: usize, h: usize, data: Vec<u8>) -> Self {
        assert_eq!(data.len(), w * h * 3, "RGB buffer size mismatch");
        Self { w, h, data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.w + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, px: [u8; 3]) {
        let i = (y * self.w + x) * 3;
        self.data[i] = px[0];
        self.data[i + 1] = px[1];
        self.data[i + 2] = px[2];
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Rec. 601 luminance as a normalized float buffer.
    pub fn to_luma_f32(&self) -> ImageF32 {
        let mut out = ImageF32::new(self.w, self.h);
        for (dst, px) in out.data.iter_mut().zip(self.data.chunks_exact(3)) {
            let l = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
            *dst = l / 255.0;
        }
        out
    }

    /// Copy a rectangular region into a new frame. The ROI must lie inside
    /// the frame bounds.
    pub fn crop(&self, roi: RoiRect) -> FrameRgb8 {
        assert!(
            roi.x1 <= self.w && roi.y1 <= self.h && !roi.is_empty(),
            "crop ROI out of bounds"
        );
        let (cw, ch) = (roi.width(), roi.height());
        let mut data = Vec::with_capacity(cw * ch * 3);
        for y in roi.y0..roi.y1 {
            let start = (y * self.w + roi.x0) * 3;
            data.extend_from_slice(&self.data[start..start + cw * 3]);
        }
        FrameRgb8 { w: cw, h: ch, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_copies_expected_pixels() {
        let mut frame = FrameRgb8::new(8, 6);
        frame.set(3, 2, [10, 20, 30]);
        let roi = RoiRect::new(2, 1, 6, 5);
        let crop = frame.crop(roi);
        assert_eq!(crop.width(), 4);
        assert_eq!(crop.height(), 4);
        assert_eq!(crop.get(1, 1), [10, 20, 30]);
    }

    #[test]
    fn luma_is_normalized() {
        let mut frame = FrameRgb8::new(2, 1);
        frame.set(0, 0, [255, 255, 255]);
        let luma = frame.to_luma_f32();
        assert!((luma.get(0, 0) - 1.0).abs() < 1e-3);
        assert!(luma.get(1, 0).abs() < 1e-6);
    }
}
