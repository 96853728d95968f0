use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Turns one captured frame into per-bar pixel heights: Hann window,
/// forward FFT, peak-normalized magnitudes, equal-width bin aggregation,
/// sensitivity scaling. The FFT plan and window are built once; the work
/// buffers are reused across frames.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    chunk_size: usize,
    num_bars: usize,
}

impl SpectrumAnalyzer {
    pub fn new(chunk_size: usize, num_bars: usize) -> Self {
        assert!(chunk_size >= 2, "chunk size too small for a spectrum");
        assert!(num_bars > 0, "at least one bar required");

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(chunk_size);

        Self {
            fft,
            window: hann_window(chunk_size),
            buffer: vec![Complex::new(0.0, 0.0); chunk_size],
            magnitudes: vec![0.0; chunk_size / 2],
            chunk_size,
            num_bars,
        }
    }

    /// Compute bar heights for one frame. Heights are clamped to
    /// `[0, viewport_height]`; a silent frame yields all zeros.
    pub fn analyze(&mut self, frame: &[i16], viewport_height: u32, sensitivity: f32) -> Vec<u32> {
        // Frame size is fixed when the stream opens; a mismatch is a bug,
        // not an input condition.
        assert_eq!(frame.len(), self.chunk_size, "frame length mismatch");

        for (slot, (&sample, &w)) in self
            .buffer
            .iter_mut()
            .zip(frame.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample as f32 * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let half = self.chunk_size / 2;
        for (mag, c) in self.magnitudes.iter_mut().zip(self.buffer[..half].iter()) {
            *mag = c.norm();
        }

        // Normalize by the frame peak; silence divides by 1.0 so the
        // output stays finite and all-zero.
        let max = self.magnitudes.iter().cloned().fold(0.0f32, f32::max);
        let divisor = if max > 0.0 { max } else { 1.0 };

        let scale = viewport_height as f32 * sensitivity;
        bin_ranges(half, self.num_bars)
            .map(|(start, end)| {
                if start >= end {
                    return 0;
                }
                let sum: f32 = self.magnitudes[start..end].iter().sum();
                let mean = sum / divisor / (end - start) as f32;
                ((mean * scale).round() as u32).min(viewport_height)
            })
            .collect()
    }

}

/// Equal-width bin index ranges over `0..len`; the last bin absorbs the
/// remainder so no trailing magnitudes are dropped.
fn bin_ranges(len: usize, bins: usize) -> impl Iterator<Item = (usize, usize)> {
    let bin_size = len / bins;
    (0..bins).map(move |i| {
        let start = i * bin_size;
        let end = if i == bins - 1 { len } else { start + bin_size };
        (start, end)
    })
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHUNK: usize = 1024;
    const BARS: usize = 64;
    const HEIGHT: u32 = 400;

    #[test]
    fn silent_frame_yields_zero_bars() {
        let mut analyzer = SpectrumAnalyzer::new(CHUNK, BARS);
        let heights = analyzer.analyze(&vec![0i16; CHUNK], HEIGHT, 3.0);
        assert_eq!(heights.len(), BARS);
        assert!(heights.iter().all(|&h| h == 0));
    }

    #[test]
    fn heights_stay_within_viewport() {
        let mut analyzer = SpectrumAnalyzer::new(CHUNK, BARS);
        // Loud alternating signal pushes magnitudes to the extreme.
        let frame: Vec<i16> = (0..CHUNK)
            .map(|i| if i % 2 == 0 { i16::MAX } else { i16::MIN })
            .collect();
        for &sensitivity in &[0.1, 1.0, 3.0, 10.0] {
            let heights = analyzer.analyze(&frame, HEIGHT, sensitivity);
            assert!(heights.iter().all(|&h| h <= HEIGHT));
        }
    }

    #[test]
    fn constant_signal_raises_the_low_end() {
        let mut analyzer = SpectrumAnalyzer::new(CHUNK, BARS);
        let heights = analyzer.analyze(&vec![8_000i16; CHUNK], HEIGHT, 3.0);
        assert!(heights[0] > 0, "DC energy should land in the first bar");
    }

    #[test]
    fn bins_cover_spectrum_exactly_once() {
        for (len, bins) in [(512, 64), (100, 7), (64, 64), (130, 4)] {
            let ranges: Vec<_> = bin_ranges(len, bins).collect();
            assert_eq!(ranges.len(), bins);
            assert_eq!(ranges[0].0, 0);
            assert_eq!(ranges[bins - 1].1, len);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].1, pair[1].0, "bins must be contiguous");
            }
        }
    }

    #[test]
    fn last_bin_absorbs_remainder() {
        let ranges: Vec<_> = bin_ranges(100, 7).collect();
        // 100 / 7 = 14, so the final bin runs from 84 to 100.
        assert_eq!(ranges[6], (84, 100));
    }
}
