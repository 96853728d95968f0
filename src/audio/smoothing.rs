/// Per-bar moving average over the last `capacity` raw heights.
///
/// The history is one flat arena indexed by `(bar, slot)` with a single
/// shared write cursor: every bar receives exactly one sample per frame,
/// so the cursors never diverge and nothing reallocates on the hot path.
/// Running sums make each emit O(bars) instead of O(bars * capacity).
pub struct BarSmoother {
    history: Vec<u32>,
    sums: Vec<u64>,
    num_bars: usize,
    capacity: usize,
    cursor: usize,
    filled: usize,
}

impl BarSmoother {
    pub fn new(num_bars: usize, capacity: usize) -> Self {
        assert!(num_bars > 0 && capacity > 0);
        Self {
            history: vec![0; num_bars * capacity],
            sums: vec![0; num_bars],
            num_bars,
            capacity,
            cursor: 0,
            filled: 0,
        }
    }

    /// Append one raw height per bar (evicting the oldest at capacity) and
    /// emit the truncated integer mean of each bar's current window.
    pub fn smooth(&mut self, raw: &[u32]) -> Vec<u32> {
        assert_eq!(raw.len(), self.num_bars, "bar count mismatch");

        for (bar, &height) in raw.iter().enumerate() {
            let slot = bar * self.capacity + self.cursor;
            self.sums[bar] += u64::from(height);
            self.sums[bar] -= u64::from(self.history[slot]);
            self.history[slot] = height;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        if self.filled < self.capacity {
            self.filled += 1;
        }

        let len = self.filled as u64;
        self.sums.iter().map(|&sum| (sum / len) as u32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 20;

    #[test]
    fn identical_inputs_converge_to_the_input() {
        let mut smoother = BarSmoother::new(3, CAP);
        let mut out = Vec::new();
        for _ in 0..CAP {
            out = smoother.smooth(&[120, 7, 0]);
        }
        assert_eq!(out, vec![120, 7, 0]);
    }

    #[test]
    fn outlier_influence_is_bounded_by_history_length() {
        let mut smoother = BarSmoother::new(1, CAP);
        for _ in 0..CAP {
            smoother.smooth(&[0]);
        }
        let out = smoother.smooth(&[200]);
        // One spike over a full window moves the mean by at most spike/CAP.
        assert_eq!(out, vec![200 / CAP as u32]);
    }

    #[test]
    fn eviction_forgets_old_values() {
        let mut smoother = BarSmoother::new(1, 4);
        smoother.smooth(&[100]);
        for _ in 0..4 {
            smoother.smooth(&[20]);
        }
        // The initial 100 has been evicted; only 20s remain.
        assert_eq!(smoother.smooth(&[20]), vec![20]);
    }

    #[test]
    fn partial_window_averages_what_it_has() {
        let mut smoother = BarSmoother::new(1, CAP);
        smoother.smooth(&[10]);
        let out = smoother.smooth(&[20]);
        assert_eq!(out, vec![15]);
    }

}
