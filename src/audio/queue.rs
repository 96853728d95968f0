use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// One fixed-size batch of mono samples as delivered by the capture callback.
pub type AudioFrame = Vec<i16>;

/// Bounded FIFO bridging the capture callback and the analysis thread.
///
/// Both ends are non-blocking: the callback must never wait, and the
/// analysis loop polls. When the analysis side falls behind, the oldest
/// frame is evicted so latency and memory stay bounded.
pub struct FrameQueue {
    inner: ArrayQueue<AudioFrame>,
    dropped: AtomicU64,
}

impl FrameQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: ArrayQueue::new(capacity),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue a frame, evicting the oldest one if the queue is full.
    /// Safe to call from the real-time capture callback.
    pub fn push(&self, frame: AudioFrame) {
        if self.inner.force_push(frame).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Dequeue the oldest frame, or `None` when the queue is empty.
    pub fn try_pop(&self) -> Option<AudioFrame> {
        self.inner.pop()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of frames evicted since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(tag: i16) -> AudioFrame {
        vec![tag; 4]
    }

    #[test]
    fn pops_in_push_order() {
        let queue = FrameQueue::with_capacity(8);
        queue.push(frame(1));
        queue.push(frame(2));
        queue.push(frame(3));

        assert_eq!(queue.try_pop(), Some(frame(1)));
        assert_eq!(queue.try_pop(), Some(frame(2)));
        assert_eq!(queue.try_pop(), Some(frame(3)));
    }

    #[test]
    fn empty_pop_returns_none() {
        let queue = FrameQueue::with_capacity(4);
        assert_eq!(queue.try_pop(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn evicts_oldest_when_full() {
        let queue = FrameQueue::with_capacity(2);
        queue.push(frame(1));
        queue.push(frame(2));
        queue.push(frame(3));

        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.try_pop(), Some(frame(2)));
        assert_eq!(queue.try_pop(), Some(frame(3)));
        assert_eq!(queue.try_pop(), None);
    }
}
