//! Outgoing frame queue
//!
//! Unbounded lock-free FIFO shared between the link worker (sole consumer)
//! and any number of producers. Producers are the session itself plus
//! front-end threads submitting commands through a `SessionHandle`.

use super::packet::to_hex;
use crossbeam_queue::SegQueue;
use std::time::Instant;

/// One encoded frame waiting to be written
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub enqueued_at: Instant,
    pub frame: Vec<u8>,
}

/// Thread-safe FIFO of encoded frames
#[derive(Debug, Default)]
pub struct CommandQueue {
    entries: SegQueue<QueueEntry>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, stamped with the current time
    pub fn enqueue(&self, frame: Vec<u8>) {
        log::trace!("Enqueued {}", to_hex(&frame));
        self.entries.push(QueueEntry {
            enqueued_at: Instant::now(),
            frame,
        });
    }

    /// Remove the oldest entry; never blocks
    pub fn dequeue(&self) -> Option<QueueEntry> {
        let entry = self.entries.pop()?;
        log::debug!(
            "Dequeued {} after {:.2}s",
            to_hex(&entry.frame),
            entry.enqueued_at.elapsed().as_secs_f64()
        );
        Some(entry)
    }

    /// Drop everything still staged
    pub fn clear(&self) {
        let mut dropped = 0usize;
        while self.entries.pop().is_some() {
            dropped += 1;
        }
        if dropped > 0 {
            log::debug!("Cleared {} staged frames", dropped);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fifo_order() {
        let queue = CommandQueue::new();
        assert!(queue.dequeue().is_none());

        queue.enqueue(vec![1]);
        queue.enqueue(vec![2]);
        queue.enqueue(vec![3]);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.dequeue().unwrap().frame, vec![1]);
        assert_eq!(queue.dequeue().unwrap().frame, vec![2]);
        assert_eq!(queue.dequeue().unwrap().frame, vec![3]);
        assert!(queue.dequeue().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_timestamps_monotonic() {
        let queue = CommandQueue::new();
        queue.enqueue(vec![1]);
        queue.enqueue(vec![2]);
        let first = queue.dequeue().unwrap();
        let second = queue.dequeue().unwrap();
        assert!(second.enqueued_at >= first.enqueued_at);
    }

    #[test]
    fn test_clear() {
        let queue = CommandQueue::new();
        for i in 0..10u8 {
            queue.enqueue(vec![i]);
        }
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_concurrent_producers() {
        let queue = Arc::new(CommandQueue::new());
        let handles: Vec<_> = (0..4u8)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    for i in 0..100u8 {
                        queue.enqueue(vec![producer, i]);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(queue.len(), 400);

        // Per-producer order is preserved
        let mut last_seen = [None::<u8>; 4];
        while let Some(entry) = queue.dequeue() {
            let (producer, seq) = (entry.frame[0] as usize, entry.frame[1]);
            if let Some(prev) = last_seen[producer] {
                assert!(seq > prev);
            }
            last_seen[producer] = Some(seq);
        }
        assert!(last_seen.iter().all(|s| *s == Some(99)));
    }
}
