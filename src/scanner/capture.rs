//! The capture loop: tick, sample one frame, decode, emit a scan event.
//! Bound to the scanner view's lifetime through [`CaptureHandle`].

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::debug;

use crate::scanner::{decode::QrDecoder, frame::FrameSource};

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Sampling cadence; one frame is pulled and decoded per tick.
    pub interval: Duration,
    /// Stop the loop once a scan event has been accepted. Leaving the loop
    /// running would re-report the badge still held up to the camera.
    pub stop_on_scan: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(300),
            stop_on_scan: true,
        }
    }
}

/// Owns the running loop. `stop` cancels it; either way the frame source is
/// dropped when the task ends, which releases the camera.
pub struct CaptureHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CaptureHandle {
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    decoder: Arc<dyn QrDecoder>,
    config: CaptureConfig,
    events: mpsc::Sender<String>,
) -> CaptureHandle {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut tick = interval(config.interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_payload: Option<String> = None;

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = tick.tick() => {
                    let Some(frame) = source.next_frame() else { continue };
                    if !frame.has_pixels() {
                        continue;
                    }
                    let Some(payload) = decoder.decode(&frame.data, frame.width, frame.height)
                    else {
                        continue;
                    };
                    // The same badge sitting in front of the camera decodes
                    // on every tick; report it once.
                    if last_payload.as_deref() == Some(payload.as_str()) {
                        continue;
                    }
                    debug!(payload = %payload, "Scan event");
                    last_payload = Some(payload.clone());
                    if events.send(payload).await.is_err() {
                        break;
                    }
                    if config.stop_on_scan {
                        break;
                    }
                }
            }
        }
        // Dropping the source here is what releases the camera.
        drop(source);
    });

    CaptureHandle {
        stop: stop_tx,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::frame::Frame;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Scripted camera; flips `open` off when dropped, standing in for a
    /// released device stream.
    struct FakeSource {
        frames: std::vec::IntoIter<Option<Frame>>,
        open: Arc<AtomicBool>,
    }

    impl FakeSource {
        fn new(frames: Vec<Option<Frame>>) -> (Self, Arc<AtomicBool>) {
            let open = Arc::new(AtomicBool::new(true));
            (
                Self {
                    frames: frames.into_iter(),
                    open: open.clone(),
                },
                open,
            )
        }
    }

    impl FrameSource for FakeSource {
        fn next_frame(&mut self) -> Option<Frame> {
            self.frames.next().flatten()
        }
    }

    impl Drop for FakeSource {
        fn drop(&mut self) {
            self.open.store(false, Ordering::SeqCst);
        }
    }

    /// Decodes any frame whose first byte is 1 as the payload it carries in
    /// byte 1 (ASCII digit), everything else as no symbol.
    struct ByteDecoder;

    impl QrDecoder for ByteDecoder {
        fn decode(&self, data: &[u8], _w: u32, _h: u32) -> Option<String> {
            match data {
                [1, tag, ..] => Some(format!("E-{}", *tag as char)),
                _ => None,
            }
        }
    }

    fn payload_frame(tag: u8) -> Option<Frame> {
        Some(Frame {
            data: vec![1, tag, 0, 0],
            width: 1,
            height: 1,
        })
    }

    fn noise_frame() -> Option<Frame> {
        Some(Frame {
            data: vec![0, 0, 0, 0],
            width: 1,
            height: 1,
        })
    }

    fn fast() -> CaptureConfig {
        CaptureConfig {
            interval: Duration::from_millis(5),
            ..CaptureConfig::default()
        }
    }

    #[tokio::test]
    async fn skips_unready_frames_then_emits_and_stops() {
        // Not ready, zero-dimension, noise, then a decodable frame.
        let zero_dim = Some(Frame {
            data: vec![],
            width: 0,
            height: 0,
        });
        let (source, open) =
            FakeSource::new(vec![None, zero_dim, noise_frame(), payload_frame(b'7')]);
        let (tx, mut rx) = mpsc::channel(8);

        let handle = spawn_capture(Box::new(source), Arc::new(ByteDecoder), fast(), tx);

        assert_eq!(rx.recv().await.as_deref(), Some("E-7"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished());
        handle.stop().await;
        // stop_on_scan: nothing else was emitted and the camera is released.
        assert!(rx.recv().await.is_none());
        assert!(!open.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn identical_payload_is_reported_once() {
        let frames = vec![
            payload_frame(b'1'),
            payload_frame(b'1'),
            payload_frame(b'1'),
            payload_frame(b'2'),
        ];
        let (source, _open) = FakeSource::new(frames);
        let (tx, mut rx) = mpsc::channel(8);

        let config = CaptureConfig {
            stop_on_scan: false,
            ..fast()
        };
        let handle = spawn_capture(Box::new(source), Arc::new(ByteDecoder), config, tx);

        assert_eq!(rx.recv().await.as_deref(), Some("E-1"));
        assert_eq!(rx.recv().await.as_deref(), Some("E-2"));
        handle.stop().await;
    }

    #[tokio::test]
    async fn stop_releases_the_source_without_a_scan() {
        let (source, open) = FakeSource::new(vec![]);
        let (tx, _rx) = mpsc::channel(8);

        let handle = spawn_capture(Box::new(source), Arc::new(ByteDecoder), fast(), tx);
        assert!(open.load(Ordering::SeqCst));
        handle.stop().await;
        assert!(!open.load(Ordering::SeqCst));
    }
}
