/// One sampled camera frame: tightly packed RGBA, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn has_pixels(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Pull seam over whatever owns the camera. `None` means no frame is ready
/// yet (the device is warming up or between frames).
///
/// Dropping the source must release the device; the capture loop drops it
/// when it stops, so navigating away from the scanner never leaks a live
/// camera.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Option<Frame>;
}
