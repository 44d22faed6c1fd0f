pub mod capture;
pub mod decode;
pub mod frame;

pub use capture::{spawn_capture, CaptureConfig, CaptureHandle};
pub use decode::{QrDecoder, RqrrDecoder};
pub use frame::{Frame, FrameSource};
