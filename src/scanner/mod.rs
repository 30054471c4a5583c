//! Camera capture and QR decoding.
//!
//! [`CaptureLoop`] drives a [`CameraDevice`] and a [`BarcodeDetector`] frame by frame until a
//! code is decoded or the scan is cancelled. Browser implementations of the device traits live
//! behind the `wasm-web` feature.

mod capture;
mod constants;
mod device;
mod error;
mod logger;
mod types;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod web;

pub use capture::CaptureLoop;
pub use constants::{NATIVE_FRAME_INTERVAL, QR_CODE_FORMAT};
pub use device::{
    BarcodeDetector, CameraDevice, DetectorFactory, FrameClock, IntervalFrameClock,
    NoBarcodeDetection, VideoStream,
};
pub use error::{
    detection_error, device_unavailable, internal_error, permission_denied, ScannerError,
    ScannerErrorCode, ScannerResult,
};
pub use types::{
    BarcodeFormat, CaptureOutcome, CaptureStatus, DecoderAvailability, DetectedBarcode,
    FacingMode, FrameBuffer, MediaConstraints,
};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use web::{AnimationFrameClock, WebBarcodeDetectorFactory, WebCamera};
