use std::fmt;

use crate::scanner::constants::QR_CODE_FORMAT;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BarcodeFormat {
    QrCode,
    /// Any other format name reported by the platform detector.
    Other(String),
}

impl BarcodeFormat {
    pub fn from_name(name: &str) -> Self {
        if name == QR_CODE_FORMAT {
            BarcodeFormat::QrCode
        } else {
            BarcodeFormat::Other(name.to_owned())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            BarcodeFormat::QrCode => QR_CODE_FORMAT,
            BarcodeFormat::Other(name) => name,
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetectedBarcode {
    pub raw_value: String,
    pub format: BarcodeFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera on phones.
    Environment,
    User,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

/// Video acquisition request. Audio is never requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Preferred (not required) camera direction.
    pub facing_mode: FacingMode,
}

impl MediaConstraints {
    pub fn rear_camera() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
        }
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self::rear_camera()
    }
}

/// Off-screen RGBA raster that video frames are copied into before detection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self::default();
        buffer.resize(width, height);
        buffer
    }

    /// Matches the raster to the stream's native resolution; a no-op when unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderAvailability {
    Available,
    /// The camera works but QR decoding is not supported here.
    Unavailable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureStatus {
    Starting,
    Live { decoder: DecoderAvailability },
    Unavailable { reason: String },
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    Decoded(String),
    Cancelled,
}
