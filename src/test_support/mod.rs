//! Fakes shared by the crate's unit tests.

mod gateway;
mod scanner;

pub use gateway::{issued_token, FakeGateway, FixedGeolocator};
pub use scanner::{qr, FakeCamera, FakeDetectorFactory};
