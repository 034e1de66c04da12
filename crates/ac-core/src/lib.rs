/// Configuration, types, and shared structures for asciicam.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the asciicam workspace.

pub mod capture;
pub mod charset;
pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use capture::{CaptureController, CaptureState};
pub use charset::DensityProfile;
pub use config::{RenderConfig, Settings};
pub use error::{CameraFailure, CoreError};
pub use frame::{CharacterGrid, FrameBuffer, LuminanceGrid};
pub use traits::{StreamInfo, VideoSource};
