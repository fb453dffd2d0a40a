// src/prelude.rs
//
// `use ultrascan::prelude::*;` — всё, что обычно нужно вызывающему.

pub use crate::api::{BarcodeReader, DecodeEngine, DecodeResult, DecodeStatus};
pub use crate::binarize::{BitMatrix, HybridBinarizer};
pub use crate::bitmap::{BinaryBitmap, BitmapData, MemoryRaster, PixelLock, RasterError, RasterImage};
pub use crate::core::error::{LuminanceError, ScanError};
pub use crate::core::types::{BarcodeFormat, GrayImage, PixelFormat, Rotation, Rotations};
pub use crate::hints::{DecodeHints, ScanOptions};
pub use crate::luminance::{LuminanceSource, RawImageView};
pub use crate::result::ScanResult;
