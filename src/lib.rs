#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc
)]

//! Мост между растровым изображением графической подсистемы и внешним движком
//! распознавания штрих-кодов.
//!
//! ```text
//! RasterImage ──lock──▶ RawImageView ──▶ LuminanceSource ──▶ BinaryBitmap
//!                  ◀─unlock─┘                                    │
//!                                     0° → 180° → 90° → 270° ◀───┘
//!                                              │
//!                             DecodeEngine ──▶ DecodeResult ──▶ ScanResult
//! ```

// Публичные модули
pub mod api;      // ридер: перебор поворотов, трейт DecodeEngine
pub mod core;     // общие типы и ошибки
pub mod prelude;  // удобные re-export'ы

pub mod binarize;  // бинаризация плоскости яркости
pub mod bitmap;    // захват буфера и BinaryBitmap
pub mod hints;     // опции скана → подсказки движку
pub mod luminance; // яркость из BGR(A)
pub mod result;    // внешний результат скана

pub use crate::api::{BarcodeReader, DecodeEngine, DecodeResult, DecodeStatus};
pub use crate::bitmap::{BinaryBitmap, MemoryRaster, RasterImage};
pub use crate::core::error::{LuminanceError, ScanError};
pub use crate::core::types::{BarcodeFormat, PixelFormat, Rotation, Rotations};
pub use crate::hints::{DecodeHints, ScanOptions};
pub use crate::result::ScanResult;

/// One-shot: собрать ридер и отсканировать одно изображение.
///
/// Если сканов много — создайте [`BarcodeReader`] один раз и переиспользуйте.
#[inline]
pub fn scan_once<E, I>(
    engine: E,
    options: &ScanOptions,
    image: &mut I,
    rotations: Rotations,
) -> Result<ScanResult, ScanError<I::Error>>
where
    E: DecodeEngine,
    I: RasterImage + ?Sized,
{
    BarcodeReader::new(engine, options).scan(image, rotations)
}
