// src/core/error.rs
//
// Ошибки пайплайна. «Код не найден» сюда не входит: это обычный результат
// (`ScanResult::NotFound`), а не сбой.

use crate::core::types::PixelFormat;

/// Ошибки построения яркостного представления.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LuminanceError {
    /// Формат вне фиксированного поддерживаемого набора.
    #[error("unsupported pixel format: {0:?}")]
    UnsupportedFormat(PixelFormat),

    /// Шаг строки меньше, чем занимают пиксели одной строки.
    #[error("row stride {stride} is smaller than one row of pixels ({row_bytes} bytes)")]
    StrideTooSmall { stride: usize, row_bytes: usize },

    /// Буфер короче, чем требует геометрия.
    #[error("pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    /// Переполнение при расчёте размеров.
    #[error("image dimensions {width}x{height} overflow the address space")]
    DimensionOverflow { width: usize, height: usize },
}

/// Ошибка одного вызова `scan`.
///
/// `E` — собственная ошибка графической подсистемы, передаётся без изменений.
#[derive(Debug, thiserror::Error)]
pub enum ScanError<E> {
    #[error(transparent)]
    Luminance(#[from] LuminanceError),

    #[error("failed to acquire the pixel buffer")]
    BufferAcquisition(#[source] E),
}

impl<E> ScanError<E> {
    /// Формат пикселей вне поддерживаемого набора?
    #[inline]
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::Luminance(LuminanceError::UnsupportedFormat(_)))
    }
}
