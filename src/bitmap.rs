//! Построение `BinaryBitmap` из растрового изображения графической подсистемы.
//!
//! Буфер пикселей захватывается через [`PixelLock`] и отпускается в `Drop`,
//! то есть ровно один раз на любом пути выхода: успех или ошибка через `?`.
//! При панике буфер отпускается только со стратегией `panic = "unwind"`;
//! с `panic = "abort"` (профиль release этого крейта) процесс завершается без раскрутки.

use std::borrow::Cow;

use crate::binarize::{BitMatrix, HybridBinarizer};
use crate::core::error::ScanError;
use crate::core::types::{required_buffer_len, GrayImage, PixelFormat, Rotation};
use crate::luminance::{LuminanceSource, RawImageView};

/// Описание заблокированного буфера (аналог `BitmapData`).
#[derive(Debug, Eq, PartialEq)]
pub struct BitmapData {
    pub width: usize,
    pub height: usize,
    /// Шаг строки в байтах.
    pub stride: usize,
    pub format: PixelFormat,
}

/// Растровое изображение с блокируемым буфером пикселей.
///
/// Пока буфер заблокирован, другие читатели/писатели не допускаются;
/// каждый успешный `lock_bits` обязан закрываться `unlock_bits`.
pub trait RasterImage {
    type Error: std::error::Error + Send + Sync + 'static;

    fn lock_bits(&mut self) -> Result<BitmapData, Self::Error>;

    /// Байты заблокированного буфера, начиная с первой строки.
    fn pixels(&self, data: &BitmapData) -> &[u8];

    fn unlock_bits(&mut self, data: &BitmapData);
}

/// Захваченный буфер; отпускается при уничтожении (в том числе при раскрутке паники,
/// но не при `panic = "abort"`).
pub struct PixelLock<'a, I: RasterImage + ?Sized> {
    image: &'a mut I,
    data: BitmapData,
}

impl<'a, I: RasterImage + ?Sized> PixelLock<'a, I> {
    pub fn acquire(image: &'a mut I) -> Result<Self, I::Error> {
        let data = image.lock_bits()?;
        Ok(Self { image, data })
    }

    #[inline]
    pub fn data(&self) -> &BitmapData {
        &self.data
    }

    pub fn view(&self) -> RawImageView<'_> {
        RawImageView::new(
            self.image.pixels(&self.data),
            self.data.width,
            self.data.height,
            self.data.stride,
            self.data.format,
        )
    }
}

impl<I: RasterImage + ?Sized> Drop for PixelLock<'_, I> {
    fn drop(&mut self) {
        self.image.unlock_bits(&self.data);
    }
}

/// Ошибки [`MemoryRaster`].
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum RasterError {
    #[error("pixel buffer is already locked")]
    AlreadyLocked,

    #[error("pixel buffer too small: expected at least {expected} bytes, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("raster dimensions {width}x{height} overflow the address space")]
    DimensionOverflow { width: usize, height: usize },
}

/// Растровое изображение в памяти: владеет пикселями, помнит состояние блокировки.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    data: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    locked: bool,
}

impl MemoryRaster {
    /// Плотно упакованные строки (stride = ширина строки в байтах).
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self, RasterError> {
        let stride = format
            .row_bytes(width)
            .ok_or(RasterError::DimensionOverflow { width, height })?;
        Self::with_stride(data, width, height, stride, format)
    }

    pub fn with_stride(
        data: Vec<u8>,
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self, RasterError> {
        let overflow = RasterError::DimensionOverflow { width, height };
        let row_bytes = format.row_bytes(width).ok_or(overflow.clone())?;
        let expected = required_buffer_len(stride, height, row_bytes).ok_or(overflow)?;
        if data.len() < expected {
            return Err(RasterError::BufferTooSmall {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
            locked: false,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Изменить пиксели; при активной блокировке — ошибка.
    pub fn pixels_mut(&mut self) -> Result<&mut [u8], RasterError> {
        if self.locked {
            return Err(RasterError::AlreadyLocked);
        }
        Ok(&mut self.data)
    }
}

impl RasterImage for MemoryRaster {
    type Error = RasterError;

    fn lock_bits(&mut self) -> Result<BitmapData, Self::Error> {
        if self.locked {
            return Err(RasterError::AlreadyLocked);
        }
        self.locked = true;
        Ok(BitmapData {
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        })
    }

    fn pixels(&self, _data: &BitmapData) -> &[u8] {
        &self.data
    }

    fn unlock_bits(&mut self, _data: &BitmapData) {
        self.locked = false;
    }
}

/// Бинарное изображение: яркость + её бинаризация.
///
/// Поворот создаёт новый bitmap, исходный не меняется.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinaryBitmap {
    luminance: LuminanceSource,
    matrix: BitMatrix,
}

impl BinaryBitmap {
    pub fn new(luminance: LuminanceSource, binarizer: &HybridBinarizer) -> Self {
        let matrix = binarizer.binarize(&luminance);
        Self { luminance, matrix }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.matrix.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.matrix.height()
    }

    #[inline]
    pub fn luminance(&self) -> GrayImage<'_> {
        self.luminance.as_gray()
    }

    #[inline]
    pub fn luminance_source(&self) -> &LuminanceSource {
        &self.luminance
    }

    #[inline]
    pub fn black_matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    /// Повёрнутый вариант; для `Deg0` — заимствование без копии.
    pub fn rotated(&self, rotation: Rotation) -> Cow<'_, Self> {
        match rotation {
            Rotation::Deg0 => Cow::Borrowed(self),
            r => Cow::Owned(Self {
                luminance: self.luminance.rotated(r),
                matrix: self.matrix.rotated(r),
            }),
        }
    }
}

/// Захватить буфер, построить яркость и бинаризацию, отпустить буфер.
///
/// Буфер отпускается до того, как ошибка станет видна вызывающему.
pub fn create_binary_bitmap<I: RasterImage + ?Sized>(
    image: &mut I,
    binarizer: &HybridBinarizer,
) -> Result<BinaryBitmap, ScanError<I::Error>> {
    let lock = PixelLock::acquire(image).map_err(ScanError::BufferAcquisition)?;
    let luminance = LuminanceSource::from_view(&lock.view())?;
    let bitmap = BinaryBitmap::new(luminance, binarizer);
    drop(lock);
    Ok(bitmap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LuminanceError;

    fn white_rgb24(w: usize, h: usize) -> MemoryRaster {
        MemoryRaster::new(vec![255; w * h * 3], w, h, PixelFormat::Rgb24).expect("raster")
    }

    #[test]
    fn lock_is_released_after_success() {
        let mut img = white_rgb24(4, 3);
        let bmp = create_binary_bitmap(&mut img, &HybridBinarizer::default()).expect("bitmap");
        assert!(!img.is_locked());
        assert_eq!((bmp.width(), bmp.height()), (4, 3));
        assert_eq!(bmp.black_matrix().count_dark(), 0);
    }

    #[test]
    fn lock_is_released_after_unsupported_format() {
        let mut img = MemoryRaster::new(vec![0; 16], 4, 4, PixelFormat::Indexed8).expect("raster");
        let err = create_binary_bitmap(&mut img, &HybridBinarizer::default()).unwrap_err();
        assert!(err.is_unsupported_format());
        assert!(!img.is_locked());
    }

    #[test]
    fn lock_is_released_after_geometry_error() {
        // stride меньше строки — ошибка яркостного адаптера
        let mut img =
            MemoryRaster::with_stride(vec![0; 16], 4, 2, 4, PixelFormat::Rgb24).expect("raster");
        let err = create_binary_bitmap(&mut img, &HybridBinarizer::default()).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Luminance(LuminanceError::StrideTooSmall { stride: 4, row_bytes: 12 })
        ));
        assert!(!img.is_locked());
    }

    #[test]
    fn acquisition_failure_is_propagated_unchanged() {
        let mut img = white_rgb24(2, 2);
        let _held = img.lock_bits().expect("first lock");
        let err = create_binary_bitmap(&mut img, &HybridBinarizer::default()).unwrap_err();
        assert!(matches!(err, ScanError::BufferAcquisition(RasterError::AlreadyLocked)));
        // чужую блокировку не трогаем
        assert!(img.is_locked());
    }

    #[test]
    fn pixel_lock_guard_unlocks_on_drop() {
        let mut img = white_rgb24(2, 2);
        {
            let lock = PixelLock::acquire(&mut img).expect("lock");
            assert_eq!(lock.view().data.len(), 12);
            assert_eq!(lock.data().format, PixelFormat::Rgb24);
        }
        assert!(!img.is_locked());
        assert!(img.pixels_mut().is_ok());
    }

    #[test]
    fn memory_raster_validates_buffer() {
        assert_eq!(
            MemoryRaster::new(vec![0; 5], 2, 1, PixelFormat::Rgb24).unwrap_err(),
            RasterError::BufferTooSmall { expected: 6, actual: 5 }
        );
        assert!(MemoryRaster::new(vec![], usize::MAX, 1, PixelFormat::Argb32).is_err());
    }

    #[test]
    fn last_row_without_padding_is_accepted() {
        // 2×2 Rgb24, stride 8: 8 + 6 байт, хвоста у последней строки нет
        assert_eq!(
            MemoryRaster::with_stride(vec![255; 13], 2, 2, 8, PixelFormat::Rgb24).unwrap_err(),
            RasterError::BufferTooSmall { expected: 14, actual: 13 }
        );
        let mut img =
            MemoryRaster::with_stride(vec![255; 14], 2, 2, 8, PixelFormat::Rgb24).expect("raster");
        let bmp = create_binary_bitmap(&mut img, &HybridBinarizer::default()).expect("bitmap");
        assert_eq!(bmp.luminance_source().matrix(), &[255, 255, 255, 255]);
        assert!(!img.is_locked());
    }

    #[test]
    fn rotated_deg0_borrows() {
        let mut img = white_rgb24(3, 2);
        let bmp = create_binary_bitmap(&mut img, &HybridBinarizer::default()).expect("bitmap");
        assert!(matches!(bmp.rotated(Rotation::Deg0), Cow::Borrowed(_)));
        let side = bmp.rotated(Rotation::Ccw90);
        assert_eq!((side.width(), side.height()), (2, 3));
        assert_eq!(side.luminance().width, 2);
        assert_eq!((bmp.width(), bmp.height()), (3, 2));
    }
}
