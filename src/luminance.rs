//! Яркостный адаптер: сырой буфер пикселей + формат → одноканальная плоскость.
//!
//! Поддерживаемый набор фиксирован и описан [`ChannelLayout`]: для каждого формата
//! заранее известны размер пикселя и смещения каналов R/G/B. Альфа игнорируется,
//! поэтому `Rgb32` и `Argb32` дают одинаковую яркость при одинаковых цветах.

use crate::core::error::LuminanceError;
use crate::core::types::{required_buffer_len, GrayImage, PixelFormat, Rotation};

/// Раскладка каналов для поддерживаемых форматов.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChannelLayout {
    /// B, G, R.
    Bgr24,
    /// B, G, R, X.
    Bgrx32,
    /// B, G, R, A.
    Bgra32,
}

/// Смещения цветовых каналов внутри пикселя (в байтах).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChannelOffsets {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl ChannelLayout {
    /// Сопоставить формат раскладке; всё вне набора — ошибка.
    pub fn for_format(format: PixelFormat) -> Result<Self, LuminanceError> {
        match format {
            PixelFormat::Rgb24 => Ok(Self::Bgr24),
            PixelFormat::Rgb32 => Ok(Self::Bgrx32),
            PixelFormat::Argb32 => Ok(Self::Bgra32),
            other => Err(LuminanceError::UnsupportedFormat(other)),
        }
    }

    #[inline]
    pub const fn pixel_bytes(self) -> usize {
        match self {
            Self::Bgr24 => 3,
            Self::Bgrx32 | Self::Bgra32 => 4,
        }
    }

    #[inline]
    pub const fn offsets(self) -> ChannelOffsets {
        // во всех трёх форматах порядок байт одинаковый: B, G, R
        ChannelOffsets {
            red: 2,
            green: 1,
            blue: 0,
        }
    }

    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::Bgra32)
    }
}

/// Целочисленная яркость, веса ≈ 0.299/0.587/0.114 в масштабе 1024.
#[inline]
pub fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (306 * u32::from(r) + 601 * u32::from(g) + 117 * u32::from(b) + 0x200) >> 10;
    u8::try_from(y).unwrap_or(u8::MAX)
}

/// Невладеющее представление чужого буфера пикселей.
///
/// Живёт не дольше блокировки буфера, из которой получено.
#[derive(Clone, Copy, Debug)]
pub struct RawImageView<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    /// Шаг строки в байтах (>= ширина строки).
    pub stride: usize,
    pub format: PixelFormat,
}

impl<'a> RawImageView<'a> {
    #[inline]
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
    }

    /// Проверить геометрию и вернуть (раскладка, байт в строке).
    fn validate(&self) -> Result<(ChannelLayout, usize), LuminanceError> {
        let layout = ChannelLayout::for_format(self.format)?;
        let overflow = LuminanceError::DimensionOverflow {
            width: self.width,
            height: self.height,
        };

        let row_bytes = self
            .width
            .checked_mul(layout.pixel_bytes())
            .ok_or(overflow.clone())?;
        self.width.checked_mul(self.height).ok_or(overflow.clone())?;

        if self.stride < row_bytes {
            return Err(LuminanceError::StrideTooSmall {
                stride: self.stride,
                row_bytes,
            });
        }

        let expected = required_buffer_len(self.stride, self.height, row_bytes).ok_or(overflow)?;
        if self.data.len() < expected {
            return Err(LuminanceError::BufferTooSmall {
                expected,
                actual: self.data.len(),
            });
        }

        Ok((layout, row_bytes))
    }
}

/// Владеющая одноканальная плоскость яркости.
///
/// Размеры всегда совпадают с исходным изображением (или переставлены после поворота).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LuminanceSource {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl LuminanceSource {
    /// Извлечь яркость из сырого буфера. Исходный буфер не меняется.
    pub fn from_view(view: &RawImageView<'_>) -> Result<Self, LuminanceError> {
        let (layout, row_bytes) = view.validate()?;
        let px = layout.pixel_bytes();
        let ChannelOffsets { red, green, blue } = layout.offsets();

        let mut data = Vec::with_capacity(view.width * view.height);
        if row_bytes == 0 {
            return Ok(Self {
                data,
                width: view.width,
                height: view.height,
            });
        }
        for y in 0..view.height {
            let start = y * view.stride;
            let row = &view.data[start..start + row_bytes];
            data.extend(
                row.chunks_exact(px)
                    .map(|p| rgb_to_luma(p[red], p[green], p[blue])),
            );
        }

        Ok(Self {
            data,
            width: view.width,
            height: view.height,
        })
    }

    /// Готовая плоскость серого (например, из тестов или другого источника).
    ///
    /// `None`, если длина не равна `width * height`.
    pub fn from_luma(data: Vec<u8>, width: usize, height: usize) -> Option<Self> {
        (width.checked_mul(height)? == data.len()).then_some(Self {
            data,
            width,
            height,
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
    pub fn matrix(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[u8] {
        self.as_gray().row(y)
    }

    #[inline]
    pub fn as_gray(&self) -> GrayImage<'_> {
        GrayImage {
            data: &self.data,
            width: self.width,
            height: self.height,
        }
    }

    /// Новая плоскость, повёрнутая на `rotation`; исходная не меняется.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let (width, height) = if rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Self {
            data: rotation.apply_to_plane(&self.data, self.width, self.height),
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bgr_pixel(r: u8, g: u8, b: u8, px: usize) -> Vec<u8> {
        let mut p = vec![b, g, r];
        p.resize(px, 0xAB);
        p
    }

    #[test]
    fn luma_weights_hit_extremes() {
        assert_eq!(rgb_to_luma(0, 0, 0), 0);
        assert_eq!(rgb_to_luma(255, 255, 255), 255);
        // зелёный весит больше красного, красный больше синего
        assert!(rgb_to_luma(0, 200, 0) > rgb_to_luma(200, 0, 0));
        assert!(rgb_to_luma(200, 0, 0) > rgb_to_luma(0, 0, 200));
    }

    #[test]
    fn supported_formats_map_to_layouts() {
        assert_eq!(ChannelLayout::for_format(PixelFormat::Rgb24), Ok(ChannelLayout::Bgr24));
        assert_eq!(ChannelLayout::for_format(PixelFormat::Rgb32), Ok(ChannelLayout::Bgrx32));
        assert_eq!(ChannelLayout::for_format(PixelFormat::Argb32), Ok(ChannelLayout::Bgra32));
        assert!(ChannelLayout::Bgra32.has_alpha());
        assert!(!ChannelLayout::Bgrx32.has_alpha());
    }

    #[test]
    fn unsupported_formats_are_rejected() {
        for f in [
            PixelFormat::Indexed8,
            PixelFormat::Rgb565,
            PixelFormat::Pargb32,
            PixelFormat::Argb64,
            PixelFormat::Cmyk32,
        ] {
            assert_eq!(
                ChannelLayout::for_format(f),
                Err(LuminanceError::UnsupportedFormat(f))
            );
        }
    }

    #[test]
    fn alpha_does_not_change_luma() {
        let mut rgb32 = bgr_pixel(10, 120, 240, 4);
        let mut argb32 = rgb32.clone();
        rgb32[3] = 0;
        argb32[3] = 7;
        let a = LuminanceSource::from_view(&RawImageView::new(&rgb32, 1, 1, 4, PixelFormat::Rgb32))
            .expect("rgb32");
        let b = LuminanceSource::from_view(&RawImageView::new(&argb32, 1, 1, 4, PixelFormat::Argb32))
            .expect("argb32");
        assert_eq!(a.matrix(), b.matrix());
        assert_eq!(a.matrix()[0], rgb_to_luma(10, 120, 240));
    }

    #[test]
    fn stride_padding_is_skipped() {
        // 2×2 Rgb24, stride 8 (2 байта мусора в конце строки)
        let mut buf = Vec::new();
        buf.extend(bgr_pixel(255, 255, 255, 3));
        buf.extend(bgr_pixel(0, 0, 0, 3));
        buf.extend([0xEE, 0xEE]);
        buf.extend(bgr_pixel(0, 0, 0, 3));
        buf.extend(bgr_pixel(255, 255, 255, 3));
        // последняя строка без хвоста: его может и не быть
        let src = LuminanceSource::from_view(&RawImageView::new(&buf, 2, 2, 8, PixelFormat::Rgb24))
            .expect("luma");
        assert_eq!(src.matrix(), &[255, 0, 0, 255]);
        assert_eq!(src.row(1), &[0, 255]);
    }

    #[test]
    fn geometry_errors() {
        let buf = vec![0u8; 10];
        assert_eq!(
            LuminanceSource::from_view(&RawImageView::new(&buf, 4, 1, 8, PixelFormat::Rgb24)),
            Err(LuminanceError::StrideTooSmall { stride: 8, row_bytes: 12 })
        );
        assert_eq!(
            LuminanceSource::from_view(&RawImageView::new(&buf, 2, 2, 8, PixelFormat::Argb32)),
            Err(LuminanceError::BufferTooSmall { expected: 16, actual: 10 })
        );
        assert!(matches!(
            LuminanceSource::from_view(&RawImageView::new(&buf, usize::MAX, 2, 8, PixelFormat::Rgb32)),
            Err(LuminanceError::DimensionOverflow { .. })
        ));
    }

    #[test]
    fn empty_image_is_fine() {
        let src = LuminanceSource::from_view(&RawImageView::new(&[], 0, 0, 0, PixelFormat::Rgb24))
            .expect("empty");
        assert_eq!((src.width(), src.height()), (0, 0));
        assert!(src.matrix().is_empty());
    }

    #[test]
    fn rotated_swaps_dimensions() {
        let src = LuminanceSource::from_luma(vec![1, 2, 3, 4, 5, 6], 3, 2).expect("plane");
        let r = src.rotated(Rotation::Cw90);
        assert_eq!((r.width(), r.height()), (2, 3));
        assert_eq!(r.matrix(), &[4, 1, 5, 2, 6, 3]);
        // оригинал не тронут
        assert_eq!(src.matrix(), &[1, 2, 3, 4, 5, 6]);
        assert!(LuminanceSource::from_luma(vec![0; 5], 3, 2).is_none());
    }

    proptest! {
        #[test]
        fn prop_dimensions_match_input(
            width in 0usize..24,
            height in 0usize..24,
            pad in 0usize..5,
            fmt in prop::sample::select(vec![PixelFormat::Rgb24, PixelFormat::Rgb32, PixelFormat::Argb32]),
            seed in any::<u8>(),
        ) {
            let px = ChannelLayout::for_format(fmt).unwrap().pixel_bytes();
            let stride = width * px + pad;
            let data: Vec<u8> = (0..stride * height)
                .map(|i| u8::try_from(i % 256).unwrap().wrapping_mul(31).wrapping_add(seed))
                .collect();
            let src = LuminanceSource::from_view(&RawImageView::new(&data, width, height, stride, fmt)).unwrap();
            prop_assert_eq!(src.width(), width);
            prop_assert_eq!(src.height(), height);
            prop_assert_eq!(src.matrix().len(), width * height);
        }
    }
}
