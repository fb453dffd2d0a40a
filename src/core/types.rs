// src/core/types.rs
//
// Общие типы, независимые от конкретного движка распознавания.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

/// Пиксельные форматы, которые может сообщить графическая подсистема.
///
/// Поддерживаются только `Rgb24`, `Rgb32` и `Argb32` (см. [`crate::luminance::ChannelLayout`]).
/// Остальные варианты существуют, чтобы честно описать чужой буфер и отказать ему.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    Indexed1,
    Indexed4,
    Indexed8,
    Gray16,
    Rgb555,
    Rgb565,
    Argb1555,
    /// 3 байта на пиксель, порядок B, G, R.
    Rgb24,
    /// 4 байта на пиксель, B, G, R и неиспользуемый байт.
    Rgb32,
    /// 4 байта на пиксель, B, G, R, A.
    Argb32,
    /// Как `Argb32`, но цвет предумножен на альфу.
    Pargb32,
    Rgb48,
    Argb64,
    Pargb64,
    Cmyk32,
}

impl PixelFormat {
    /// Бит на пиксель (для расчёта минимального stride).
    #[inline]
    pub const fn bits_per_pixel(self) -> usize {
        match self {
            Self::Indexed1 => 1,
            Self::Indexed4 => 4,
            Self::Indexed8 => 8,
            Self::Gray16 | Self::Rgb555 | Self::Rgb565 | Self::Argb1555 => 16,
            Self::Rgb24 => 24,
            Self::Rgb32 | Self::Argb32 | Self::Pargb32 | Self::Cmyk32 => 32,
            Self::Rgb48 => 48,
            Self::Argb64 | Self::Pargb64 => 64,
        }
    }

    /// Байт на строку без выравнивания (округление вверх для форматов < 8 бит).
    #[inline]
    pub fn row_bytes(self, width: usize) -> Option<usize> {
        width
            .checked_mul(self.bits_per_pixel())
            .map(|bits| bits.div_ceil(8))
    }
}

/// Минимальная длина буфера: все строки, кроме последней, с шагом `stride`,
/// последняя — без выравнивающего хвоста.
#[inline]
pub fn required_buffer_len(stride: usize, height: usize, row_bytes: usize) -> Option<usize> {
    if height == 0 || row_bytes == 0 {
        return Some(0);
    }
    stride.checked_mul(height - 1)?.checked_add(row_bytes)
}

/// Символика штрих-кода.
///
/// Каноничные имена (`name`) совпадают с теми, что принимает фильтр форматов
/// в [`crate::hints::ScanOptions`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum BarcodeFormat {
    Aztec,
    Codabar,
    Code39,
    Code93,
    Code128,
    DataMatrix,
    Ean8,
    Ean13,
    Itf,
    MaxiCode,
    Pdf417,
    QrCode,
    Rss14,
    RssExpanded,
    UpcA,
    UpcE,
    UpcEanExtension,
}

impl BarcodeFormat {
    pub const ALL: [Self; 17] = [
        Self::Aztec,
        Self::Codabar,
        Self::Code39,
        Self::Code93,
        Self::Code128,
        Self::DataMatrix,
        Self::Ean8,
        Self::Ean13,
        Self::Itf,
        Self::MaxiCode,
        Self::Pdf417,
        Self::QrCode,
        Self::Rss14,
        Self::RssExpanded,
        Self::UpcA,
        Self::UpcE,
        Self::UpcEanExtension,
    ];

    /// Каноничное имя символики.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aztec => "AZTEC",
            Self::Codabar => "CODABAR",
            Self::Code39 => "CODE_39",
            Self::Code93 => "CODE_93",
            Self::Code128 => "CODE_128",
            Self::DataMatrix => "DATA_MATRIX",
            Self::Ean8 => "EAN_8",
            Self::Ean13 => "EAN_13",
            Self::Itf => "ITF",
            Self::MaxiCode => "MAXICODE",
            Self::Pdf417 => "PDF_417",
            Self::QrCode => "QR_CODE",
            Self::Rss14 => "RSS_14",
            Self::RssExpanded => "RSS_EXPANDED",
            Self::UpcA => "UPC_A",
            Self::UpcE => "UPC_E",
            Self::UpcEanExtension => "UPC_EAN_EXTENSION",
        }
    }

    /// Обратное к [`name`](Self::name). Сравнение точное, регистр важен.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Неизвестное имя символики.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown barcode format name: {0:?}")]
pub struct UnknownFormatName(pub String);

impl FromStr for BarcodeFormat {
    type Err = UnknownFormatName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownFormatName(s.to_owned()))
    }
}

/// Один поворот изображения (по часовой стрелке).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Rotation {
    Deg0,
    Deg180,
    /// 90° по часовой.
    Cw90,
    /// 270° по часовой, то же что 90° против.
    Ccw90,
}

impl Rotation {
    /// Порядок попыток: прямо, вверх ногами, затем два боковых положения.
    pub const TRY_ORDER: [Self; 4] = [Self::Deg0, Self::Deg180, Self::Cw90, Self::Ccw90];

    #[inline]
    pub const fn degrees_cw(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg180 => 180,
            Self::Cw90 => 90,
            Self::Ccw90 => 270,
        }
    }

    #[inline]
    pub const fn flag(self) -> Rotations {
        match self {
            Self::Deg0 => Rotations::ROTATE_0,
            Self::Deg180 => Rotations::ROTATE_180,
            Self::Cw90 => Rotations::CW_90,
            Self::Ccw90 => Rotations::CCW_90,
        }
    }

    /// Меняет ли поворот местами ширину и высоту.
    #[inline]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Cw90 | Self::Ccw90)
    }

    /// Повернуть плоскость `width × height` (row-major) в новый буфер.
    ///
    /// Для `Deg0` возвращается копия. Длина `data` обязана быть `width * height`.
    pub fn apply_to_plane<T: Copy>(self, data: &[T], width: usize, height: usize) -> Vec<T> {
        debug_assert_eq!(data.len(), width * height);
        let mut out = Vec::with_capacity(data.len());
        match self {
            Self::Deg0 => out.extend_from_slice(data),
            Self::Deg180 => out.extend(data.iter().rev().copied()),
            Self::Cw90 => {
                // новая строка y' — это исходный столбец x = y', снизу вверх
                for x in 0..width {
                    for y in (0..height).rev() {
                        out.push(data[y * width + x]);
                    }
                }
            }
            Self::Ccw90 => {
                for x in (0..width).rev() {
                    for y in 0..height {
                        out.push(data[y * width + x]);
                    }
                }
            }
        }
        out
    }
}

bitflags! {
    /// Маска разрешённых поворотов для одного скана.
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct Rotations: u8 {
        const ROTATE_0 = 0b0001;
        const ROTATE_180 = 0b0010;
        const CW_90 = 0b0100;
        const CCW_90 = 0b1000;
    }
}

impl Rotations {
    /// Разрешён ли данный поворот.
    #[inline]
    pub const fn permits(self, rotation: Rotation) -> bool {
        self.contains(rotation.flag())
    }
}

impl Default for Rotations {
    fn default() -> Self {
        Self::all()
    }
}

/// Заимствованное представление градаций серого.
/// Буфер `data` — построчно (row-major), 8 бит на пиксель.
#[derive(Clone, Copy, Debug)]
pub struct GrayImage<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> GrayImage<'a> {
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }
}
