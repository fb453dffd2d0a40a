// src/api.rs
//
// Верхнеуровневый API. Сам движок распознавания — внешний (трейт `DecodeEngine`);
// здесь только пайплайн вокруг него: бинаризация, перебор поворотов, проекция результата.

use crate::binarize::HybridBinarizer;
use crate::bitmap::{create_binary_bitmap, BinaryBitmap, RasterImage};
use crate::core::error::ScanError;
use crate::core::types::{BarcodeFormat, Rotation, Rotations};
use crate::hints::{DecodeHints, ScanOptions};
use crate::result::ScanResult;

/// Статус одной попытки распознавания.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DecodeStatus {
    NoError,
    NotFound,
    FormatError,
    ChecksumError,
}

/// Результат одной попытки движка. Текст хранится в UTF-16, как его отдаёт движок.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeResult {
    status: DecodeStatus,
    format: Option<BarcodeFormat>,
    text: Vec<u16>,
}

impl DecodeResult {
    pub fn from_utf16(format: BarcodeFormat, text: Vec<u16>) -> Self {
        Self {
            status: DecodeStatus::NoError,
            format: Some(format),
            text,
        }
    }

    pub fn found(format: BarcodeFormat, text: &str) -> Self {
        Self::from_utf16(format, text.encode_utf16().collect())
    }

    pub fn failed(status: DecodeStatus) -> Self {
        Self {
            status,
            format: None,
            text: Vec::new(),
        }
    }

    #[inline]
    pub fn not_found() -> Self {
        Self::failed(DecodeStatus::NotFound)
    }

    #[inline]
    pub fn status(&self) -> DecodeStatus {
        self.status
    }

    #[inline]
    pub fn format(&self) -> Option<BarcodeFormat> {
        self.format
    }

    #[inline]
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    /// Успешно ли: статус без ошибки и символика известна.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.status == DecodeStatus::NoError && self.format.is_some()
    }
}

/// Внешний движок распознавания: бинарное изображение → результат.
pub trait DecodeEngine {
    fn decode(&self, image: &BinaryBitmap, hints: &DecodeHints) -> DecodeResult;
}

impl<F> DecodeEngine for F
where
    F: Fn(&BinaryBitmap, &DecodeHints) -> DecodeResult,
{
    #[inline]
    fn decode(&self, image: &BinaryBitmap, hints: &DecodeHints) -> DecodeResult {
        self(image, hints)
    }
}

/// Ридер: конфигурация задаётся один раз, дальше — сколько угодно независимых сканов.
///
/// Между вызовами `scan` никакого изменяемого состояния нет.
#[derive(Clone, Debug)]
pub struct BarcodeReader<E> {
    engine: E,
    hints: DecodeHints,
    binarizer: HybridBinarizer,
}

impl<E: DecodeEngine> BarcodeReader<E> {
    pub fn new(engine: E, options: &ScanOptions) -> Self {
        Self::with_hints(engine, DecodeHints::from_options(options))
    }

    pub fn with_hints(engine: E, hints: DecodeHints) -> Self {
        Self {
            engine,
            hints,
            binarizer: HybridBinarizer::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn binarizer(mut self, binarizer: HybridBinarizer) -> Self {
        self.binarizer = binarizer;
        self
    }

    #[inline]
    pub fn hints(&self) -> &DecodeHints {
        &self.hints
    }

    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Отсканировать изображение с перебором разрешённых поворотов.
    ///
    /// Ошибки — только фатальные (формат пикселей, захват буфера); к моменту их
    /// возврата буфер уже отпущен. «Не найдено» — это `Ok(ScanResult::NotFound)`.
    pub fn scan<I: RasterImage + ?Sized>(
        &self,
        image: &mut I,
        rotations: Rotations,
    ) -> Result<ScanResult, ScanError<I::Error>> {
        let bitmap = create_binary_bitmap(image, &self.binarizer)?;
        log::debug!(
            "scan {}x{} rotations={:?}",
            bitmap.width(),
            bitmap.height(),
            rotations
        );

        let result = self.decode_bitmap(&bitmap, rotations);
        let scan = ScanResult::project(&result);
        log::debug!("scan finished: {:?}", scan.format());
        Ok(scan)
    }

    /// Перебор поворотов над готовым bitmap: 0°, 180°, 90° CW, 270° CW.
    ///
    /// Первая валидная попытка прекращает перебор. Причину неудачи не различаем.
    pub fn decode_bitmap(&self, bitmap: &BinaryBitmap, rotations: Rotations) -> DecodeResult {
        for rotation in Rotation::TRY_ORDER {
            if !rotations.permits(rotation) {
                continue;
            }
            let view = bitmap.rotated(rotation);
            let result = self.engine.decode(&view, &self.hints);
            log::trace!(
                "attempt {}°: {:?}",
                rotation.degrees_cw(),
                result.status()
            );
            if result.is_valid() {
                return result;
            }
        }
        DecodeResult::not_found()
    }
}
