//! Бинаризация плоскости яркости в `BitMatrix`.
//!
//! - глобальный порог: смесь среднего и середины между min/max (быстро, но не любит
//!   градиенты освещения);
//! - адаптивный порог по среднему в окне (интегральное изображение), для плоских
//!   участков без контраста — фоллбэк на глобальный порог;
//! - маленькие изображения целиком идут через глобальный порог.

use crate::core::types::Rotation;
use crate::luminance::LuminanceSource;

/// Простой глобальный порог: смесь среднего и середины между min/max.
#[inline]
pub fn global_threshold(values: &[u8]) -> u8 {
    if values.is_empty() {
        return 128;
    }
    let (mut min_v, mut max_v) = (u8::MAX, 0u8);
    let mut sum: u64 = 0;
    for &v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
        sum += u64::from(v);
    }
    let mean = u16::from(u8::try_from(sum / values.len() as u64).unwrap_or(u8::MAX));
    let mid = (u16::from(min_v) + u16::from(max_v)) / 2;
    u8::try_from((mean + mid) / 2).unwrap_or(u8::MAX)
}

/// Превратить бинарную строку в последовательность ширин (run-lengths),
/// начиная с первого run'а как есть.
pub fn runs(row_bin: &[bool]) -> Vec<usize> {
    if row_bin.is_empty() {
        return Vec::new();
    }
    let mut v = Vec::new();
    let mut cur = row_bin[0];
    let mut len = 1usize;
    for &b in &row_bin[1..] {
        if b == cur {
            len += 1;
        } else {
            v.push(len);
            cur = b;
            len = 1;
        }
    }
    v.push(len);
    v
}

/// Бинарная матрица, row-major; `true` = тёмный модуль.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitMatrix {
    bits: Vec<bool>,
    width: usize,
    height: usize,
}

impl BitMatrix {
    /// `None`, если длина не равна `width * height`.
    pub fn from_bits(bits: Vec<bool>, width: usize, height: usize) -> Option<Self> {
        (width.checked_mul(height)? == bits.len()).then_some(Self {
            bits,
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
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[bool] {
        let start = y * self.width;
        &self.bits[start..start + self.width]
    }

    /// Run-lengths строки `y`; первый run может быть как светлым, так и тёмным.
    #[inline]
    pub fn row_runs(&self, y: usize) -> Vec<usize> {
        runs(self.row(y))
    }

    pub fn count_dark(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn rotated(&self, rotation: Rotation) -> Self {
        let (width, height) = if rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Self {
            bits: rotation.apply_to_plane(&self.bits, self.width, self.height),
            width,
            height,
        }
    }
}

/// Адаптивный бинаризатор с глобальным фоллбэком.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HybridBinarizer {
    /// Если меньшая сторона изображения меньше этого, используется только глобальный порог.
    pub min_dimension: usize,
    /// Небольшой «запас» в сторону светлого: тёмным считается `v < mean - bias`.
    pub bias: u8,
}

impl Default for HybridBinarizer {
    fn default() -> Self {
        Self {
            min_dimension: 40,
            bias: 5,
        }
    }
}

impl HybridBinarizer {
    pub fn binarize(&self, source: &LuminanceSource) -> BitMatrix {
        let (width, height) = (source.width(), source.height());
        let luma = source.matrix();
        let global = global_threshold(luma);

        if width.min(height) < self.min_dimension {
            return BitMatrix {
                bits: luma.iter().map(|&v| v < global).collect(),
                width,
                height,
            };
        }

        // радиус окна: ~1/32 большей стороны, в диапазоне [8..64]
        let radius = (width.max(height) / 32).clamp(8, 64);
        let integral = integral_image(luma, width, height);
        let stride = width + 1;
        let bias = i32::from(self.bias);

        let mut bits = Vec::with_capacity(width * height);
        for y in 0..height {
            let top = y.saturating_sub(radius);
            let bottom = (y + radius + 1).min(height);
            for x in 0..width {
                let left = x.saturating_sub(radius);
                let right = (x + radius + 1).min(width);
                let sum = integral[bottom * stride + right] + integral[top * stride + left]
                    - integral[top * stride + right]
                    - integral[bottom * stride + left];
                let area = ((bottom - top) * (right - left)) as u64;
                let mean = i32::from(u8::try_from(sum / area).unwrap_or(u8::MAX));
                let v = i32::from(luma[y * width + x]);

                let dark = if (v - mean).abs() <= bias {
                    // плоский участок: локального контраста нет
                    luma[y * width + x] < global
                } else {
                    v < mean - bias
                };
                bits.push(dark);
            }
        }

        BitMatrix {
            bits,
            width,
            height,
        }
    }
}

/// Интегральное изображение размера `(w + 1) × (h + 1)` с нулевой первой строкой/столбцом.
fn integral_image(luma: &[u8], w: usize, h: usize) -> Vec<u64> {
    let stride = w + 1;
    let mut out = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += u64::from(luma[y * w + x]);
            out[(y + 1) * stride + x + 1] = out[y * stride + x + 1] + row_sum;
        }
    }
    out
}
