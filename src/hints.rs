//! Опции сканирования и подсказки для движка распознавания.

use crate::core::types::BarcodeFormat;

/// Высокоуровневые опции, задаются один раз при создании ридера.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanOptions {
    /// Тратить больше времени ради точности.
    pub try_harder: bool,
    /// Разрешить движку собственные повороты (помимо внешнего перебора в ридере).
    pub try_rotate: bool,
    /// Каноничное имя символики (`"QR_CODE"`, `"EAN_13"`, ...). Пусто/`None` — без фильтра.
    pub format: Option<String>,
}

impl ScanOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn try_harder(mut self, on: bool) -> Self {
        self.try_harder = on;
        self
    }

    #[inline]
    #[must_use]
    pub fn try_rotate(mut self, on: bool) -> Self {
        self.try_rotate = on;
        self
    }

    #[inline]
    #[must_use]
    pub fn format(mut self, name: impl Into<String>) -> Self {
        self.format = Some(name.into());
        self
    }
}

/// Подсказки движку. Неизменяемы после построения.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DecodeHints {
    try_harder: bool,
    try_rotate: bool,
    possible_formats: Vec<BarcodeFormat>,
}

impl DecodeHints {
    /// Перевести опции в подсказки.
    ///
    /// Нераспознанное имя формата не ошибка: фильтр просто не ставится
    /// (все символики разрешены), в лог уходит предупреждение.
    pub fn from_options(options: &ScanOptions) -> Self {
        let possible_formats = match options.format.as_deref() {
            None | Some("") => Vec::new(),
            Some(name) => {
                if let Some(f) = BarcodeFormat::from_name(name) {
                    vec![f]
                } else {
                    log::warn!("unrecognized barcode format filter {name:?}, scanning all formats");
                    Vec::new()
                }
            }
        };

        Self {
            try_harder: options.try_harder,
            try_rotate: options.try_rotate,
            possible_formats,
        }
    }

    #[inline]
    pub fn try_harder(&self) -> bool {
        self.try_harder
    }

    #[inline]
    pub fn try_rotate(&self) -> bool {
        self.try_rotate
    }

    /// Пустой список означает «любая символика».
    #[inline]
    pub fn possible_formats(&self) -> &[BarcodeFormat] {
        &self.possible_formats
    }

    /// Разрешена ли символика этими подсказками.
    #[inline]
    pub fn allows(&self, format: BarcodeFormat) -> bool {
        self.possible_formats.is_empty() || self.possible_formats.contains(&format)
    }
}

impl From<&ScanOptions> for DecodeHints {
    fn from(options: &ScanOptions) -> Self {
        Self::from_options(options)
    }
}
