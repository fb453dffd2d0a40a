// src/result.rs
//
// Внешний результат скана: имя символики + текст в UTF-8, либо явное «не найдено».

use crate::api::{DecodeResult, DecodeStatus};

/// Итог одного вызова `scan`. Промежуточных состояний нет.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ScanResult {
    Found {
        /// Каноничное имя символики, например `"QR_CODE"`.
        format: String,
        text: String,
    },
    #[default]
    NotFound,
}

impl ScanResult {
    /// Спроецировать внутренний результат движка.
    ///
    /// Перекодировка UTF-16 → UTF-8 тотальна: непарные суррогаты становятся U+FFFD.
    pub fn project(result: &DecodeResult) -> Self {
        match (result.status(), result.format()) {
            (DecodeStatus::NoError, Some(format)) => Self::Found {
                format: format.name().to_owned(),
                text: String::from_utf16_lossy(result.text()),
            },
            _ => Self::NotFound,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    #[inline]
    pub fn format(&self) -> Option<&str> {
        match self {
            Self::Found { format, .. } => Some(format),
            Self::NotFound => None,
        }
    }

    #[inline]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Found { text, .. } => Some(text),
            Self::NotFound => None,
        }
    }
}

impl From<&DecodeResult> for ScanResult {
    fn from(result: &DecodeResult) -> Self {
        Self::project(result)
    }
}
