// src/core/mod.rs
//
// Общие типы и ошибки пайплайна.

pub mod error;
pub mod types;
