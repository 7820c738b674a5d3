//! Глобальный logger симуляции
//!
//! Симуляция не знает кто печатает логи: headless binary ставит ConsoleLogger,
//! engine bridge ставит свой printer (через set_logger).
//! Уровень фильтрации — LOGGER_LEVEL (Debug по умолчанию).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

// Потокобезопасный глобальный logger (Arc не нужен для static)
static LOGGER: Lazy<Mutex<Option<Box<dyn LogPrinter>>>> = Lazy::new(|| Mutex::new(None));

pub static LOGGER_LEVEL: Lazy<Mutex<LogLevel>> = Lazy::new(|| Mutex::new(LogLevel::Debug));

pub fn set_logger(logger: Box<dyn LogPrinter>) {
    if let Ok(mut slot) = LOGGER.lock() {
        *slot = Some(logger);
    }
}

pub fn set_log_level(level: LogLevel) {
    if let Ok(mut current) = LOGGER_LEVEL.lock() {
        *current = level;
    }
}

pub fn set_logger_if_needed(logger: Box<dyn LogPrinter>) {
    let is_empty = LOGGER.lock().map(|slot| slot.is_none()).unwrap_or(false);
    if is_empty {
        set_logger(logger);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

pub trait LogPrinter: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

pub fn log(message: &str) {
    log_with_level(LogLevel::Debug, message);
}

pub fn log_info(message: &str) {
    log_with_level(LogLevel::Info, message);
}

pub fn log_warning(message: &str) {
    log_with_level(LogLevel::Warning, message);
}

pub fn log_error(message: &str) {
    log_with_level(LogLevel::Error, message);
}

pub fn log_with_level(level: LogLevel, message: &str) {
    let min_level = LOGGER_LEVEL.lock().map(|l| *l).unwrap_or_default();
    if level < min_level {
        return;
    }

    // Timestamp добавляем здесь, printer получает готовую строку
    if let Ok(slot) = LOGGER.lock() {
        if let Some(logger) = slot.as_ref() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            logger.log(level, &format!("[{}] {}", timestamp, message));
        }
    }
}

pub struct ConsoleLogger;

impl LogPrinter for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        println!("[{}] {}", level.as_str(), message);
    }
}

pub fn init_logger() {
    set_logger_if_needed(Box::new(ConsoleLogger));
}
