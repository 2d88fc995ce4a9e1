//! BevyLogger: logger симуляции → `bevy::log` (tracing)
//!
//! Уровень уже отфильтрован в `range_simulation::logger`, здесь только маппинг.

use range_simulation::{LogLevel, LogPrinter};

pub struct BevyLogger;

impl LogPrinter for BevyLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => bevy::log::debug!("{}", message),
            LogLevel::Info => bevy::log::info!("{}", message),
            LogLevel::Warning => bevy::log::warn!("{}", message),
            LogLevel::Error => bevy::log::error!("{}", message),
        }
    }
}
