//! Browser console logging through `wasm_logger`.

use std::sync::Once;

use log::{Level, LevelFilter};

static INIT: Once = Once::new();

/// Install the console logger once. Every call applies `level`.
pub fn init(level: &str) {
    let filter = parse_level(level);
    INIT.call_once(|| {
        wasm_logger::init(wasm_logger::Config::new(filter.to_level().unwrap_or(Level::Error)));
    });
    log::set_max_level(filter);
}

pub(crate) fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level(" warn "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
    }

    #[test]
    fn unknown_level_falls_back_to_info() {
        assert_eq!(parse_level("chatty"), LevelFilter::Info);
        assert_eq!(parse_level(""), LevelFilter::Info);
    }
}
