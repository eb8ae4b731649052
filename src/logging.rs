/*
================================================================================
                            labelkit logging
================================================================================

Console logging through the `log` facade with an `env_logger` backend.

**Log Levels**:
- `RUST_LOG` set: used as is
- `--verbose` or debug builds: DEBUG and above for `labelkit`
- Otherwise: INFO and above for `labelkit`
- Other crates are silenced unless `RUST_LOG` enables them

Per-image failures are logged at ERROR with the image or annotation path so a
run can be followed up manually after it completes.
================================================================================
*/

use std::io::Write;
use chrono::Utc;
use env_logger::fmt::{Color, Formatter};
use log::{Level, LevelFilter, Record};

const LOG_TARGET: &str = "labelkit";

pub fn setup_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();

    // First check if RUST_LOG is set - if so, use that configuration
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else {
        // Filter out all other crates' logs
        builder.filter(None, LevelFilter::Off);
        if verbose || cfg!(debug_assertions) {
            builder.filter(Some(LOG_TARGET), LevelFilter::Debug);
        } else {
            builder.filter(Some(LOG_TARGET), LevelFilter::Info);
        }
    }

    builder.format(|buf: &mut Formatter, record: &Record| {
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        // Create the module:line part
        let module_info = if let (Some(module), Some(line)) = (record.module_path(), record.line()) {
            format!("{module}:{line}")
        } else if let Some(module) = record.module_path() {
            module.to_string()
        } else {
            "unknown".to_string()
        };

        let mut level_style = buf.style();
        let mut meta_style = buf.style();

        match record.level() {
            Level::Error => level_style.set_color(Color::Red).set_bold(true),
            Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
            Level::Info => level_style.set_color(Color::Green).set_bold(true),
            Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
            Level::Trace => level_style.set_color(Color::White),
        };

        // Color::Rgb does not work on macOS terminals
        #[cfg(target_os = "macos")]
        {
            meta_style.set_color(Color::Blue);
        }

        #[cfg(not(target_os = "macos"))]
        {
            meta_style.set_color(Color::Rgb(120, 120, 120));
        }

        writeln!(
            buf,
            "{} {:<5} {} {}",
            meta_style.value(timestamp),
            level_style.value(record.level()),
            meta_style.value(module_info),
            record.args()
        )
    });

    // try_init so a second call (e.g. from tests) is harmless
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
