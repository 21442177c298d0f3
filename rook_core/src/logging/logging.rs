// rook_core/src/logging/logging.rs
use crate::storage::path_utils::app_dir;
use flexi_logger::*;
use log::Record;
use once_cell::sync::Lazy;
use std::io::*;
use std::sync::Mutex;

// Global mutable buffer that stores the most recent console line.
pub static LAST_CONSOLE_LINE: Lazy<Mutex<String>> = Lazy::new(|| Mutex::new(String::new()));

/// Helper macro that prints a message, feeds it to the log facade and
/// retains it for hosts that surface the latest line.
#[macro_export]
macro_rules! console_log {
    ($lvl:expr, $($arg:tt)*) => {{
        println!($($arg)*);
        log::log!($lvl, $($arg)*);
        let mut buf = $crate::logging::logging::LAST_CONSOLE_LINE.lock().unwrap();
        *buf = format!($($arg)*);
    }};
}

/// Console message at info level.
#[macro_export]
macro_rules! console_info  { ($($arg:tt)*) => { $crate::console_log!(log::Level::Info,  $($arg)*) }; }

/// Console message at warn level.
#[macro_export]
macro_rules! console_warn  { ($($arg:tt)*) => { $crate::console_log!(log::Level::Warn,  $($arg)*) }; }

/// Console message at error level.
#[macro_export]
macro_rules! console_error { ($($arg:tt)*) => { $crate::console_log!(log::Level::Error, $($arg)*) }; }

/// Console message at debug level.
#[macro_export]
macro_rules! console_debug { ($($arg:tt)*) => { $crate::console_log!(log::Level::Debug, $($arg)*) }; }

/// Initializes the system logger.
pub fn init_file_logger() {
    let log_dir = app_dir().join("logs");

    let file_spec = FileSpec::default()
        .directory(&log_dir)
        .basename("rook")
        .suffix("log");

    Logger::try_with_str("info")
        .unwrap()
        .log_to_file(file_spec)
        .format(my_formatter)
        .rotate(
            Criterion::Size(5_000_000),
            Naming::Numbers,
            Cleanup::KeepLogFiles(5),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .start()
        .expect("Unable to init logger.");

    crate::console_info!("Log dir: {}.", &log_dir.display());

    fn my_formatter(
        write: &mut dyn Write,
        now: &mut DeferredNow,
        record: &Record,
    ) -> Result<()> {
        write!(
            write,
            "{} {:5} [{}] {}",
            now.format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.module_path().unwrap_or("<unknown>"),
            &record.args()
        )
    }
}
