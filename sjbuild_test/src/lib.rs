use simple_logger::SimpleLogger;
use sjbuild_shared::log::LevelFilter;

pub use spectral;

/// Initializes the logger for a test. Every test that wants log output calls
/// this; only the first call in the process actually installs the logger.
pub fn setup_logger() {
    let _ = SimpleLogger::new().with_level(LevelFilter::Trace).init();
}
