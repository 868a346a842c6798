//! The `log` module configures where Sentinel's log messages go. It (re)exports the five logging
//! macros `error!`, `warn!`, `info!`, `debug!` and `trace!`, where `error!` is the highest
//! priority and `trace!` the lowest:
//!
//! ```rust
//! use sentinel::log::info;
//!
//! pub fn do_a_thing() {
//!     info!("A thing is being done.");
//! }
//! ```
//!
//! Logging is _disabled_ by default. It can be enabled with the command line option
//! `--log-level <level>` or from code:
//!
//!  - `enable_logging()`: turns on all log messages
//!  - `disable_logging()`: turns off all log messages
//!  - `set_log_level(level: LevelFilter)`: enables only log messages with priority at least `level`
//!
//! Per-module filtering is configured with `set_module_filter()` / `set_module_filters()` and
//! `remove_module_filter()`:
//!
//! ```rust
//! use sentinel::log::{set_module_filter, set_log_level, LevelFilter};
//!
//! pub fn setup_logging() {
//!     // Enable `info` log messages globally.
//!     set_log_level(LevelFilter::Info);
//!     // Show every step of the model.
//!     set_module_filter("sentinel::model", LevelFilter::Debug);
//! }
//! ```
mod standard_logger;

use std::collections::hash_map::Entry;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard};

pub use log::{debug, error, info, trace, warn, LevelFilter};
use log4rs::Handle;

use crate::error::SentinelError;
use crate::hashing::HashMap;

// Logging disabled
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
// Default module specific filters
const DEFAULT_MODULE_FILTERS: [(&str, LevelFilter); 1] = [
    // Connection pool chatter from the HTTP client.
    ("reqwest", LevelFilter::Warn),
];

/// A global instance of the logging configuration.
static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// A level filter applied to the messages emitted from one module path (e.g.
/// `"sentinel::model"`).
#[derive(Debug, PartialEq)]
struct ModuleLogConfiguration {
    /// The module path this configuration applies to
    module: String,
    /// The maximum log level for this module path
    level: LevelFilter,
}

impl From<(&str, LevelFilter)> for ModuleLogConfiguration {
    fn from((module, level): (&str, LevelFilter)) -> Self {
        Self {
            module: module.to_string(),
            level,
        }
    }
}

/// Keeps track of the filter levels of modules and holds a handle to the global logger.
///
/// Because loggers are globally installed, only one instance of this struct should exist. The
/// public API are free functions which fetch the singleton and call the appropriate member
/// function.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    /// The "default" level filter for modules without an explicitly set filter. A global filter
    /// level of `LevelFilter::Off` disables logging.
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_configurations: HashMap<String, ModuleLogConfiguration>,
    /// Handle to the `log4rs` logger.
    root_handle: Option<Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        let module_configurations = DEFAULT_MODULE_FILTERS
            .map(|(module, level)| (module.to_string(), (module, level).into()));
        let module_configurations = HashMap::from_iter(module_configurations);
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_configurations,
            root_handle: None,
        }
    }
}

impl LogConfiguration {
    pub(in crate::log) fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.set_config();
    }

    /// Returns true if the configuration was mutated, false otherwise.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_configurations.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                let module_config = entry.get_mut();
                if module_config.level == level {
                    return false;
                }
                module_config.level = level;
            }
            Entry::Vacant(entry) => {
                entry.insert((module, level).into());
            }
        }
        true
    }

    pub(in crate::log) fn set_module_filter(&mut self, module: &str, level: LevelFilter) {
        if self.insert_module_filter(module, level) {
            self.set_config();
        }
    }

    pub(in crate::log) fn set_module_filters<S: AsRef<str>>(
        &mut self,
        module_filters: &[(S, LevelFilter)],
    ) {
        let mut mutated = false;
        for (module, level) in module_filters {
            mutated |= self.insert_module_filter(module.as_ref(), *level);
        }
        if mutated {
            self.set_config();
        }
    }

    pub(in crate::log) fn remove_module_filter(&mut self, module: &str) {
        if self.module_configurations.remove(module).is_some() {
            self.set_config();
        }
    }
}

/// A parsed `--log-level` argument: an optional global level plus per-module levels.
#[derive(Debug, Default, PartialEq)]
pub struct LogLevelSpec {
    pub global: Option<LevelFilter>,
    pub modules: Vec<(String, LevelFilter)>,
}

fn parse_level(level: &str) -> Result<LevelFilter, SentinelError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| SentinelError::InvalidLogLevel(format!("unknown level '{}'", level.trim())))
}

/// Parses a level specification such as `info` or `warn,sentinel::model=trace`.
///
/// # Errors
/// Returns `SentinelError::InvalidLogLevel` if a level name is not recognized, a module name is
/// empty, or more than one bare global level is given.
pub fn parse_log_levels(spec: &str) -> Result<LogLevelSpec, SentinelError> {
    let mut parsed = LogLevelSpec::default();
    for part in spec.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.split_once('=') {
            Some((module, level)) => {
                let module = module.trim();
                if module.is_empty() {
                    return Err(SentinelError::InvalidLogLevel(format!(
                        "missing module name in '{part}'"
                    )));
                }
                parsed.modules.push((module.to_string(), parse_level(level)?));
            }
            None => {
                if parsed.global.is_some() {
                    return Err(SentinelError::InvalidLogLevel(format!(
                        "more than one global level in '{spec}'"
                    )));
                }
                parsed.global = Some(parse_level(part)?);
            }
        }
    }
    Ok(parsed)
}

// The public API

/// Enables the logger with no global level filter / full logging. Equivalent to
/// `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Disables logging completely. Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the global log level. A global filter level of `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_log_level(level);
}

/// Sets a level filter for the given module path.
pub fn set_module_filter(module_path: &str, level_filter: LevelFilter) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filter(module_path, level_filter);
}

/// Removes a module-specific level filter for the given module path. The global level filter will
/// apply to the module.
pub fn remove_module_filter(module_path: &str) {
    let mut log_configuration = get_log_configuration();
    log_configuration.remove_module_filter(module_path);
}

/// Sets the level filters for a set of modules. Use this instead of `set_module_filter()` to set
/// filters in bulk.
pub fn set_module_filters<S: AsRef<str>>(module_filters: &[(S, LevelFilter)]) {
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(module_filters);
}

/// Applies a `--log-level` style specification. When only module levels are given, the global
/// level is raised to the most verbose of them so those messages are not filtered at the root.
///
/// # Errors
/// Returns `SentinelError::InvalidLogLevel` if the specification does not parse.
pub fn configure_from_str(spec: &str) -> Result<(), SentinelError> {
    let parsed = parse_log_levels(spec)?;
    let global = parsed.global.unwrap_or_else(|| {
        parsed
            .modules
            .iter()
            .map(|(_, level)| *level)
            .max()
            .unwrap_or(DEFAULT_LOG_LEVEL)
    });
    let mut log_configuration = get_log_configuration();
    log_configuration.set_module_filters(&parsed.modules);
    log_configuration.set_log_level(global);
    Ok(())
}

/// Fetches a mutable reference to the global `LogConfiguration`.
fn get_log_configuration() -> MutexGuard<'static, LogConfiguration> {
    LOG_CONFIGURATION.lock().expect("Mutex poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{LazyLock, Mutex};

    // Force logging tests to run serially for consistent behavior.
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

    #[test]
    fn test_set_log_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Trace);
        set_log_level(LevelFilter::Error);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Error);
            error!("test_set_log_level: global set to error");
            trace!("test_set_log_level: NOT EMITTED");
        }
        set_log_level(LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Trace);
            assert_eq!(log::max_level(), LevelFilter::Trace);
        }
        disable_logging();
    }

    #[test]
    fn test_set_remove_module_filters() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        set_log_level(LevelFilter::Trace);
        {
            let config = get_log_configuration();
            assert_eq!(
                config.module_configurations.get("reqwest"),
                Some(&("reqwest", LevelFilter::Warn).into())
            );
        }

        let filters = [
            ("sentinel::model", LevelFilter::Error),
            ("sentinel::web_api", LevelFilter::Debug),
        ];
        set_module_filters(&filters);
        {
            let config = get_log_configuration();
            for (module_path, level) in &filters {
                assert_eq!(
                    config.module_configurations.get(*module_path),
                    Some(&((*module_path, *level).into()))
                );
            }
        }

        remove_module_filter("sentinel::model");
        remove_module_filter("sentinel::web_api");
        {
            let config = get_log_configuration();
            assert!(!config.module_configurations.contains_key("sentinel::model"));
            assert!(!config.module_configurations.contains_key("sentinel::web_api"));
        }
        disable_logging();
    }

    #[test]
    fn parses_single_level() {
        let parsed = parse_log_levels("info").unwrap();
        assert_eq!(parsed.global, Some(LevelFilter::Info));
        assert!(parsed.modules.is_empty());
    }

    #[test]
    fn parses_module_levels() {
        let parsed = parse_log_levels("warn, sentinel::model=trace,axum=Debug").unwrap();
        assert_eq!(parsed.global, Some(LevelFilter::Warn));
        assert_eq!(
            parsed.modules,
            vec![
                ("sentinel::model".to_string(), LevelFilter::Trace),
                ("axum".to_string(), LevelFilter::Debug),
            ]
        );
    }

    #[test]
    fn rejects_bad_levels() {
        assert!(matches!(
            parse_log_levels("loud"),
            Err(SentinelError::InvalidLogLevel(_))
        ));
        assert!(parse_log_levels("=info").is_err());
        assert!(parse_log_levels("info,debug").is_err());
    }

    #[test]
    fn module_only_spec_raises_global_level() {
        let _guard = TEST_MUTEX.lock().expect("Mutex poisoned");
        configure_from_str("sentinel::model=debug").unwrap();
        {
            let config = get_log_configuration();
            assert_eq!(config.global_log_level, LevelFilter::Debug);
        }
        remove_module_filter("sentinel::model");
        disable_logging();
    }
}
