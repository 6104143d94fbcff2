use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use kiln_core::{ConfigFragment, InitContext, Package, PackageFailure, Priority, ServiceBinder, ServiceContainer};
use log::LevelFilter;
use serde_json::json;
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "KILN_LOG";

/// Set when the command line or `KILN_LOG` already chose a level.
static LEVEL_FORCED: AtomicBool = AtomicBool::new(false);

/// Install the tracing subscriber and bridge `log` records into it.
///
/// `-v` forces debug output and `KILN_LOG` forces its own filter. Otherwise
/// output starts at info and the `logging.level` setting applies once booted.
pub fn init(verbose: bool) {
    let from_env = EnvFilter::try_from_env(LOG_ENV).ok();
    let forced = verbose || from_env.is_some();
    LEVEL_FORCED.store(forced, Ordering::SeqCst);

    let filter = match from_env {
        Some(filter) if !verbose => filter,
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
        return;
    }
    if let Err(e) = LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
        return;
    }
    if !forced {
        log::set_max_level(LevelFilter::Info);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: LevelFilter,
}

/// Built-in package owning the `logging` configuration block.
#[derive(Debug)]
pub struct LoggingPackage {
    settings: Arc<LoggingSettings>,
}

impl Package for LoggingPackage {
    fn identifier() -> &'static str {
        "kiln/logging"
    }

    fn config() -> Result<Option<ConfigFragment>, PackageFailure> {
        let data = json!({ "logging": { "level": "info" } });
        Ok(Some(ConfigFragment::new(Self::identifier(), Priority::PACKAGE, data)))
    }

    fn register(services: &mut ServiceBinder<'_>) -> Result<(), PackageFailure> {
        let name: String = services.config().get_or("logging.level", "info".to_string());
        let level = LevelFilter::from_str(&name).map_err(|_| format!("Unknown log level '{}'", name))?;
        services.bind_instance(LoggingSettings { level });
        Ok(())
    }

    fn create(container: &ServiceContainer) -> Result<Self, PackageFailure> {
        Ok(LoggingPackage {
            settings: container.get::<LoggingSettings>()?,
        })
    }

    fn init(&self, _context: &InitContext<'_>) -> Result<(), PackageFailure> {
        if LEVEL_FORCED.load(Ordering::SeqCst) {
            log::debug!("Log level set on the command line, ignoring logging.level");
            return Ok(());
        }
        log::set_max_level(self.settings.level);
        log::debug!("Log level set to {}", self.settings.level);
        Ok(())
    }
}
