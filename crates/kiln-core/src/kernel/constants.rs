/// Application name
pub const APP_NAME: &str = "Kiln";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default manifest file name; the lock file shares its stem
pub const DEFAULT_MANIFEST_FILE: &str = "composer.json";

/// Extension of the lock file paired with the manifest
pub const LOCK_FILE_EXTENSION: &str = "lock";

/// Package kind marking a framework package eligible for auto-registration
pub const FRAMEWORK_PACKAGE_KIND: &str = "kiln-package";

/// Package kind assumed when the lock file does not declare one
pub const DEFAULT_PACKAGE_KIND: &str = "library";

/// Key in a package's nested config naming the package identifier to register
pub const PACKAGE_CONFIG_KEY: &str = "package";

/// Configuration key enumerating extra packages
pub const PACKAGES_CONFIG_KEY: &str = "packages";

/// Default vendor directory, relative to the application directory
pub const DEFAULT_VENDOR_DIR: &str = "vendor";

/// Configuration directory, relative to the application directory
pub const CONFIG_DIR: &str = "config";

/// Cache directory, relative to the application directory
pub const CACHE_DIR: &str = "var/cache";

/// Log directory, relative to the application directory
pub const LOG_DIR: &str = "var/log";

/// Debug directory, relative to the application directory
pub const DEBUG_DIR: &str = "var/debug";

/// Boot cache file name inside the cache directory
pub const BOOT_CACHE_FILE: &str = "kernel.json";

/// Markers identifying distribution/example configuration files
pub const DISTRIBUTION_MARKERS: &[&str] = &[".dist", ".example"];
