/// Package name.
pub(crate) const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Default configuration file name.
pub(crate) const CONFIG_NAME: &str = "config.toml";
/// Log directory name under the root path.
pub(crate) const LOG_DIR_NAME: &str = "log";
/// Log file name.
pub(crate) const LOG_FILE_NAME: &str = "mbackup.log";
/// Environment variable overriding the root path.
pub(crate) const ROOT_PATH_ENV: &str = "MBACKUP_ROOT";
