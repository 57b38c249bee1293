use serde::de::DeserializeOwned;
use std::path::Path;

/// Loads and deserializes a TOML config file, the same way `GameConfig::load` and
/// `flux::logging::init` use `serdeconv` directly.
pub fn load_toml<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> T {
    serdeconv::from_toml_file(path).expect("Error loading configuration file")
}
