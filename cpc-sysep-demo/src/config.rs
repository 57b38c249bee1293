use serde_derive::{Deserialize, Serialize};

/// Defaults a run of the demo binary uses when no `--config` file is passed, the same way
/// `GameConfig::default()` supplies sane values for an unconfigured game server.
#[derive(Serialize, Deserialize)]
pub struct DemoConfig {
    pub retries: u8,
    pub timeout_ms: u64,
    pub property_id: u32,
}

impl Default for DemoConfig {
    fn default() -> DemoConfig {
        DemoConfig {
            retries: 3,
            timeout_ms: 500,
            property_id: 0x0A,
        }
    }
}

impl DemoConfig {
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> DemoConfig {
        cpc_support::config::load_toml(path)
    }
}
