/// Config file loading and creation for the mergerank CLI.
///
/// Config lives at $XDG_CONFIG_HOME/mergerank/config.toml, falling back to
/// ~/.config/mergerank/config.toml. All fields are optional; CLI flags win.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MergerankConfig {
    pub state: Option<PathBuf>,
    pub max_pass: Option<usize>,
    pub header: Option<bool>,
}

/// Default state file when neither flag nor config names one.
pub const DEFAULT_STATE_FILE: &str = "mergerank-state.json";

fn default_config_template() -> String {
    format!(
        "\
# mergerank configuration
# All values here can be overridden by CLI flags.

# Where the ranking session is stored between commands
# state = \"{DEFAULT_STATE_FILE}\"

# Only rank the top N items (default: rank everything)
# max_pass = 10

# Treat the first line of the items file as column headers
# header = false
"
    )
}

impl MergerankConfig {
    /// State file: `--state`, then the config, then the working directory default.
    pub fn state_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.state.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE))
    }

    pub fn max_pass(&self, flag: Option<usize>) -> Option<usize> {
        flag.or(self.max_pass)
    }

    /// `--header` can only switch headers on; the config decides otherwise.
    pub fn header(&self, flag: bool) -> bool {
        flag || self.header.unwrap_or(false)
    }
}

/// Returns the default config path.
pub fn config_path() -> PathBuf {
    let base = match std::env::var_os("XDG_CONFIG_HOME").filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => {
            let home = std::env::var_os("HOME").unwrap_or_else(|| bail("HOME environment variable not set"));
            PathBuf::from(home).join(".config")
        }
    };
    base.join("mergerank").join("config.toml")
}

/// Load the config. A missing default file means all defaults; a file named
/// with `--config` must exist.
pub fn load_config(explicit: Option<&Path>) -> MergerankConfig {
    let path = explicit.map(Path::to_path_buf).unwrap_or_else(config_path);
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Failed to parse config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => MergerankConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<MergerankConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Write the commented default config to `path`. Refuses to overwrite.
pub fn create_default_config(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| bail(format!("Failed to create directory {}: {e}", parent.display())));
    }

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .unwrap_or_else(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => bail(format!("Config file already exists at {}", path.display())),
            _ => bail(format!("Failed to create config at {}: {e}", path.display())),
        });
    std::io::Write::write_all(&mut file, default_config_template().as_bytes())
        .unwrap_or_else(|e| bail(format!("Failed to write config to {}: {e}", path.display())));
}
