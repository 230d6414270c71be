// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;

use lexicards_core::Config;
use lexicards_core::ErrorReport;
use lexicards_core::Fallible;

pub const CONFIG_FILE_NAME: &str = "lexicards.toml";

/// Loads the engine configuration.
///
/// An explicit path must exist. Otherwise `lexicards.toml` is looked up next
/// to the database, and if it is absent the defaults are used.
pub fn load_config(explicit: Option<&Path>, database_path: &Path) -> Fallible<Config> {
    let path: PathBuf = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ErrorReport::config(format!(
                    "config file {} does not exist.",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => {
            let dir = database_path.parent().unwrap_or_else(|| Path::new("."));
            let path = dir.join(CONFIG_FILE_NAME);
            if !path.exists() {
                log::debug!("No config file, using defaults.");
                return Ok(Config::default());
            }
            path
        }
    };
    log::debug!("Loading config from {}", path.display());
    let content = std::fs::read_to_string(&path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Fallible<Config> {
    toml::from_str(content).map_err(|e| ErrorReport::config(format!("invalid config: {e}")))
}

#[cfg(test)]
mod tests {
    use lexicards_core::ErrorKind;
    use lexicards_core::FolderId;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_defaults_without_file() -> Fallible<()> {
        let dir = tempdir()?;
        let config = load_config(None, &dir.path().join("db.sqlite3"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_file_next_to_database() -> Fallible<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[scheduler]\nmastery_threshold = 8.0\n\n[sync]\nmax_span_minutes = 30\nexclude_folders = [4, 5]\n",
        )?;
        let config = load_config(None, &dir.path().join("db.sqlite3"))?;
        assert_eq!(config.scheduler.mastery_threshold, 8.0);
        assert_eq!(config.scheduler.easy_factor, 2.5);
        assert_eq!(config.sync.max_span_minutes, 30);
        assert!(config.sync.is_excluded(FolderId::new(5)));
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file() -> Fallible<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("nope.toml");
        let err = load_config(Some(&missing), &dir.path().join("db.sqlite3")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        Ok(())
    }

    #[test]
    fn test_invalid_file() {
        let err = parse_config("[sync]\nenabled = \"maybe\"\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().starts_with("error: invalid config:"));
    }
}
