//! `hintikka.toml` parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hintikka_session::SessionConfig;
use serde::{Deserialize, Serialize};

pub const MANIFEST_NAME: &str = "hintikka.toml";

/// Project settings. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HintikkaManifest {
    #[serde(default)]
    pub session: SessionConfig,
}

impl HintikkaManifest {
    /// Search upward from `start_dir` for a `hintikka.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing hintikka.toml")
    }
}

#[cfg(test)]
mod tests {
    use hintikka_session::Representation;

    use super::*;

    #[test]
    fn parse_full_manifest() {
        let manifest = HintikkaManifest::from_str(
            r#"
[session]
default_agent = "robot"
agents = ["robot", "human"]
representation = "agent"
history_depth = 3
prune_after_update = false
"#,
        )
        .unwrap();
        let s = &manifest.session;
        assert_eq!(s.default_agent, "robot");
        assert_eq!(s.agents, ["robot", "human"]);
        assert_eq!(s.representation, Representation::Agent);
        assert_eq!(s.history_depth, 3);
        assert!(!s.prune_after_update);
    }

    #[test]
    fn empty_manifest_uses_defaults() {
        let manifest = HintikkaManifest::from_str("").unwrap();
        assert_eq!(manifest.session, SessionConfig::default());
        let partial = HintikkaManifest::from_str("[session]\nhistory_depth = 2\n").unwrap();
        assert_eq!(partial.session.history_depth, 2);
        assert_eq!(partial.session.default_agent, "a");
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(HintikkaManifest::from_str("[session\n").is_err());
        assert!(HintikkaManifest::from_str("[session]\nrepresentation = \"bdd\"\n").is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "[session]\ndefault_agent = \"parent\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found_dir) = HintikkaManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.session.default_agent, "parent");
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn load_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_NAME);
        std::fs::write(&path, "session = 5\n").unwrap();
        let err = HintikkaManifest::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains(MANIFEST_NAME));
    }
}
