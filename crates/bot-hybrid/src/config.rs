//! Engine configuration file.

use anyhow::Context;
use chess_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the engine reads at startup. Every field is optional in the
/// file.
///
/// ```toml
/// name = "Hybrid"
/// attack_cache = "attacks.bin"
///
/// [search]
/// strategy = "mcts-primed"
/// default_movetime_ms = 5000
///
/// [search.mcts]
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reported by `id name`.
    pub name: String,
    /// Reported by `id author`.
    pub author: String,
    /// File caching the magic attack tables between runs.
    pub attack_cache: Option<PathBuf>,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            name: "HybridBot".to_string(),
            author: "Chess Devtools".to_string(),
            attack_cache: None,
            search: SearchConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid engine configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in config file {}", path.display()))
    }

    /// The file at `path`, or defaults when no path was given.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_search::Strategy;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
        assert_eq!(EngineConfig::load_or_default(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn loads_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
name = "Tester"
attack_cache = "/tmp/attacks.bin"

[search]
strategy = "mcts-cutoff"
tt_size_mb = 4

[search.mcts]
seed = 99
rollout_depth = 6
"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.name, "Tester");
        assert_eq!(config.author, EngineConfig::default().author);
        assert_eq!(config.attack_cache, Some(PathBuf::from("/tmp/attacks.bin")));
        assert_eq!(config.search.strategy, Strategy::MctsCutoff);
        assert_eq!(config.search.tt_size_mb, 4);
        assert_eq!(config.search.max_depth, 64);
        assert_eq!(config.search.mcts.seed, Some(99));
        assert_eq!(config.search.mcts.rollout_depth, 6);
        assert_eq!(config.search.mcts.gamma, 100);
    }

    #[test]
    fn errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let err = EngineConfig::load(&missing).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.toml"));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[search]\nstrategy = \"alphazero\"\n").unwrap();
        let err = EngineConfig::load(&bad).unwrap_err();
        assert!(format!("{:#}", err).contains("bad.toml"));
    }
}
