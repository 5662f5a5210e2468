//! Arena configuration
//!
//! Everything the binaries can be told from a TOML file. Every table and
//! field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! game = "checkers"
//!
//! [search]
//! difficulty = "hard"
//! move_time_ms = 2000
//!
//! [checkers.weights]
//! king = 180
//! ```

use crate::error::{ArenaError, Result};
use crate::game_wrapper::GameKind;
use crate::games::checkers::CheckersWeights;
use crate::games::connect4::Connect4Weights;
use crate::games::morris::MorrisWeights;
use crate::games::reversi::ReversiWeights;
use crate::search::SearchLimits;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// AI strength presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Search depth in plies for this preset.
    pub fn depth(self) -> u32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => 6,
        }
    }
}

/// How the AI searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub difficulty: Difficulty,
    /// Explicit depth; overrides the difficulty preset
    pub depth: Option<u32>,
    /// Per-move time limit in milliseconds
    pub move_time_ms: Option<u64>,
    pub node_budget: Option<u64>,
    /// Threads for the root split
    pub threads: usize,
    /// Seed for tie-breaking; random when absent
    pub seed: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            depth: None,
            move_time_ms: None,
            node_budget: None,
            threads: num_cpus::get(),
            seed: None,
        }
    }
}

impl SearchSettings {
    pub fn effective_depth(&self) -> u32 {
        self.depth.unwrap_or_else(|| self.difficulty.depth())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            depth: self.effective_depth(),
            move_time: self.move_time_ms.map(Duration::from_millis),
            node_budget: self.node_budget,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReversiSettings {
    pub board_size: usize,
    pub weights: ReversiWeights,
}

impl Default for ReversiSettings {
    fn default() -> Self {
        Self {
            board_size: 8,
            weights: ReversiWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckersSettings {
    pub weights: CheckersWeights,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorrisSettings {
    pub weights: MorrisWeights,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connect4Settings {
    pub width: usize,
    pub height: usize,
    pub line_size: usize,
    pub weights: Connect4Weights,
}

impl Default for Connect4Settings {
    fn default() -> Self {
        Self {
            width: 7,
            height: 6,
            line_size: 4,
            weights: Connect4Weights::default(),
        }
    }
}

/// Top-level configuration shared by the `play` and `benchmark` binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub game: GameKind,
    pub search: SearchSettings,
    pub reversi: ReversiSettings,
    pub checkers: CheckersSettings,
    pub morris: MorrisSettings,
    pub connect4: Connect4Settings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            game: GameKind::Connect4,
            search: SearchSettings::default(),
            reversi: ReversiSettings::default(),
            checkers: CheckersSettings::default(),
            morris: MorrisSettings::default(),
            connect4: Connect4Settings::default(),
        }
    }
}

impl ArenaConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the games cannot be built with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(ArenaError::InvalidConfig { message });

        let size = self.reversi.board_size;
        if size < 4 || size % 2 != 0 {
            return invalid(format!("reversi board_size must be even and at least 4, got {}", size));
        }
        let c4 = &self.connect4;
        if c4.width == 0 || c4.height == 0 {
            return invalid(format!("connect4 board {}x{} has no cells", c4.width, c4.height));
        }
        if c4.line_size < 2 || (c4.line_size > c4.width && c4.line_size > c4.height) {
            return invalid(format!(
                "connect4 line_size {} does not fit a {}x{} board",
                c4.line_size, c4.width, c4.height
            ));
        }
        if self.search.effective_depth() == 0 {
            return invalid("search depth must be at least 1".to_string());
        }
        if self.search.threads == 0 {
            return invalid("search threads must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_depths() {
        assert_eq!(Difficulty::Easy.depth(), 2);
        assert_eq!(Difficulty::Medium.depth(), 4);
        assert_eq!(Difficulty::Hard.depth(), 6);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = ArenaConfig::from_toml_str("").unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.search.limits(), SearchLimits::depth(4));
    }

    #[test]
    fn test_partial_file() {
        let config = ArenaConfig::from_toml_str(
            r#"
            game = "morris"

            [search]
            difficulty = "hard"
            move_time_ms = 1500
            threads = 2

            [morris.weights]
            mill = 40
            "#,
        )
        .unwrap();
        assert_eq!(config.game, GameKind::Morris);
        let limits = config.search.limits();
        assert_eq!(limits.depth, 6);
        assert_eq!(limits.move_time, Some(Duration::from_millis(1500)));
        assert_eq!(config.morris.weights.mill, 40);
        assert_eq!(config.morris.weights.piece, MorrisWeights::default().piece);
        assert_eq!(config.connect4, Connect4Settings::default());
    }

    #[test]
    fn test_explicit_depth_overrides_difficulty() {
        let config =
            ArenaConfig::from_toml_str("[search]\ndifficulty = \"easy\"\ndepth = 5\n").unwrap();
        assert_eq!(config.search.effective_depth(), 5);
    }

    #[test]
    fn test_rejects_odd_reversi_board() {
        let err = ArenaConfig::from_toml_str("[reversi]\nboard_size = 7\n").unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig { .. }));
    }

    #[test]
    fn test_rejects_empty_connect4_board() {
        for text in ["[connect4]\nheight = 0\n", "[connect4]\nwidth = 0\n"] {
            let err = ArenaConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ArenaError::InvalidConfig { .. }), "{}", text);
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = ArenaConfig::from_toml_str("game = [").unwrap_err();
        assert!(matches!(err, ArenaError::ConfigParse(_)));
    }
}
