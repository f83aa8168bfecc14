//! Study session configuration from environment variables

use std::env;

use crate::error::StudyError;
use crate::surface::Side;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StudyConfig {
    /// Starting position; `None` means the standard initial position
    pub start_fen: Option<String>,

    /// Side shown at the bottom of the board
    pub orientation: Side,

    /// Show the move list after each command
    pub show_move_list: bool,

    /// Show the comment of the current node
    pub show_comments: bool,

    /// Reject every edit command
    pub view_only: bool,

    /// Directory holding saved studies
    pub data_dir: String,

    /// Key the study is saved under
    pub study_id: String,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            start_fen: None,
            orientation: Side::White,
            show_move_list: true,
            show_comments: true,
            view_only: false,
            data_dir: "data/studies".to_string(),
            study_id: "default".to_string(),
        }
    }
}

impl StudyConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, StudyError> {
        let defaults = Self::default();

        let start_fen = env::var("STUDY_START_FEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let orientation = match env::var("STUDY_ORIENTATION") {
            Ok(v) => parse_side(&v).ok_or(StudyError::Config(
                "STUDY_ORIENTATION must be 'white' or 'black'",
            ))?,
            Err(_) => defaults.orientation,
        };

        Ok(Self {
            start_fen,
            orientation,
            show_move_list: flag("STUDY_SHOW_MOVES").unwrap_or(defaults.show_move_list),
            show_comments: flag("STUDY_SHOW_COMMENTS").unwrap_or(defaults.show_comments),
            view_only: flag("STUDY_VIEW_ONLY").unwrap_or(defaults.view_only),
            data_dir: env::var("STUDY_DATA_DIR").unwrap_or(defaults.data_dir),
            study_id: env::var("STUDY_ID").unwrap_or(defaults.study_id),
        })
    }
}

fn flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_bool(&v))
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_side(value: &str) -> Option<Side> {
    match value.trim().to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Side::White),
        "black" | "b" => Some(Side::Black),
        _ => None,
    }
}
