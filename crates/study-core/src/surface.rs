//! Rendering-surface seam and the effects transitions emit for it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{DrawShape, GameState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }
}

/// Interaction affordances for the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movable {
    pub free: bool,
    pub color: Option<Side>,
    /// Origin square -> legal destination squares.
    pub dests: BTreeMap<String, Vec<String>>,
}

/// Everything the board needs to redraw a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub fen: String,
    pub check: bool,
    pub movable: Movable,
    pub turn_color: Side,
}

pub trait RenderSurface {
    fn set_position(&mut self, update: &BoardUpdate);

    fn set_shapes(&mut self, shapes: &[DrawShape]);
}

/// Side effect requested by a transition, applied by the session after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ShowPosition { fen: String },
    ShowShapes(Vec<DrawShape>),
}

/// Successor state of a command plus its effects.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    pub fn show_position(mut self, fen: &str) -> Self {
        self.effects.push(Effect::ShowPosition {
            fen: fen.to_string(),
        });
        self
    }

    pub fn show_shapes(mut self, shapes: &[DrawShape]) -> Self {
        self.effects.push(Effect::ShowShapes(shapes.to_vec()));
        self
    }
}
