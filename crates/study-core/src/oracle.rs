//! Rule oracle: legality, check and notation, backed by shakmaty.

use std::collections::BTreeMap;

use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, Color, EnPassantMode, Move,
    Position, Role, Square,
};

use crate::error::StudyError;
use crate::model::PlayedMove;
use crate::surface::{BoardUpdate, Movable, Side};

/// What the board needs to know about a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionInfo {
    pub turn: Side,
    pub check: bool,
    /// Origin square -> legal destinations, castling as the king's two-square move.
    pub dests: BTreeMap<String, Vec<String>>,
    pub fullmoves: u32,
}

impl PositionInfo {
    pub fn board_update(self, fen: &str, view_only: bool) -> BoardUpdate {
        let (color, dests) = if view_only {
            (None, BTreeMap::new())
        } else {
            (Some(self.turn), self.dests)
        };
        BoardUpdate {
            fen: fen.to_string(),
            check: self.check,
            movable: Movable {
                free: false,
                color,
                dests,
            },
            turn_color: self.turn,
        }
    }
}

/// A move made on the board: squares in coordinate form, promotion as a
/// lowercase piece letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
}

pub trait RuleOracle {
    fn position_info(&self, fen: &str) -> Result<PositionInfo, StudyError>;

    fn play(&self, fen: &str, request: &MoveRequest) -> Result<PlayedMove, StudyError>;

    fn play_san(&self, fen: &str, san: &str) -> Result<PlayedMove, StudyError>;
}

/// Standard chess rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShakmatyOracle;

impl RuleOracle for ShakmatyOracle {
    fn position_info(&self, fen: &str) -> Result<PositionInfo, StudyError> {
        let pos = parse_position(fen)?;

        let mut dests: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for m in pos.legal_moves() {
            if let UciMove::Normal { from, to, .. } = m.to_uci(CastlingMode::Standard) {
                let targets = dests.entry(from.to_string()).or_default();
                let to = to.to_string();
                // promotions repeat the same squares once per piece
                if !targets.contains(&to) {
                    targets.push(to);
                }
            }
        }

        Ok(PositionInfo {
            turn: side(pos.turn()),
            check: pos.is_check(),
            dests,
            fullmoves: pos.fullmoves().get(),
        })
    }

    fn play(&self, fen: &str, request: &MoveRequest) -> Result<PlayedMove, StudyError> {
        let pos = parse_position(fen)?;
        let from = parse_square(&request.from)?;
        let to = parse_square(&request.to)?;
        let promotion = match request.promotion {
            Some(c) => Some(Role::from_char(c.to_ascii_lowercase()).ok_or_else(|| {
                StudyError::IllegalMove(format!("unknown promotion piece '{c}'"))
            })?),
            None => None,
        };

        let uci = UciMove::Normal {
            from,
            to,
            promotion,
        };
        let m = uci
            .to_move(&pos)
            .map_err(|_| StudyError::IllegalMove(uci.to_string()))?;

        Ok(played_move(pos, m))
    }

    fn play_san(&self, fen: &str, san: &str) -> Result<PlayedMove, StudyError> {
        let pos = parse_position(fen)?;
        let parsed: SanPlus = san
            .parse()
            .map_err(|e| StudyError::IllegalMove(format!("Invalid SAN '{san}': {e}")))?;
        let m = parsed
            .san
            .to_move(&pos)
            .map_err(|e| StudyError::IllegalMove(format!("Illegal move '{san}': {e}")))?;

        Ok(played_move(pos, m))
    }
}

fn parse_position(fen: &str) -> Result<Chess, StudyError> {
    let invalid = |reason: String| StudyError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

fn parse_square(s: &str) -> Result<Square, StudyError> {
    s.parse()
        .map_err(|_| StudyError::InvalidSquare(s.to_string()))
}

fn side(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

/// Play a legal move and describe it, SAN with its check/mate suffix.
fn played_move(pos: Chess, m: Move) -> PlayedMove {
    let before = Fen::from_position(&pos, EnPassantMode::Legal).to_string();
    let (from, to, promotion) = match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal {
            from,
            to,
            promotion,
        } => (from.to_string(), to.to_string(), promotion.map(|r| r.char())),
        other => (String::new(), other.to_string(), None),
    };

    let san = shakmaty::san::San::from_move(&pos, m.clone());
    let mut after = pos;
    after.play_unchecked(m);
    let suffix = if after.is_checkmate() {
        "#"
    } else if after.is_check() {
        "+"
    } else {
        ""
    };

    PlayedMove {
        san: format!("{san}{suffix}"),
        from,
        to,
        promotion,
        before,
        after: Fen::from_position(&after, EnPassantMode::Legal).to_string(),
    }
}
