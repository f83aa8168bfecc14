//! Movetext (PGN move section) export and import.
//!
//! Export linearizes the main line with each node's variants parenthesized
//! right after it. Import reads movetext with `pgn-reader` and replays it
//! through the same transitions the interactive editor uses.

use std::ops::ControlFlow;
use std::sync::LazyLock;

use pgn_reader::{Nag, RawComment, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use tracing::debug;

use crate::annotation::{set_comment, set_shapes};
use crate::error::StudyError;
use crate::locator::locate;
use crate::model::{Comment, DrawShape, GameState, NodeRef, Study, Variant};
use crate::mutation::{add_move, branch_move, split_quality};
use crate::oracle::RuleOracle;

static SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[%(?P<kind>csl|cal)\s+(?P<list>[^\]]*)\]").expect("valid shape command pattern")
});

/// Move numbering derived from the starting FEN.
#[derive(Debug, Clone, Copy)]
struct Numbering {
    first_move: u32,
    black_first: bool,
}

impl Numbering {
    fn from_fen(fen: &str) -> Self {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        Self {
            first_move: fields.get(5).and_then(|n| n.parse().ok()).unwrap_or(1),
            black_first: fields.get(1) == Some(&"b"),
        }
    }

    /// Move number of the ply, and whether it is the first player's.
    fn at(&self, ply: usize) -> (u32, bool) {
        let half = ply + usize::from(self.black_first);
        let moves = u32::try_from(half / 2).unwrap_or(u32::MAX);
        (self.first_move.saturating_add(moves), half % 2 == 0)
    }
}

struct Writer {
    numbering: Numbering,
    tokens: Vec<String>,
    needs_number: bool,
}

impl Writer {
    fn new(numbering: Numbering) -> Self {
        Self {
            numbering,
            tokens: Vec::new(),
            needs_number: true,
        }
    }

    fn push_move(&mut self, ply: usize, san: &str) {
        let (number, first_player) = self.numbering.at(ply);
        let token = if first_player {
            format!("{number}. {san}")
        } else if self.needs_number {
            format!("{number}... {san}")
        } else {
            san.to_string()
        };
        self.tokens.push(token);
        self.needs_number = false;
    }

    fn push_annotations(&mut self, shapes: &[DrawShape], comment: Option<&Comment>) {
        let mut parts = Vec::new();
        let circles: Vec<String> = shapes.iter().filter(|s| s.dest.is_none()).map(shape_code).collect();
        let arrows: Vec<String> = shapes.iter().filter(|s| s.dest.is_some()).map(shape_code).collect();
        if !circles.is_empty() {
            parts.push(format!("[%csl {}]", circles.join(",")));
        }
        if !arrows.is_empty() {
            parts.push(format!("[%cal {}]", arrows.join(",")));
        }
        if let Some(text) = comment.map(Comment::plain_text).filter(|t| !t.is_empty()) {
            parts.push(text.replace('}', ")"));
        }
        if !parts.is_empty() {
            self.tokens.push(format!("{{{}}}", parts.join(" ")));
            self.needs_number = true;
        }
    }

    fn push_variant(&mut self, variant: &Variant, ply: usize) {
        let mut inner = Writer::new(self.numbering);
        for (offset, m) in variant.moves.iter().enumerate() {
            inner.push_move(ply + offset, &m.san);
            inner.push_annotations(&m.shapes, m.comment.as_ref());
        }
        self.tokens.push(format!("({})", inner.tokens.join(" ")));
        self.needs_number = true;
    }
}

fn shape_code(shape: &DrawShape) -> String {
    let brush = match shape.brush.as_str() {
        "red" => 'R',
        "blue" => 'B',
        "yellow" => 'Y',
        _ => 'G',
    };
    match &shape.dest {
        Some(dest) => format!("{brush}{}{dest}", shape.orig),
        None => format!("{brush}{}", shape.orig),
    }
}

/// Linearize the study into movetext. The root sentinel is skipped; its
/// annotations and variants open the text.
pub fn export_movetext(study: &Study) -> String {
    let mut writer = Writer::new(Numbering::from_fen(study.start_fen()));

    if let Some(root) = study.moves.first().filter(|m| m.is_root()) {
        writer.push_annotations(&root.shapes, root.comment.as_ref());
        for variant in &root.variants {
            writer.push_variant(variant, 0);
        }
    }

    for (ply, node) in study.moves.iter().filter(|m| !m.is_root()).enumerate() {
        writer.push_move(ply, &node.san);
        writer.push_annotations(&node.shapes, node.comment.as_ref());
        for variant in &node.variants {
            writer.push_variant(variant, ply + 1);
        }
    }

    writer.tokens.join(" ")
}

/// Pull `[%csl ..]` / `[%cal ..]` commands out of a comment body.
fn parse_comment(body: &str) -> (String, Vec<DrawShape>) {
    let mut shapes = Vec::new();
    for cap in SHAPE_RE.captures_iter(body) {
        for entry in cap["list"].split(',').map(str::trim) {
            if let Some(shape) = parse_shape(entry) {
                shapes.push(shape);
            }
        }
    }
    let text = SHAPE_RE.replace_all(body, "");
    (text.split_whitespace().collect::<Vec<_>>().join(" "), shapes)
}

fn parse_shape(entry: &str) -> Option<DrawShape> {
    let brush = match entry.chars().next()? {
        'R' => "red",
        'B' => "blue",
        'Y' => "yellow",
        'G' => "green",
        _ => return None,
    };
    let squares = entry.get(1..)?;
    let (orig, dest) = match squares.len() {
        2 => (squares, None),
        4 => (&squares[..2], Some(squares[2..].to_string())),
        _ => return None,
    };
    Some(DrawShape {
        orig: orig.to_string(),
        dest,
        brush: brush.to_string(),
    })
}

/// Move quality glyphs `$1`..`$6` and their `!`/`?` spellings.
fn quality_suffix(nag: Nag) -> Option<&'static str> {
    match nag.0 {
        1 => Some("!"),
        2 => Some("?"),
        3 => Some("!!"),
        4 => Some("??"),
        5 => Some("!?"),
        6 => Some("?!"),
        _ => None,
    }
}

/// Replays one game's movetext into a study.
struct StudyBuilder<'a> {
    oracle: &'a dyn RuleOracle,
    start_fen: Option<String>,
}

struct Replay {
    state: GameState,
    /// Pointer to restore when each open variation closes.
    resume: Vec<Option<String>>,
    /// Set by `(` until the variation's first move is placed.
    branching: bool,
}

impl StudyBuilder<'_> {
    fn extend(&self, replay: &mut Replay, san: &str) -> Result<(), StudyError> {
        let played = self.oracle.play_san(replay.state.current_fen(), san)?;
        let t = add_move(&replay.state, played)
            .ok_or_else(|| StudyError::IllegalMove(format!("Cannot place '{san}' in the tree")))?;
        replay.state = t.state;
        Ok(())
    }

    /// First move of a variation. It branches from the move the variation
    /// follows; when it is illegal there, the variation is read the standard
    /// PGN way, as an alternative to that move.
    fn branch(&self, replay: &mut Replay, san: &str) -> Result<(), StudyError> {
        let state = &replay.state;
        let here = state.edit_location().ok_or_else(|| {
            StudyError::IllegalMove("Variation before the first move".to_string())
        })?;

        let (from, played) = match self.oracle.play_san(state.current_fen(), san) {
            Ok(played) => (here, played),
            Err(err) => {
                let Some(previous) = here.previous() else {
                    return Err(err);
                };
                let fen = state.study.node_at(previous).after().to_string();
                let played = self.oracle.play_san(&fen, san).map_err(|_| err)?;
                (previous, played)
            }
        };

        let t = branch_move(state, from, played)
            .ok_or_else(|| StudyError::IllegalMove(format!("Cannot branch with '{san}'")))?;
        replay.state = t.state;
        Ok(())
    }
}

impl Visitor for StudyBuilder<'_> {
    type Tags = ();
    type Movetext = Replay;
    type Output = Result<Study, StudyError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, ()> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: ()) -> ControlFlow<Self::Output, Replay> {
        ControlFlow::Continue(Replay {
            state: GameState::new(Study::new(self.start_fen.clone()), false),
            resume: Vec::new(),
            branching: false,
        })
    }

    fn san(&mut self, replay: &mut Replay, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        let san = san_plus.to_string();
        let placed = if std::mem::take(&mut replay.branching) {
            self.branch(replay, &san)
        } else {
            self.extend(replay, &san)
        };
        match placed {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn nag(&mut self, replay: &mut Replay, nag: Nag) -> ControlFlow<Self::Output> {
        let Some(suffix) = quality_suffix(nag) else {
            debug!(nag = nag.0, "Ignoring annotation glyph");
            return ControlFlow::Continue(());
        };
        let study = &mut replay.state.study;
        let loc = replay
            .state
            .current_move
            .as_deref()
            .and_then(|id| locate(&study.moves, id));
        if let Some(loc) = loc.filter(|loc| !matches!(study.node_at(*loc), NodeRef::Root(_))) {
            let fields = study.annotations_mut(loc);
            if split_quality(fields.san).1.is_empty() {
                fields.san.push_str(suffix);
            }
        }
        ControlFlow::Continue(())
    }

    fn comment(&mut self, replay: &mut Replay, comment: RawComment<'_>) -> ControlFlow<Self::Output> {
        let body = String::from_utf8_lossy(comment.as_bytes());
        let (text, shapes) = parse_comment(&body);
        if !shapes.is_empty() {
            if let Some(t) = set_shapes(&replay.state, shapes) {
                replay.state = t.state;
            }
        }
        if !text.is_empty() {
            if let Some(t) = set_comment(&replay.state, Some(Comment::from_text(&text))) {
                replay.state = t.state;
            }
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, replay: &mut Replay) -> ControlFlow<Self::Output, Skip> {
        replay.resume.push(replay.state.current_move.clone());
        replay.branching = true;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, replay: &mut Replay) -> ControlFlow<Self::Output> {
        let Some(back) = replay.resume.pop() else {
            return ControlFlow::Break(Err(StudyError::IllegalMove(
                "Unbalanced ')' in movetext".to_string(),
            )));
        };
        replay.state.current_move = back;
        replay.branching = false;
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, replay: Replay) -> Self::Output {
        debug!(nodes = replay.state.study.node_count(), "Imported movetext");
        let mut study = replay.state.study;
        study.current_move = None;
        Ok(study)
    }
}

/// Build a study by replaying movetext from `start_fen` (standard position
/// when `None`). Headers and results are skipped; nested variations become
/// sibling variants.
pub fn import_movetext(
    movetext: &str,
    start_fen: Option<String>,
    oracle: &dyn RuleOracle,
) -> Result<Study, StudyError> {
    let mut builder = StudyBuilder {
        oracle,
        start_fen: start_fen.clone(),
    };
    let mut reader = Reader::new(movetext.as_bytes());
    match reader.read_game(&mut builder)? {
        Some(study) => study,
        None => Ok(Study::new(start_fen)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MoveNode, PlayedMove, VariantMove};
    use crate::oracle::ShakmatyOracle;

    fn node(san: &str) -> MoveNode {
        MoveNode::from_played(PlayedMove {
            san: san.to_string(),
            from: String::new(),
            to: String::new(),
            promotion: None,
            before: String::new(),
            after: String::new(),
        })
    }

    fn variant_of(parent: &MoveNode, sans: &[&str]) -> Variant {
        Variant {
            variant_id: "v".to_string(),
            parent_move_id: parent.move_id.clone(),
            moves: sans
                .iter()
                .map(|san| VariantMove {
                    move_id: san.to_string(),
                    san: san.to_string(),
                    from: String::new(),
                    to: String::new(),
                    promotion: None,
                    before: String::new(),
                    after: String::new(),
                    shapes: Vec::new(),
                    comment: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_export_main_line_numbering() {
        let mut study = Study::new(None);
        for san in ["e4", "e5", "Nf3"] {
            study.moves.push(node(san));
        }
        assert_eq!(export_movetext(&study), "1. e4 e5 2. Nf3");
    }

    #[test]
    fn test_export_empty() {
        assert_eq!(export_movetext(&Study::new(None)), "");
        assert_eq!(export_movetext(&Study::default()), "");
    }

    #[test]
    fn test_export_black_to_move_start() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string();
        let mut study = Study::new(Some(fen));
        for san in ["e5", "Nf3", "Nc6"] {
            study.moves.push(node(san));
        }
        assert_eq!(export_movetext(&study), "1... e5 2. Nf3 Nc6");
    }

    #[test]
    fn test_export_variants() {
        let mut study = Study::new(None);
        for san in ["e4", "e5", "Nf3"] {
            study.moves.push(node(san));
        }
        let black_alt = variant_of(&study.moves[1], &["c5", "Nf3"]);
        study.moves[1].variants.push(black_alt);
        let white_alt = variant_of(&study.moves[2], &["Bc4"]);
        study.moves[2].variants.push(white_alt);

        assert_eq!(
            export_movetext(&study),
            "1. e4 (1... c5 2. Nf3) 1... e5 (2. Bc4) 2. Nf3"
        );
    }

    #[test]
    fn test_export_root_variant_and_annotations() {
        let mut study = Study::new(None);
        study.moves.push(node("e4"));
        study.moves.push(node("e5"));
        let alt = variant_of(&study.moves[0], &["d4"]);
        study.moves[0].variants.push(alt);
        study.moves[1].comment = Some(Comment::from_text("Best by test"));
        study.moves[1].shapes.push(DrawShape {
            orig: "e2".to_string(),
            dest: Some("e4".to_string()),
            brush: "green".to_string(),
        });

        assert_eq!(
            export_movetext(&study),
            "(1. d4) 1. e4 {[%cal Ge2e4] Best by test} 1... e5"
        );
    }

    #[test]
    fn test_export_numbering_saturates() {
        let fen = format!("8/8/8/4k3/8/8/4K3/8 b - - 0 {}", u32::MAX);
        let mut study = Study::new(Some(fen));
        for san in ["Kd5", "Kd2", "Kc4"] {
            study.moves.push(node(san));
        }
        let max = u32::MAX;
        assert_eq!(
            export_movetext(&study),
            format!("{max}... Kd5 {max}. Kd2 Kc4")
        );
    }

    #[test]
    fn test_parse_comment_shapes() {
        let (text, shapes) = parse_comment(" Sicilian [%csl Rd5,Gc5] [%cal Bg1f3] ");
        assert_eq!(text, "Sicilian");
        assert_eq!(
            shapes,
            vec![
                DrawShape {
                    orig: "d5".into(),
                    dest: None,
                    brush: "red".into(),
                },
                DrawShape {
                    orig: "c5".into(),
                    dest: None,
                    brush: "green".into(),
                },
                DrawShape {
                    orig: "g1".into(),
                    dest: Some("f3".into()),
                    brush: "blue".into(),
                },
            ]
        );
    }

    #[test]
    fn test_import_builds_tree() {
        let study = import_movetext(
            "1. e4 e5 (1... c5 2. Nf3 (2. Nc3) d6) 2. Nf3 {Main line} Nc6",
            None,
            &ShakmatyOracle,
        )
        .unwrap();

        let sans: Vec<&str> = study.moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["", "e4", "e5", "Nf3", "Nc6"]);

        let variants = &study.moves[1].variants;
        assert_eq!(variants.len(), 2);
        let first: Vec<&str> = variants[0].moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(first, vec!["c5", "Nf3", "d6"]);
        let fork: Vec<&str> = variants[1].moves.iter().map(|m| m.san.as_str()).collect();
        assert_eq!(fork, vec!["c5", "Nc3"]);
        assert_eq!(
            study.moves[3].comment.as_ref().map(Comment::plain_text).as_deref(),
            Some("Main line")
        );
        assert_eq!(study.current_move, None);
    }

    #[test]
    fn test_import_export_round_trip() {
        let text = "1. d4 d5 (2. Nf3 Nf6) 2. c4 e6!";
        let study = import_movetext(text, None, &ShakmatyOracle).unwrap();
        assert_eq!(export_movetext(&study), text);

        let standard = "1. d4 d5 2. c4 (2. Nf3 Nf6) 2... e6!";
        let study = import_movetext(standard, None, &ShakmatyOracle).unwrap();
        assert_eq!(export_movetext(&study), text);
    }

    #[test]
    fn test_import_quality_glyphs() {
        let study =
            import_movetext("1. e4!? e5 $1 2. Nf3 $10 Nc6??", None, &ShakmatyOracle).unwrap();
        let sans: Vec<&str> = study.moves.iter().skip(1).map(|m| m.san.as_str()).collect();
        assert_eq!(sans, vec!["e4!?", "e5!", "Nf3", "Nc6??"]);
    }

    #[test]
    fn test_import_empty() {
        let study = import_movetext("", None, &ShakmatyOracle).unwrap();
        assert_eq!(study, Study::new(None));
    }

    #[test]
    fn test_import_rejects_illegal_move() {
        let result = import_movetext("1. e4 e4", None, &ShakmatyOracle);
        assert!(matches!(result, Err(StudyError::IllegalMove(_))));
        let result = import_movetext("1. e4 (1... Ke7)", None, &ShakmatyOracle);
        assert!(matches!(result, Err(StudyError::IllegalMove(_))));
    }
}
