//! Study document model: main line, variants, annotations.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::locator::{locate, Location};

/// Identifier of the sentinel node standing for the starting position.
pub const ROOT_ID: &str = "root";

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Generate a fresh node/variant identifier.
pub fn fresh_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// A circle (no `dest`) or arrow drawn on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawShape {
    pub orig: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default = "default_brush")]
    pub brush: String,
}

fn default_brush() -> String {
    "green".to_string()
}

/// Rich-text comment document (editor JSON, kept opaque).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Comment(pub JsonValue);

impl Comment {
    /// Wrap plain text in a single-paragraph document.
    pub fn from_text(text: &str) -> Self {
        Comment(serde_json::json!({
            "type": "doc",
            "content": [{
                "type": "paragraph",
                "content": [{ "type": "text", "text": text }],
            }],
        }))
    }

    /// Flatten the document to plain text, one space between blocks.
    pub fn plain_text(&self) -> String {
        match &self.0 {
            JsonValue::String(s) => s.trim().to_string(),
            doc => match doc.get("content").and_then(|c| c.as_array()) {
                Some(blocks) => blocks
                    .iter()
                    .map(|block| {
                        let mut buf = String::new();
                        collect_text(block, &mut buf);
                        buf.trim().to_string()
                    })
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
                None => {
                    let mut buf = String::new();
                    collect_text(doc, &mut buf);
                    buf.trim().to_string()
                }
            },
        }
    }
}

fn collect_text(node: &JsonValue, buf: &mut String) {
    if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
        buf.push_str(text);
    }
    if let Some(children) = node.get("content").and_then(|c| c.as_array()) {
        for child in children {
            collect_text(child, buf);
        }
    }
}

/// A move as produced by the rule oracle, before it is placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub san: String,
    pub from: String,
    pub to: String,
    pub promotion: Option<char>,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNode {
    pub move_id: String,
    pub san: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub shapes: Vec<DrawShape>,
    #[serde(default)]
    pub comment: Option<Comment>,
}

impl MoveNode {
    /// The sentinel node for the starting position.
    pub fn root(fen: &str) -> Self {
        Self {
            move_id: ROOT_ID.to_string(),
            san: String::new(),
            from: String::new(),
            to: String::new(),
            promotion: None,
            before: fen.to_string(),
            after: fen.to_string(),
            variants: Vec::new(),
            shapes: Vec::new(),
            comment: None,
        }
    }

    pub fn from_played(played: PlayedMove) -> Self {
        Self {
            move_id: fresh_id(),
            san: played.san,
            from: played.from,
            to: played.to,
            promotion: played.promotion,
            before: played.before,
            after: played.after,
            variants: Vec::new(),
            shapes: Vec::new(),
            comment: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.move_id == ROOT_ID
    }
}

/// A move inside a variant. Variants never branch further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMove {
    pub move_id: String,
    pub san: String,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<char>,
    pub before: String,
    pub after: String,
    #[serde(default)]
    pub shapes: Vec<DrawShape>,
    #[serde(default)]
    pub comment: Option<Comment>,
}

impl VariantMove {
    pub fn from_played(played: PlayedMove) -> Self {
        Self {
            move_id: fresh_id(),
            san: played.san,
            from: played.from,
            to: played.to,
            promotion: played.promotion,
            before: played.before,
            after: played.after,
            shapes: Vec::new(),
            comment: None,
        }
    }

    /// Copy of this move under a new identifier.
    pub fn clone_fresh(&self) -> Self {
        Self {
            move_id: fresh_id(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: String,
    /// Main-line node this variant branches from (lookup key only).
    pub parent_move_id: String,
    pub moves: Vec<VariantMove>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyRoot {
    #[serde(default)]
    pub fen: Option<String>,
}

/// The persisted study document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub root: StudyRoot,
    pub moves: Vec<MoveNode>,
    #[serde(default)]
    pub current_move: Option<String>,
}

impl Study {
    /// Empty study holding only the root sentinel.
    pub fn new(fen: Option<String>) -> Self {
        let start = fen.clone().unwrap_or_else(|| STANDARD_START_FEN.to_string());
        Self {
            root: StudyRoot { fen },
            moves: vec![MoveNode::root(&start)],
            current_move: None,
        }
    }

    pub fn start_fen(&self) -> &str {
        self.root.fen.as_deref().unwrap_or(STANDARD_START_FEN)
    }

    pub fn has_root_sentinel(&self) -> bool {
        self.moves.first().is_some_and(MoveNode::is_root)
    }

    /// Number of real move nodes (sentinel excluded), variants included.
    pub fn node_count(&self) -> usize {
        self.moves
            .iter()
            .map(|m| {
                let own = usize::from(!m.is_root());
                own + m.variants.iter().map(|v| v.moves.len()).sum::<usize>()
            })
            .sum()
    }

    pub fn node(&self, move_id: &str) -> Option<NodeRef<'_>> {
        locate(&self.moves, move_id).map(|loc| self.node_at(loc))
    }

    /// Dereference a location produced by [`locate`] on this study.
    pub fn node_at(&self, loc: Location) -> NodeRef<'_> {
        match loc {
            Location::Main { index } => {
                let node = &self.moves[index];
                if node.is_root() {
                    NodeRef::Root(node)
                } else {
                    NodeRef::Main(node)
                }
            }
            Location::Variant {
                parent_index,
                variant_index,
                index,
            } => NodeRef::Variant(&self.moves[parent_index].variants[variant_index].moves[index]),
        }
    }
}

/// The fields of a node that may change after creation.
pub struct AnnotationsMut<'a> {
    pub san: &'a mut String,
    pub shapes: &'a mut Vec<DrawShape>,
    pub comment: &'a mut Option<Comment>,
}

impl Study {
    pub fn annotations_mut(&mut self, loc: Location) -> AnnotationsMut<'_> {
        match loc {
            Location::Main { index } => {
                let node = &mut self.moves[index];
                AnnotationsMut {
                    san: &mut node.san,
                    shapes: &mut node.shapes,
                    comment: &mut node.comment,
                }
            }
            Location::Variant {
                parent_index,
                variant_index,
                index,
            } => {
                let node = &mut self.moves[parent_index].variants[variant_index].moves[index];
                AnnotationsMut {
                    san: &mut node.san,
                    shapes: &mut node.shapes,
                    comment: &mut node.comment,
                }
            }
        }
    }
}

/// Borrowed view of any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a MoveNode),
    Main(&'a MoveNode),
    Variant(&'a VariantMove),
}

impl<'a> NodeRef<'a> {
    pub fn move_id(&self) -> &'a str {
        match self {
            NodeRef::Root(n) | NodeRef::Main(n) => &n.move_id,
            NodeRef::Variant(n) => &n.move_id,
        }
    }

    pub fn san(&self) -> &'a str {
        match self {
            NodeRef::Root(n) | NodeRef::Main(n) => &n.san,
            NodeRef::Variant(n) => &n.san,
        }
    }

    pub fn after(&self) -> &'a str {
        match self {
            NodeRef::Root(n) | NodeRef::Main(n) => &n.after,
            NodeRef::Variant(n) => &n.after,
        }
    }

    pub fn shapes(&self) -> &'a [DrawShape] {
        match self {
            NodeRef::Root(n) | NodeRef::Main(n) => &n.shapes,
            NodeRef::Variant(n) => &n.shapes,
        }
    }

    pub fn comment(&self) -> Option<&'a Comment> {
        match self {
            NodeRef::Root(n) | NodeRef::Main(n) => n.comment.as_ref(),
            NodeRef::Variant(n) => n.comment.as_ref(),
        }
    }
}

/// Per-session state: the document plus the displayed node.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub current_move: Option<String>,
    pub is_view_only: bool,
    pub study: Study,
}

impl GameState {
    pub fn new(study: Study, is_view_only: bool) -> Self {
        // A stale pointer from a saved document falls back to the start.
        let current_move = study
            .current_move
            .clone()
            .filter(|id| study.node(id).is_some());
        Self {
            current_move,
            is_view_only,
            study,
        }
    }

    pub fn current_node(&self) -> Option<NodeRef<'_>> {
        self.current_move.as_deref().and_then(|id| self.study.node(id))
    }

    /// FEN of the displayed position.
    pub fn current_fen(&self) -> &str {
        match self.current_node() {
            Some(node) => node.after(),
            None => self.study.start_fen(),
        }
    }

    /// Location edits apply to: the current node, or the root sentinel at the start.
    pub fn edit_location(&self) -> Option<Location> {
        match self.current_move.as_deref() {
            Some(id) => locate(&self.study.moves, id),
            None if self.study.has_root_sentinel() => Some(Location::Main { index: 0 }),
            None => None,
        }
    }

    /// Copy of the document with the live pointer written back.
    pub fn snapshot(&self) -> Study {
        Study {
            current_move: self.current_move.clone(),
            ..self.study.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_study_has_root_sentinel() {
        let study = Study::new(None);
        assert!(study.has_root_sentinel());
        assert_eq!(study.start_fen(), STANDARD_START_FEN);
        assert_eq!(study.node_count(), 0);
        assert!(matches!(study.node(ROOT_ID), Some(NodeRef::Root(_))));
    }

    #[test]
    fn test_comment_plain_text() {
        let doc = Comment(serde_json::json!({
            "type": "doc",
            "content": [
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "Sharp " },
                    { "type": "text", "marks": [{ "type": "bold" }], "text": "line" }
                ]},
                { "type": "paragraph" },
                { "type": "paragraph", "content": [{ "type": "text", "text": "White is better." }] }
            ]
        }));
        assert_eq!(doc.plain_text(), "Sharp line White is better.");
        assert_eq!(Comment::from_text("Only move").plain_text(), "Only move");
    }

    #[test]
    fn test_study_serializes_camel_case() {
        let study = Study::new(None);
        let json = serde_json::to_value(&study).unwrap();
        assert_eq!(json["moves"][0]["moveId"], "root");
        assert!(json["currentMove"].is_null());

        let back: Study = serde_json::from_value(json).unwrap();
        assert_eq!(back, study);
    }

    #[test]
    fn test_game_state_drops_stale_pointer() {
        let mut study = Study::new(None);
        study.current_move = Some("missing".to_string());
        let state = GameState::new(study, false);
        assert_eq!(state.current_move, None);
        assert_eq!(state.current_fen(), STANDARD_START_FEN);
    }

    #[test]
    fn test_current_fen_follows_pointer() {
        let fen = "8/8/8/4k3/8/8/4K3/8 w - - 0 1";
        let mut study = Study::new(Some(fen.to_string()));
        let mut king = MoveNode::root(fen);
        king.move_id = "ke2e3".to_string();
        king.after = "8/8/8/4k3/8/4K3/8/8 b - - 1 1".to_string();
        study.moves.push(king);

        let mut state = GameState::new(study, false);
        assert_eq!(state.current_fen(), fen);
        assert_eq!(state.edit_location(), Some(Location::Main { index: 0 }));

        state.current_move = Some("ke2e3".to_string());
        assert_eq!(state.current_fen(), "8/8/8/4k3/8/4K3/8/8 b - - 1 1");
        assert_eq!(state.snapshot().current_move.as_deref(), Some("ke2e3"));
    }
}
