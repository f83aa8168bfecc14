//! Shapes and comments attached to the current node.

use tracing::debug;

use crate::model::{Comment, DrawShape, GameState};
use crate::surface::Transition;

pub fn set_shapes(state: &GameState, shapes: Vec<DrawShape>) -> Option<Transition> {
    if state.is_view_only {
        return None;
    }
    let loc = state.edit_location()?;
    let mut next = state.clone();
    *next.study.annotations_mut(loc).shapes = shapes.clone();
    debug!(count = shapes.len(), "Updated shapes");
    Some(Transition::new(next).show_shapes(&shapes))
}

pub fn set_comment(state: &GameState, comment: Option<Comment>) -> Option<Transition> {
    if state.is_view_only {
        return None;
    }
    let loc = state.edit_location()?;
    let mut next = state.clone();
    *next.study.annotations_mut(loc).comment = comment;
    Some(Transition::new(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::tests::sample_study;
    use crate::model::{Study, ROOT_ID};
    use crate::surface::Effect;

    fn arrow(orig: &str, dest: &str) -> DrawShape {
        DrawShape {
            orig: orig.to_string(),
            dest: Some(dest.to_string()),
            brush: "green".to_string(),
        }
    }

    #[test]
    fn test_set_shapes_on_variant_move() {
        let mut state = GameState::new(sample_study(), false);
        let id = state.study.moves[1].variants[0].moves[1].move_id.clone();
        state.current_move = Some(id.clone());

        let t = set_shapes(&state, vec![arrow("d1", "d5")]).unwrap();
        let node = t.state.study.node(&id).unwrap();
        assert_eq!(node.shapes(), &[arrow("d1", "d5")]);
        assert_eq!(t.state.current_move, Some(id));
        assert_eq!(t.effects, vec![Effect::ShowShapes(vec![arrow("d1", "d5")])]);
    }

    #[test]
    fn test_set_comment_at_start_uses_root() {
        let state = GameState::new(Study::new(None), false);
        let t = set_comment(&state, Some(Comment::from_text("Start"))).unwrap();
        let root = t.state.study.node(ROOT_ID).unwrap();
        assert_eq!(root.comment().map(Comment::plain_text).as_deref(), Some("Start"));

        let cleared = set_comment(&t.state, None).unwrap();
        assert!(cleared.state.study.moves[0].comment.is_none());
    }

    #[test]
    fn test_annotations_without_node() {
        let state = GameState::new(Study::default(), false);
        assert!(set_shapes(&state, Vec::new()).is_none());
        assert!(set_comment(&state, None).is_none());
    }
}
