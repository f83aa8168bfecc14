//! Position resolver: moving the current-move pointer through the tree.

use tracing::{debug, warn};

use crate::locator::{locate, offset_index, Location};
use crate::model::GameState;
use crate::surface::Transition;

/// Resolve the node `offset` plies away from `target` (or from the current
/// move when no target is given) and make it current.
///
/// Stepping past either end of a variant leaves it for the main line, at the
/// branch point's index plus `offset`. Falling off the tree with a non-zero
/// offset resets to the starting position. A zero offset that finds nothing
/// is a no-op.
pub fn resolve(state: &GameState, offset: isize, target: Option<&str>) -> Option<Transition> {
    let moves = &state.study.moves;
    let main = |index: usize| (index < moves.len()).then_some(Location::Main { index });

    let found = match target.or(state.current_move.as_deref()) {
        Some(base_id) => match locate(moves, base_id) {
            Some(Location::Variant {
                parent_index,
                variant_index,
                index,
            }) => {
                let line = &moves[parent_index].variants[variant_index].moves;
                match offset_index(index, offset).filter(|i| *i < line.len()) {
                    Some(i) => Some(Location::Variant {
                        parent_index,
                        variant_index,
                        index: i,
                    }),
                    None => offset_index(parent_index, offset).and_then(main),
                }
            }
            Some(Location::Main { index }) => offset_index(index, offset).and_then(main),
            None => None,
        },
        // At the very start: stepping back wraps to the end of the main line.
        None if offset < 0 => moves
            .len()
            .checked_sub(1)
            .filter(|i| !moves[*i].is_root())
            .and_then(main),
        None if offset > 0 => moves.iter().position(|m| !m.is_root()).and_then(main),
        None => None,
    };

    match found {
        Some(loc) => {
            let node = state.study.node_at(loc);
            debug!(move_id = %node.move_id(), offset, "Resolved position");
            let mut next = state.clone();
            next.current_move = Some(node.move_id().to_string());
            Some(
                Transition::new(next)
                    .show_position(node.after())
                    .show_shapes(node.shapes()),
            )
        }
        None if offset != 0 => Some(reset_to_root(state)),
        None => {
            warn!(target_id = ?target, "Move not found, position unchanged");
            None
        }
    }
}

/// Clear the pointer and show the starting position.
pub fn reset_to_root(state: &GameState) -> Transition {
    debug!("Reset to starting position");
    let mut next = state.clone();
    next.current_move = None;
    let fen = next.study.start_fen().to_string();
    Transition::new(next).show_position(&fen).show_shapes(&[])
}

/// Jump to the last main-line move, or stay at the start when there is none.
pub fn to_end(state: &GameState) -> Option<Transition> {
    let last = state.study.moves.last().filter(|m| !m.is_root())?;
    resolve(state, 0, Some(&last.move_id))
}
