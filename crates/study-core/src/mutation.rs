//! Tree mutator: adding moves, undoing the last move, quality markers.
//!
//! Every operation builds the successor state from a copy of the current one;
//! `None` means the command was rejected before anything changed.

use tracing::{debug, warn};

use crate::locator::{locate, Location};
use crate::model::{fresh_id, GameState, MoveNode, PlayedMove, Study, Variant, VariantMove};
use crate::navigation::resolve;
use crate::surface::Transition;

/// Place a just-played move relative to the current position.
pub fn add_move(state: &GameState, played: PlayedMove) -> Option<Transition> {
    if state.is_view_only {
        debug!("View-only study, move ignored");
        return None;
    }

    let loc = match state.edit_location() {
        Some(loc) => loc,
        None => return add_at_start(state, played),
    };

    let moves = &state.study.moves;
    let mut next = state.clone();
    let after = played.after.clone();

    let new_id = match loc {
        Location::Variant {
            parent_index,
            variant_index,
            index,
        } => {
            let line = &moves[parent_index].variants[variant_index].moves;
            if index + 1 == line.len() {
                let node = VariantMove::from_played(played);
                let id = node.move_id.clone();
                next.study.moves[parent_index].variants[variant_index]
                    .moves
                    .push(node);
                id
            } else {
                fork_variant(&mut next.study, parent_index, variant_index, index, played)
            }
        }
        Location::Main { index } => {
            if index + 1 == moves.len() {
                let node = MoveNode::from_played(played);
                let id = node.move_id.clone();
                next.study.moves.push(node);
                id
            } else if moves[index + 1].san == played.san {
                return resolve(state, 0, Some(&moves[index + 1].move_id));
            } else {
                new_variant(&mut next.study, index, played)
            }
        }
    };

    next.current_move = Some(new_id);
    Some(Transition::new(next).show_position(&after).show_shapes(&[]))
}

/// Start a variant from the node at `from`, even when nothing follows it yet.
/// Inside a variant this forks a sibling, as [`add_move`] does mid-variant.
pub fn branch_move(state: &GameState, from: Location, played: PlayedMove) -> Option<Transition> {
    if state.is_view_only {
        return None;
    }

    let mut next = state.clone();
    let after = played.after.clone();
    let new_id = match from {
        Location::Main { index } => new_variant(&mut next.study, index, played),
        Location::Variant {
            parent_index,
            variant_index,
            index,
        } => fork_variant(&mut next.study, parent_index, variant_index, index, played),
    };

    next.current_move = Some(new_id);
    Some(Transition::new(next).show_position(&after).show_shapes(&[]))
}

/// Attach a single-move variant to the main-line node at `index`.
fn new_variant(study: &mut Study, index: usize, played: PlayedMove) -> String {
    let node = VariantMove::from_played(played);
    let id = node.move_id.clone();
    let parent = &mut study.moves[index];
    parent.variants.push(Variant {
        variant_id: fresh_id(),
        parent_move_id: parent.move_id.clone(),
        moves: vec![node],
    });
    debug!(move_id = %id, "Created variant");
    id
}

/// Variants do not nest: fork into a sibling variant that repeats the prefix
/// up to and including `index`.
fn fork_variant(
    study: &mut Study,
    parent_index: usize,
    variant_index: usize,
    index: usize,
    played: PlayedMove,
) -> String {
    let parent = &mut study.moves[parent_index];
    let mut fork: Vec<VariantMove> = parent.variants[variant_index].moves[..=index]
        .iter()
        .map(VariantMove::clone_fresh)
        .collect();
    let node = VariantMove::from_played(played);
    let id = node.move_id.clone();
    fork.push(node);
    parent.variants.push(Variant {
        variant_id: fresh_id(),
        parent_move_id: parent.move_id.clone(),
        moves: fork,
    });
    debug!(move_id = %id, "Forked sibling variant");
    id
}

/// No current move and no root sentinel to branch from.
fn add_at_start(state: &GameState, played: PlayedMove) -> Option<Transition> {
    if state.current_move.is_some() {
        warn!(move_id = ?state.current_move, "Current move not found, move ignored");
        return None;
    }

    match state.study.moves.first() {
        None => {
            let mut next = state.clone();
            let after = played.after.clone();
            let node = MoveNode::from_played(played);
            next.current_move = Some(node.move_id.clone());
            next.study.moves.push(node);
            Some(Transition::new(next).show_position(&after).show_shapes(&[]))
        }
        Some(first) if first.san == played.san => {
            resolve(state, 0, Some(&first.move_id))
        }
        Some(_) => {
            warn!(san = %played.san, "Cannot branch before the first move without a root node");
            None
        }
    }
}

/// Remove the last move of the line holding the current move.
pub fn undo_last(state: &GameState) -> Option<Transition> {
    if state.is_view_only {
        return None;
    }
    let moves = &state.study.moves;
    if moves.iter().all(MoveNode::is_root) {
        debug!("Nothing to undo");
        return None;
    }

    let loc = state
        .current_move
        .as_deref()
        .and_then(|id| locate(moves, id))?;

    match loc {
        Location::Variant {
            parent_index,
            variant_index,
            ..
        } => {
            let mut next = state.clone();
            let parent = &mut next.study.moves[parent_index];
            parent.variants[variant_index].moves.pop();
            let last = parent.variants[variant_index]
                .moves
                .last()
                .map(|m| m.move_id.clone());
            // the pointer follows the end of the shortened variant
            let current = match last {
                Some(id) => id,
                None => {
                    parent.variants.remove(variant_index);
                    debug!(parent = %parent.move_id, "Removed empty variant");
                    parent.move_id.clone()
                }
            };
            show_node(next, current)
        }
        Location::Main { index } => {
            let mut t = if index + 1 == moves.len() {
                resolve(state, -1, None)?
            } else {
                Transition::new(state.clone())
            };

            t.state.study.moves.pop();
            if t.state.study.moves.is_empty() {
                t.state.current_move = None;
            }
            Some(t)
        }
    }
}

/// Make `move_id` current and draw it.
fn show_node(mut next: GameState, move_id: String) -> Option<Transition> {
    let node = next.study.node(&move_id)?;
    let after = node.after().to_string();
    let shapes = node.shapes().to_vec();
    next.current_move = Some(move_id);
    Some(Transition::new(next).show_position(&after).show_shapes(&shapes))
}

/// Cycle the quality marker on the current move's notation.
pub fn tag_current_move(state: &GameState) -> Option<Transition> {
    if state.is_view_only {
        return None;
    }
    let id = state.current_move.as_deref()?;
    let loc = locate(&state.study.moves, id)?;
    if matches!(loc, Location::Main { index } if state.study.moves[index].is_root()) {
        return None;
    }

    let mut next = state.clone();
    let fields = next.study.annotations_mut(loc);
    *fields.san = next_quality(fields.san);
    debug!(move_id = %id, san = %fields.san, "Tagged move");
    Some(Transition::new(next))
}

/// Split notation into the move and its trailing `!`/`?` marker.
pub fn split_quality(san: &str) -> (&str, &str) {
    let base = san.trim_end_matches(['!', '?']);
    (base, &san[base.len()..])
}

/// The notation with its marker advanced one step through the cycle.
pub fn next_quality(san: &str) -> String {
    let (base, suffix) = split_quality(san);
    let next = match suffix {
        "!!" => "!",
        "!?" => "?!",
        "?!" => "?",
        "??" => "",
        "!" => "!?",
        "?" => "??",
        _ => "!!",
    };
    format!("{base}{next}")
}
