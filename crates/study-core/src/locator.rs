//! Move-tree lookup by move identifier.

use crate::model::MoveNode;

/// Where a move lives in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Main {
        index: usize,
    },
    Variant {
        parent_index: usize,
        variant_index: usize,
        index: usize,
    },
}

impl Location {
    /// The node played just before this one: the previous move of the same
    /// line, or the branch point for the first move of a variant.
    pub fn previous(self) -> Option<Location> {
        match self {
            Location::Main { index } => index.checked_sub(1).map(|index| Location::Main { index }),
            Location::Variant {
                parent_index,
                variant_index,
                index,
            } => Some(match index.checked_sub(1) {
                Some(index) => Location::Variant {
                    parent_index,
                    variant_index,
                    index,
                },
                None => Location::Main {
                    index: parent_index,
                },
            }),
        }
    }
}

/// Find `move_id` in the tree. The main line is scanned first, then every
/// node's variants in order. `None` means the id is not present.
pub fn locate(moves: &[MoveNode], move_id: &str) -> Option<Location> {
    if let Some(index) = moves.iter().position(|m| m.move_id == move_id) {
        return Some(Location::Main { index });
    }

    for (parent_index, node) in moves.iter().enumerate() {
        for (variant_index, variant) in node.variants.iter().enumerate() {
            if let Some(index) = variant.moves.iter().position(|m| m.move_id == move_id) {
                return Some(Location::Variant {
                    parent_index,
                    variant_index,
                    index,
                });
            }
        }
    }

    None
}

/// Apply a signed offset to an index, `None` when it would go negative.
pub(crate) fn offset_index(index: usize, offset: isize) -> Option<usize> {
    index.checked_add_signed(offset)
}
