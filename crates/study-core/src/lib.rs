//! Interactive chess study engine.
//!
//! A study is a main line of moves where each move may carry variants
//! (one level deep), plus shapes and comments per node. Commands move a
//! current-move pointer through the tree or edit it; every edit builds a new
//! state from the previous one and reports what the board must redraw.

pub mod annotation;
pub mod config;
pub mod error;
pub mod locator;
pub mod model;
pub mod movetext;
pub mod mutation;
pub mod navigation;
pub mod oracle;
pub mod persistence;
pub mod session;
pub mod surface;

pub use error::StudyError;
pub use model::{Comment, DrawShape, GameState, MoveNode, Study, Variant, VariantMove};
pub use oracle::{MoveRequest, RuleOracle, ShakmatyOracle};
pub use session::{Command, StudySession};
pub use surface::{BoardUpdate, RenderSurface, Side};
