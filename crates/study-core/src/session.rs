//! Command dispatch: one command at a time, each run to completion.

use tracing::{debug, warn};

use crate::annotation::{set_comment, set_shapes};
use crate::config::StudyConfig;
use crate::error::StudyError;
use crate::model::{Comment, DrawShape, GameState, Study};
use crate::movetext::{export_movetext, import_movetext};
use crate::mutation::{add_move, split_quality, tag_current_move, undo_last};
use crate::navigation::{reset_to_root, resolve, to_end};
use crate::oracle::{MoveRequest, RuleOracle};
use crate::persistence::StudyStore;
use crate::surface::{Effect, RenderSurface, Transition};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Step `offset` plies from the current move.
    Navigate { offset: isize },
    Select { move_id: String },
    First,
    Last,
    Play(MoveRequest),
    PlaySan(String),
    UndoLast,
    TagCurrent,
    SetShapes(Vec<DrawShape>),
    SetComment(Option<Comment>),
}

pub struct StudySession<O: RuleOracle> {
    state: GameState,
    oracle: O,
    surface: Option<Box<dyn RenderSurface>>,
}

impl<O: RuleOracle> StudySession<O> {
    pub fn new(study: Study, oracle: O, view_only: bool) -> Self {
        Self {
            state: GameState::new(study, view_only),
            oracle,
            surface: None,
        }
    }

    /// Open a saved study, or a fresh one at the configured start position.
    pub fn from_config(
        config: &StudyConfig,
        saved: Option<Study>,
        oracle: O,
    ) -> Result<Self, StudyError> {
        let study = saved.unwrap_or_else(|| Study::new(config.start_fen.clone()));
        oracle.position_info(study.start_fen())?;
        Ok(Self::new(study, oracle, config.view_only))
    }

    /// Attach a board and draw the current position on it.
    pub fn attach_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.surface = Some(surface);
        self.refresh();
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn RenderSurface>> {
        self.surface.take()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_fen(&self) -> &str {
        self.state.current_fen()
    }

    pub fn export_movetext(&self) -> String {
        export_movetext(&self.state.study)
    }

    pub fn snapshot(&self) -> Study {
        self.state.snapshot()
    }

    pub fn save(&self, store: &dyn StudyStore, study_id: &str) -> Result<(), StudyError> {
        store.save(study_id, &self.snapshot())
    }

    /// Replace the study with one parsed from movetext, keeping the start position.
    pub fn load_movetext(&mut self, movetext: &str) -> Result<(), StudyError> {
        let study = import_movetext(movetext, self.state.study.root.fen.clone(), &self.oracle)?;
        self.state = GameState::new(study, self.state.is_view_only);
        self.refresh();
        Ok(())
    }

    /// Run one command. Returns whether the state changed; oracle rejections
    /// are errors and leave the state untouched.
    pub fn dispatch(&mut self, command: Command) -> Result<bool, StudyError> {
        let state = &self.state;
        let transition = match command {
            Command::Navigate { offset } => resolve(state, offset, None),
            Command::Select { move_id } => resolve(state, 0, Some(&move_id)),
            Command::First => Some(reset_to_root(state)),
            Command::Last => to_end(state),
            Command::Play(_) | Command::PlaySan(_) if state.is_view_only => {
                debug!("View-only study, move ignored");
                None
            }
            Command::Play(request) => {
                let played = self.oracle.play(state.current_fen(), &request)?;
                add_move(state, played)
            }
            Command::PlaySan(text) => {
                let (san, quality) = split_quality(text.trim());
                let mut played = self.oracle.play_san(state.current_fen(), san)?;
                played.san.push_str(quality);
                add_move(state, played)
            }
            Command::UndoLast => undo_last(state),
            Command::TagCurrent => tag_current_move(state),
            Command::SetShapes(_) | Command::SetComment(_) if self.surface.is_none() => {
                debug!("No board attached, annotation ignored");
                None
            }
            Command::SetShapes(shapes) => set_shapes(state, shapes),
            Command::SetComment(comment) => set_comment(state, comment),
        };
        Ok(self.commit(transition))
    }

    /// Redraw the current position and its shapes.
    pub fn refresh(&mut self) {
        let fen = self.state.current_fen().to_string();
        let shapes = self
            .state
            .current_node()
            .map(|n| n.shapes().to_vec())
            .unwrap_or_default();
        self.apply(Effect::ShowPosition { fen });
        self.apply(Effect::ShowShapes(shapes));
    }

    fn commit(&mut self, transition: Option<Transition>) -> bool {
        let Some(Transition { state, effects }) = transition else {
            return false;
        };
        self.state = state;
        for effect in effects {
            self.apply(effect);
        }
        true
    }

    fn apply(&mut self, effect: Effect) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        match effect {
            Effect::ShowPosition { fen } => match self.oracle.position_info(&fen) {
                Ok(info) => surface.set_position(&info.board_update(&fen, self.state.is_view_only)),
                Err(e) => warn!(error = %e, "Cannot render position"),
            },
            Effect::ShowShapes(shapes) => surface.set_shapes(&shapes),
        }
    }
}
