use std::cell::RefCell;
use std::rc::Rc;

use study_core::{BoardUpdate, DrawShape, RenderSurface, ShakmatyOracle, Study, StudySession};

/// Everything a recording board has been asked to draw.
#[derive(Default)]
pub struct Recorded {
    pub positions: Vec<BoardUpdate>,
    pub shapes: Vec<Vec<DrawShape>>,
}

/// Board that records updates into a shared log.
pub struct RecordingSurface(pub Rc<RefCell<Recorded>>);

impl RenderSurface for RecordingSurface {
    fn set_position(&mut self, update: &BoardUpdate) {
        self.0.borrow_mut().positions.push(update.clone());
    }

    fn set_shapes(&mut self, shapes: &[DrawShape]) {
        self.0.borrow_mut().shapes.push(shapes.to_vec());
    }
}

/// A fresh session at the standard position with a recording board attached.
pub fn session() -> (StudySession<ShakmatyOracle>, Rc<RefCell<Recorded>>) {
    let log = Rc::new(RefCell::new(Recorded::default()));
    let mut session = StudySession::new(Study::new(None), ShakmatyOracle, false);
    session.attach_surface(Box::new(RecordingSurface(log.clone())));
    (session, log)
}

/// The last position drawn.
#[allow(dead_code)]
pub fn last_position(log: &Rc<RefCell<Recorded>>) -> BoardUpdate {
    log.borrow()
        .positions
        .last()
        .cloned()
        .expect("no position drawn")
}
