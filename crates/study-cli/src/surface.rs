//! Terminal board: prints the position as text and logs each redraw.

use study_core::{BoardUpdate, DrawShape, RenderSurface, Side};
use tracing::info;

pub struct BoardPrinter {
    orientation: Side,
}

impl BoardPrinter {
    pub fn new(orientation: Side) -> Self {
        Self { orientation }
    }
}

impl RenderSurface for BoardPrinter {
    fn set_position(&mut self, update: &BoardUpdate) {
        info!(
            fen = %update.fen,
            check = update.check,
            turn = update.turn_color.as_str(),
            movable = update.movable.dests.len(),
            "Board updated"
        );
        println!("{}", render_board(&update.fen, self.orientation));
        if update.check {
            println!("{} is in check", update.turn_color.as_str());
        }
    }

    fn set_shapes(&mut self, shapes: &[DrawShape]) {
        if shapes.is_empty() {
            return;
        }
        let listed: Vec<String> = shapes
            .iter()
            .map(|s| match &s.dest {
                Some(dest) => format!("{} {}->{}", s.brush, s.orig, dest),
                None => format!("{} ({})", s.brush, s.orig),
            })
            .collect();
        println!("shapes: {}", listed.join(", "));
    }
}

/// Text diagram of the placement field, seen from `orientation`.
pub fn render_board(fen: &str, orientation: Side) -> String {
    let placement = fen.split_whitespace().next().unwrap_or_default();
    let mut rows: Vec<Vec<char>> = placement
        .split('/')
        .map(|rank| {
            let mut row = Vec::with_capacity(8);
            for c in rank.chars() {
                match c.to_digit(10) {
                    Some(n) => row.extend(std::iter::repeat('.').take(n as usize)),
                    None => row.push(c),
                }
            }
            row
        })
        .collect();

    let mut labels: Vec<char> = ('1'..='8').rev().collect();
    let mut files: Vec<char> = ('a'..='h').collect();
    if orientation == Side::Black {
        rows.reverse();
        labels.reverse();
        for row in &mut rows {
            row.reverse();
        }
        files.reverse();
    }

    let mut out: Vec<String> = rows
        .iter()
        .zip(labels)
        .map(|(row, label)| {
            let squares: Vec<String> = row.iter().map(char::to_string).collect();
            format!("{label} {}", squares.join(" "))
        })
        .collect();
    let files: Vec<String> = files.iter().map(char::to_string).collect();
    out.push(format!("  {}", files.join(" ")));
    out.join("\n")
}
