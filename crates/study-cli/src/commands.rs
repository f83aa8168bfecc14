//! Line-oriented command parser for the interactive session.

use study_core::{Command, Comment, DrawShape, MoveRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    AddShape(DrawShape),
    Export,
    Fen,
    Tree,
    Json,
    Save,
    Import(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  next [n] | prev [n] | first | last     move through the study
  select <move-id>                       jump to a move
  play <from> <to> [piece] | play e2e4   play a move by squares
  san <move>                             play a move in algebraic notation
  undo                                   remove the last move of the line
  tag                                    cycle !! ! !? ?! ? ?? markers
  comment [text]                         set (or clear) the comment
  shape <sq>[sq] [brush] | clear-shapes  draw a circle or arrow
  pgn | fen | tree | json                print movetext, position, tree, document
  import <movetext>                      replace the study
  save | help | quit";

/// Parse one input line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<Input>, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let input = match word {
        "" => return Ok(None),
        "next" | "n" => Input::Command(Command::Navigate {
            offset: count(&args)?,
        }),
        "prev" | "p" => Input::Command(Command::Navigate {
            offset: count(&args)?
                .checked_neg()
                .ok_or_else(|| "too many plies".to_string())?,
        }),
        "first" => Input::Command(Command::First),
        "last" => Input::Command(Command::Last),
        "select" => match args.as_slice() {
            [id] => Input::Command(Command::Select {
                move_id: id.to_string(),
            }),
            _ => return Err("usage: select <move-id>".to_string()),
        },
        "play" => Input::Command(Command::Play(move_request(&args)?)),
        "san" => match args.as_slice() {
            [san] => Input::Command(Command::PlaySan(san.to_string())),
            _ => return Err("usage: san <move>".to_string()),
        },
        "undo" => Input::Command(Command::UndoLast),
        "tag" => Input::Command(Command::TagCurrent),
        "comment" if rest.is_empty() => Input::Command(Command::SetComment(None)),
        "comment" => Input::Command(Command::SetComment(Some(Comment::from_text(rest)))),
        "shape" => Input::AddShape(shape(&args)?),
        "clear-shapes" => Input::Command(Command::SetShapes(Vec::new())),
        "pgn" => Input::Export,
        "fen" => Input::Fen,
        "tree" => Input::Tree,
        "json" => Input::Json,
        "save" => Input::Save,
        "import" if !rest.is_empty() => Input::Import(rest.to_string()),
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(input))
}

fn count(args: &[&str]) -> Result<isize, String> {
    match args {
        [] => Ok(1),
        [n] => n
            .parse()
            .map_err(|_| format!("'{n}' is not a number of plies")),
        _ => Err("expected at most one number".to_string()),
    }
}

fn move_request(args: &[&str]) -> Result<MoveRequest, String> {
    let usage = || "usage: play <from> <to> [piece] | play e2e4[q]".to_string();
    let (from, to, promotion) = match args {
        [uci] if uci.len() == 4 || uci.len() == 5 => {
            let promotion = uci.chars().nth(4);
            (uci.get(..2).ok_or_else(usage)?, uci.get(2..4).ok_or_else(usage)?, promotion)
        }
        [from, to] => (*from, *to, None),
        [from, to, piece] => (*from, *to, piece.chars().next()),
        _ => return Err(usage()),
    };
    Ok(MoveRequest {
        from: from.to_string(),
        to: to.to_string(),
        promotion,
    })
}

fn shape(args: &[&str]) -> Result<DrawShape, String> {
    let (squares, brush) = match args {
        [squares] => (*squares, "green"),
        [squares, brush] => (*squares, *brush),
        _ => return Err("usage: shape <sq>[sq] [green|red|blue|yellow]".to_string()),
    };
    let (orig, dest) = match squares.len() {
        2 => (squares, None),
        4 => (&squares[..2], Some(squares[2..].to_string())),
        _ => return Err(format!("'{squares}' is not a square or square pair")),
    };
    Ok(DrawShape {
        orig: orig.to_string(),
        dest,
        brush: brush.to_string(),
    })
}
