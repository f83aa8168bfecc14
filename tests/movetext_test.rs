mod common;

use study_core::movetext::{export_movetext, import_movetext};
use study_core::{Command, ShakmatyOracle, StudyError};

#[test]
fn test_import_keeps_annotations() {
    let text = "{[%csl Ge4] Open games} 1. e4 {[%cal Rd7d5] The center} 1... e5 2. Nf3?! Nc6";
    let study = import_movetext(text, None, &ShakmatyOracle).unwrap();

    let root = &study.moves[0];
    assert!(root.is_root());
    assert_eq!(root.shapes.len(), 1);
    assert_eq!(root.comment.as_ref().unwrap().plain_text(), "Open games");

    let e4 = &study.moves[1];
    assert_eq!(e4.shapes[0].brush, "red");
    assert_eq!(e4.shapes[0].dest.as_deref(), Some("d5"));
    assert_eq!(study.moves[3].san, "Nf3?!");

    assert_eq!(export_movetext(&study), text);
}

#[test]
fn test_import_from_black_to_move() {
    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    let text = "(1... e5 2. Nf3) 1... c5 2. Nf3 d6";
    let study = import_movetext(text, Some(fen.to_string()), &ShakmatyOracle).unwrap();

    let sans: Vec<&str> = study.moves.iter().skip(1).map(|m| m.san.as_str()).collect();
    assert_eq!(sans, vec!["c5", "Nf3", "d6"]);
    assert_eq!(study.moves[0].variants[0].moves.len(), 2);
    assert_eq!(export_movetext(&study), text);
}

#[test]
fn test_import_errors() {
    let result = import_movetext("1. e4 e5 2. Ke3", None, &ShakmatyOracle);
    assert!(matches!(result, Err(StudyError::IllegalMove(_))));

    let result = import_movetext("1. e4 e5 (2. Ke2 Ke7 3. Ke3 Ke6 4. Kd5)", None, &ShakmatyOracle);
    assert!(matches!(result, Err(StudyError::IllegalMove(_))));
}

#[test]
fn test_import_variation_in_the_middle_of_a_variation() {
    let text = "1. e4 e5 (1... c5 2. Nf3 (2. Nc3 Nc6) d6) 2. Nf3";
    let study = import_movetext(text, None, &ShakmatyOracle).unwrap();

    let lines: Vec<Vec<&str>> = study.moves[1]
        .variants
        .iter()
        .map(|v| v.moves.iter().map(|m| m.san.as_str()).collect())
        .collect();
    assert_eq!(lines, vec![vec!["c5", "Nf3", "d6"], vec!["c5", "Nc3", "Nc6"]]);
    assert_eq!(
        export_movetext(&study),
        "1. e4 (1... c5 2. Nf3 d6) (1... c5 2. Nc3 Nc6) 1... e5 2. Nf3"
    );
}

#[test]
fn test_edited_study_exports_variants_in_place() {
    let (mut s, _log) = common::session();
    for m in ["e4", "e5", "Nf3", "Nc6"] {
        s.dispatch(Command::PlaySan(m.to_string())).unwrap();
    }
    s.dispatch(Command::Navigate { offset: -2 }).unwrap();
    s.dispatch(Command::PlaySan("f4".to_string())).unwrap();
    s.dispatch(Command::PlaySan("exf4".to_string())).unwrap();

    let text = s.export_movetext();
    assert_eq!(text, "1. e4 e5 (2. f4 exf4) 2. Nf3 Nc6");

    let reparsed = import_movetext(&text, None, &ShakmatyOracle).unwrap();
    assert_eq!(export_movetext(&reparsed), text);
    assert_eq!(reparsed.node_count(), s.state().study.node_count());
}
