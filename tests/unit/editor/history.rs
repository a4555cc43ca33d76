use super::*;
use crate::model::overlay::Position;

fn overlay(x: f64) -> Overlay {
    let mut o = Overlay::with_defaults(0, None);
    o.position = Position::at(x, 50.0);
    o
}

fn moved(from: f64, to: f64) -> Command {
    Command::new(
        CommandKind::Move,
        OverlayKey(1),
        Some(overlay(from)),
        Some(overlay(to)),
    )
}

#[test]
fn new_push_clears_redo() {
    let mut h = History::default();
    h.push(moved(10.0, 20.0));
    h.commit_undo();
    assert_eq!(h.redo_len(), 1);

    h.push(moved(10.0, 30.0));
    assert_eq!(h.redo_len(), 0);
    assert_eq!(h.undo_len(), 1);
}

#[test]
fn undo_then_redo_walks_the_stacks() {
    let mut h = History::default();
    h.push(moved(10.0, 20.0));
    h.push(moved(20.0, 30.0));

    assert_eq!(h.peek_undo(), Some(&moved(20.0, 30.0)));
    h.commit_undo();
    assert_eq!(h.peek_undo(), Some(&moved(10.0, 20.0)));
    h.commit_undo();
    assert!(!h.can_undo());
    h.commit_undo();
    assert_eq!(h.redo_len(), 2);

    assert_eq!(h.peek_redo(), Some(&moved(10.0, 20.0)));
    h.commit_redo();
    h.commit_redo();
    assert!(!h.can_redo());
    assert_eq!(h.peek_undo(), Some(&moved(20.0, 30.0)));
}

#[test]
fn bound_drops_oldest_commands() {
    let mut h = History::new(3);
    for i in 0..5 {
        h.push(moved(f64::from(i), f64::from(i + 1)));
    }
    assert_eq!(h.undo_len(), 3);
    for _ in 0..3 {
        h.commit_undo();
    }
    assert_eq!(h.peek_redo(), Some(&moved(2.0, 3.0)));
}

#[test]
fn no_op_commands_are_ignored() {
    let mut h = History::default();
    h.push(moved(10.0, 10.0));
    assert!(!h.can_undo());
}

#[test]
fn peek_does_not_move_commands() {
    let mut h = History::default();
    h.push(moved(1.0, 2.0));
    let _ = h.peek_undo();
    assert_eq!((h.undo_len(), h.redo_len()), (1, 0));
}
