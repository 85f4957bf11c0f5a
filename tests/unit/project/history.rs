use super::*;

fn with_duration(ms: f64) -> Project {
    Project {
        duration: ms,
        ..Project::default()
    }
}

#[test]
fn undo_redo_walks_snapshots() {
    let mut h = ProjectHistory::new(with_duration(0.0));
    assert!(!h.can_undo());

    assert_eq!(h.commit("a", with_duration(1.0)), 1);
    assert_eq!(h.commit("b", with_duration(2.0)), 2);

    assert_eq!(h.undo().unwrap().version, 1);
    assert_eq!(h.project().duration, 1.0);
    assert_eq!(h.undo().unwrap().version, 0);
    assert!(h.undo().is_none());

    assert_eq!(h.redo().unwrap().label, "a");
    assert_eq!(h.redo().unwrap().project.duration, 2.0);
    assert!(!h.can_redo());
}

#[test]
fn commit_clears_redo_and_versions_keep_increasing() {
    let mut h = ProjectHistory::new(with_duration(0.0));
    h.commit("a", with_duration(1.0));
    h.undo();
    assert!(h.can_redo());
    assert_eq!(h.commit("b", with_duration(5.0)), 2);
    assert!(!h.can_redo());
}

#[test]
fn held_snapshots_survive_later_commits() {
    let mut h = ProjectHistory::new(with_duration(0.0));
    let held = h.project();
    h.commit("a", with_duration(9.0));
    assert_eq!(held.duration, 0.0);
}

#[test]
fn undo_depth_is_bounded() {
    let mut h = ProjectHistory::with_max_levels(with_duration(0.0), 2);
    for i in 1..=5 {
        h.commit("step", with_duration(i as f64));
    }
    assert!(h.undo().is_some());
    assert!(h.undo().is_some());
    assert!(h.undo().is_none());
    assert_eq!(h.project().duration, 3.0);
}
