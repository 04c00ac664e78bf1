use exodus::{Error, ErrorKind, File, FileAccess, InitParams, Mode, NotFoundError, StructuralError};

use std::path::Path;

fn quad_strip(path: &Path) -> File {
    let mut file = File::create(path).unwrap();
    file.init(&InitParams::new("strip", 2, 6, 2, 1, 0, 2)).unwrap();
    file.write_coords(
        &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
        Some(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
        None,
    )
    .unwrap();
    file.write_block(1, "QUAD4", 4, &[1, 2, 5, 4, 2, 3, 6, 5])
        .unwrap();
    file
}

#[test]
fn mismatched_side_set_leaves_earlier_sets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sides.exo");

    let mut file = quad_strip(&path);
    file.write_side_set(1, &[1, 2], &[1, 1]).unwrap();

    let err = file.write_side_set(2, &[1, 2], &[3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    assert_eq!(file.get_side_sets().len(), 1);
    file.close().unwrap();

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read_side_sets().unwrap();
    let sets = file.get_side_sets();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].id(), 1);
    assert_eq!(sets[0].element_ids(), &[1, 2]);
    assert_eq!(sets[0].side_ids(), &[1, 1]);
}

#[test]
fn init_rejected_in_read_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.exo");
    quad_strip(&path).close().unwrap();

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    assert_eq!(file.mode(), Mode::Read);
    let err = file
        .init(&InitParams::new("again", 2, 6, 2, 1, 0, 2))
        .unwrap_err();
    assert!(matches!(err, Error::Mode(_)));
}

#[test]
fn init_rejected_twice() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = File::create(dir.path().join("twice.exo")).unwrap();
    let params = InitParams::new("twice", 1, 2, 1, 1, 0, 0);
    file.init(&params).unwrap();
    assert_eq!(file.init(&params).unwrap_err().kind(), ErrorKind::Structural);
    assert_eq!(file.num_nodes(), Some(2));
}

#[test]
fn unknown_block_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blocks.exo");
    quad_strip(&path).close().unwrap();

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read_blocks().unwrap();
    assert!(file.get_element_block(1).is_ok());

    let err = file.get_element_block(2).unwrap_err();
    assert!(matches!(err, Error::NotFound(NotFoundError::Entity(_))));
    assert!(file.get_side_set_node_list(9).is_err());
}

#[test]
fn writes_rejected_in_read_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("readonly.exo");
    quad_strip(&path).close().unwrap();

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    let err = file.write_time(1, 0.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mode);
    assert_eq!(file.write_node_set(1, &[1]).unwrap_err().kind(), ErrorKind::Mode);
}

#[test]
fn side_set_slots_run_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = quad_strip(&dir.path().join("full.exo"));
    file.write_side_set(1, &[1], &[1]).unwrap();

    let err = file.write_side_set(1, &[2], &[1]).unwrap_err();
    assert!(matches!(err, Error::Structural(StructuralError::Duplicate(_))));

    file.write_side_set(2, &[2], &[2]).unwrap();
    let err = file.write_side_set(3, &[2], &[3]).unwrap_err();
    assert!(matches!(err, Error::Structural(StructuralError::CapacityExceeded(_))));
}

#[test]
fn closed_session_queries_do_not_fail() {
    let mut file = File::new();
    assert_eq!(file.num_elements(), None);
    assert!(file.get_element_blocks().is_empty());
    assert!(file.get_x_coords().is_empty());
    assert_eq!(file.read_blocks().unwrap_err().kind(), ErrorKind::Mode);
    file.close().unwrap();
}
