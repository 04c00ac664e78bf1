use exodus::{Encoding, File, FileAccess, InitParams};

use std::path::{Path, PathBuf};

fn scratch(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    (dir, path)
}

fn write_triangle(path: &Path, encoding: Encoding) {
    let mut file = File::create(path).unwrap();
    file.set_encoding(encoding);
    file.init(&InitParams::new("one triangle", 2, 3, 1, 1, 0, 0))
        .unwrap();
    file.write_coords(&[0.0, 1.0, 0.0], Some(&[0.0, 0.0, 1.0]), None)
        .unwrap();
    file.write_block(1, "TRI3", 3, &[1, 2, 3]).unwrap();
    file.write_time(1, 0.0).unwrap();
    file.write_nodal_var_names(&["nv1"]).unwrap();
    file.write_nodal_var(1, 1, &[10.0, 11.0, 12.0]).unwrap();
    file.close().unwrap();
}

#[test]
fn triangle_binary() {
    let (_dir, path) = scratch("triangle.exo");
    write_triangle(&path, Encoding::Binary);

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    assert_eq!(file.title(), "one triangle");
    assert_eq!(file.dim(), Some(2));
    assert_eq!(file.num_elements(), Some(1));
    assert_eq!(
        file.get_nodal_variable_values(1, 1).unwrap(),
        vec![10.0, 11.0, 12.0]
    );
    assert_eq!(file.get_nodal_variable_names(), vec!["nv1".to_string()]);

    file.read().unwrap();
    assert_eq!(file.get_x_coords(), &[0.0, 1.0, 0.0]);
    assert_eq!(file.get_y_coords(), &[0.0, 0.0, 1.0]);
    assert!(file.get_z_coords().is_empty());
    assert_eq!(file.get_coord_names(), &["x".to_string(), "y".to_string()]);

    let block = file.get_element_block(1).unwrap();
    assert_eq!(block.element_type(), "TRI3");
    assert_eq!(block.nodes_per_element(), 3);
    assert_eq!(block.connectivity(), &[1, 2, 3]);
    assert_eq!(file.get_elem_map(), &[1]);
}

#[test]
fn triangle_ascii() {
    let (_dir, path) = scratch("triangle_ascii.exo");
    write_triangle(&path, Encoding::Ascii);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("format=\"ascii\""));
    assert!(!text.contains("format=\"binary\""));

    let file = File::open(&path, FileAccess::Read).unwrap();
    assert_eq!(
        file.get_nodal_variable_values(1, 1).unwrap(),
        vec![10.0, 11.0, 12.0]
    );
}

#[test]
fn tet_sets() {
    let (_dir, path) = scratch("tet.exo");
    {
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("tet", 3, 4, 1, 1, 2, 1)).unwrap();
        file.write_coords(
            &[0.0, 1.0, 0.0, 0.0],
            Some(&[0.0, 0.0, 1.0, 0.0]),
            Some(&[0.0, 0.0, 0.0, 1.0]),
        )
        .unwrap();
        file.write_block(10, "TET4", 4, &[1, 2, 3, 4]).unwrap();
        file.write_node_set(100, &[1, 2, 3]).unwrap();
        file.write_node_set(200, &[4]).unwrap();
        file.write_side_set(7, &[1], &[4]).unwrap();
        file.write_node_set_names(&["base", "apex"]).unwrap();
        file.write_block_names(&["solid"]).unwrap();
        file.close().unwrap();
    }

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read().unwrap();

    let node_sets = file.get_node_sets();
    assert_eq!(node_sets.len(), 2);
    assert_eq!(node_sets[0].id(), 100);
    assert_eq!(node_sets[0].name(), "base");
    assert_eq!(node_sets[0].node_ids(), &[1, 2, 3]);
    assert_eq!(node_sets[1].id(), 200);
    assert_eq!(node_sets[1].node_ids(), &[4]);

    let side_sets = file.get_side_sets();
    assert_eq!(side_sets.len(), 1);
    assert_eq!(side_sets[0].id(), 7);
    assert_eq!(side_sets[0].element_ids(), &[1]);
    assert_eq!(side_sets[0].side_ids(), &[4]);
    assert_eq!(side_sets[0].name(), "");

    // side 4 of a tetrahedron is the face opposite of its fourth node
    let (counts, nodes) = file.get_side_set_node_list(7).unwrap();
    assert_eq!(counts, vec![3]);
    assert_eq!(nodes, vec![1, 3, 2]);

    assert_eq!(file.get_element_block(10).unwrap().name(), "solid");
    let names = file.read_node_set_names().unwrap();
    assert_eq!(names.get(&1).map(String::as_str), Some("apex"));
}

#[test]
fn append_preserves_earlier_steps() {
    let (_dir, path) = scratch("append.exo");
    write_triangle(&path, Encoding::Binary);

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read_times().unwrap();
    assert_eq!(file.get_num_times(), 1);
    file.close().unwrap();

    let mut file = File::open(&path, FileAccess::Append).unwrap();
    file.write_time(2, 0.5).unwrap();
    file.write_nodal_var(2, 1, &[20.0, 21.0, 22.0]).unwrap();
    file.close().unwrap();

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read_times().unwrap();
    assert_eq!(file.get_num_times(), 2);
    assert_eq!(file.get_times(), &[0.0, 0.5]);
    assert_eq!(
        file.get_nodal_variable_values(1, 1).unwrap(),
        vec![10.0, 11.0, 12.0]
    );
    assert_eq!(
        file.get_nodal_variable_values(2, 1).unwrap(),
        vec![20.0, 21.0, 22.0]
    );
}

#[test]
fn partial_writes_match_a_full_write() {
    let (_dir, path) = scratch("partial.exo");
    {
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("partial", 2, 3, 1, 1, 0, 0)).unwrap();
        file.write_coords(&[0.0, 1.0, 0.0], Some(&[0.0, 0.0, 1.0]), None)
            .unwrap();
        file.write_block(1, "TRI3", 3, &[1, 2, 3]).unwrap();
        file.write_nodal_var_names(&["full", "pieces"]).unwrap();
        file.write_elem_var_names(&["e"]).unwrap();
        file.write_time(1, 0.0).unwrap();

        file.write_nodal_var(1, 1, &[1.5, 2.5, 3.5]).unwrap();
        file.write_partial_nodal_var(1, 2, 1, &[1.5]).unwrap();
        file.write_partial_nodal_var(1, 2, 2, &[2.5]).unwrap();
        file.write_partial_nodal_var(1, 2, 3, &[3.5]).unwrap();
        file.write_partial_elem_var(1, 1, 1, 1, &[9.0]).unwrap();
        file.close().unwrap();
    }

    let file = File::open(&path, FileAccess::Read).unwrap();
    let full = file.get_nodal_variable_values(1, 1).unwrap();
    let pieces = file.get_nodal_variable_values(1, 2).unwrap();
    assert_eq!(full, pieces);
    assert_eq!(file.get_elemental_variable_values(1, 1, 1).unwrap(), vec![9.0]);

    let history = file.get_nodal_variable_history(2).unwrap();
    assert_eq!(history.dim(), (1, 3));
}

#[test]
fn times_round_trip() {
    let (_dir, path) = scratch("times.exo");
    let times = [0.0, 0.125, 1.0 / 3.0, 2.5e-9, 1.0e12];
    {
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("times", 1, 2, 1, 1, 0, 0)).unwrap();
        for (i, &time) in times.iter().enumerate() {
            file.write_time(i + 1, time).unwrap();
        }
        file.close().unwrap();
    }

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read_times().unwrap();
    assert_eq!(file.get_num_times(), times.len());
    for (read, written) in file.get_times().iter().zip(times) {
        assert_eq!(read.to_bits(), written.to_bits());
    }
}

#[test]
fn info_records_and_elem_map() {
    let (_dir, path) = scratch("info.exo");
    {
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("info", 1, 3, 2, 1, 0, 0)).unwrap();
        file.write_block(1, "BAR2", 2, &[1, 2, 2, 3]).unwrap();
        file.write_elem_map(&[20, 10]).unwrap();
        file.write_info(&["made by a test", ""]).unwrap();
        file.close().unwrap();
    }

    let mut file = File::open(&path, FileAccess::Read).unwrap();
    file.read().unwrap();
    assert_eq!(file.get_elem_map(), &[20, 10]);
    assert_eq!(
        file.get_info_records(),
        &["made by a test".to_string(), String::new()]
    );
    assert_eq!(file.get_element_block(1).unwrap().size(), 2);
}

#[test]
fn independent_sessions() {
    let (_dir, first) = scratch("first.exo");
    let second = first.with_file_name("second.exo");
    write_triangle(&first, Encoding::Binary);

    let mut other = File::create(&second).unwrap();
    other.init(&InitParams::new("other", 1, 5, 0, 0, 0, 0)).unwrap();

    let file = File::open(&first, FileAccess::Read).unwrap();
    assert_eq!(file.num_nodes(), Some(3));
    assert_eq!(other.num_nodes(), Some(5));
    other.close().unwrap();
}
