#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use dinitz::{
    graph::{load_graph_csv, EdgeStore, GraphImportConfig},
    precheck::{precheck, PrecheckError},
    run_max_flow, DinitzError,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

#[test]
fn interns_nodes_in_first_appearance_order() {
    let dir = TempDir::new().unwrap();
    let edges = write(
        dir.path(),
        "edges.csv",
        "from,to,capacity\nA,B,3\nA,C,2\nB,D,2\nC,D,3\n",
    );
    let imported = load_graph_csv(&GraphImportConfig::new(&edges)).unwrap();
    assert_eq!(imported.labels(), ["A", "B", "C", "D"]);
    assert_eq!(imported.graph.edge_count(), 4);
    assert_eq!(imported.index_of("C"), Some(2));
    assert_eq!(imported.index_of(" D "), Some(3));
    assert_eq!(imported.index_of("Z"), None);

    let mut graph = imported.graph.clone();
    let s = imported.index_of("A").unwrap();
    let t = imported.index_of("D").unwrap();
    assert_eq!(run_max_flow(&mut graph, s, t), 4.0);
}

#[test]
fn missing_capacity_defaults_to_unit() {
    let dir = TempDir::new().unwrap();
    let edges = write(dir.path(), "edges.csv", "from,to,capacity\ns,t,\ns,t,2.5\n");
    let imported = load_graph_csv(&GraphImportConfig::new(&edges)).unwrap();
    let caps: Vec<f64> = imported.graph.edges().map(|(_, e)| e.capacity).collect();
    assert_eq!(caps, vec![1.0, 2.5]);
}

#[test]
fn headers_match_case_insensitively_and_columns_are_configurable() {
    let dir = TempDir::new().unwrap();
    let edges = write(dir.path(), "edges.csv", "Tail,Head,CAP\nx,y,4\n");
    let mut cfg = GraphImportConfig::new(&edges);
    cfg.from_column = "tail".into();
    cfg.to_column = "head".into();
    cfg.capacity_column = "cap".into();
    let imported = load_graph_csv(&cfg).unwrap();
    let (_, edge) = imported.graph.edges().next().unwrap();
    assert_eq!(edge.capacity, 4.0);
}

#[test]
fn nodes_file_fixes_order_and_keeps_isolated_nodes() {
    let dir = TempDir::new().unwrap();
    let nodes = write(dir.path(), "nodes.csv", "id\nt\nlonely\ns\n");
    let edges = write(dir.path(), "edges.csv", "from,to\ns,t\n");
    let imported = load_graph_csv(&GraphImportConfig::new(&edges).nodes_path(&nodes)).unwrap();
    assert_eq!(imported.labels(), ["t", "lonely", "s"]);
    assert_eq!(imported.graph.node_count(), 3);
    assert_eq!(imported.index_of("s"), Some(2));
}

#[test]
fn nodes_file_rejects_unknown_and_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    let nodes = write(dir.path(), "nodes.csv", "id\ns\nt\n");
    let edges = write(dir.path(), "edges.csv", "from,to\ns,u\n");
    let err = load_graph_csv(&GraphImportConfig::new(&edges).nodes_path(&nodes)).unwrap_err();
    assert!(err.to_string().contains("unknown node 'u'"), "{err}");

    let dup = write(dir.path(), "dup.csv", "id\ns\ns\n");
    let err = load_graph_csv(&GraphImportConfig::new(&edges).nodes_path(&dup)).unwrap_err();
    assert!(err.to_string().contains("duplicate node id"), "{err}");
}

#[test]
fn rejects_bad_capacity_and_out_of_range_flow() {
    let dir = TempDir::new().unwrap();
    let negative = write(dir.path(), "neg.csv", "from,to,capacity\na,b,-1\n");
    let err = load_graph_csv(&GraphImportConfig::new(&negative)).unwrap_err();
    assert!(matches!(err, DinitzError::InvalidCapacity { .. }), "{err}");

    let garbage = write(dir.path(), "nan.csv", "from,to,capacity\na,b,lots\n");
    let err = load_graph_csv(&GraphImportConfig::new(&garbage)).unwrap_err();
    assert!(matches!(err, DinitzError::InvalidCapacity { .. }), "{err}");

    let over = write(dir.path(), "over.csv", "from,to,capacity,flow\na,b,2,3\n");
    let err = load_graph_csv(&GraphImportConfig::new(&over)).unwrap_err();
    assert!(err.to_string().contains("outside"), "{err}");
}

#[test]
fn initial_flow_is_loaded_and_respected() {
    let dir = TempDir::new().unwrap();
    let edges = write(
        dir.path(),
        "edges.csv",
        "from,to,capacity,flow\ns,t,3,1\n",
    );
    let mut imported = load_graph_csv(&GraphImportConfig::new(&edges)).unwrap();
    // Only the remaining residual is pushed.
    assert_eq!(run_max_flow(&mut imported.graph, 0, 1), 2.0);
    let (_, edge) = imported.graph.edges().next().unwrap();
    assert_eq!(edge.flow, 3.0);
}

#[test]
fn missing_required_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let edges = write(dir.path(), "edges.csv", "source,to\na,b\n");
    let err = load_graph_csv(&GraphImportConfig::new(&edges)).unwrap_err();
    assert!(err.to_string().contains("column 'from' not found"), "{err}");
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = load_graph_csv(&GraphImportConfig::new(dir.path().join("absent.csv"))).unwrap_err();
    assert!(matches!(err, DinitzError::Csv(_) | DinitzError::Io(_)), "{err}");
}

#[test]
fn precheck_on_imported_graph() {
    let dir = TempDir::new().unwrap();
    let edges = write(dir.path(), "edges.csv", "from,to\na,b\nc,a\n");
    let imported = load_graph_csv(&GraphImportConfig::new(&edges)).unwrap();
    let a = imported.index_of("a");
    let b = imported.index_of("b");
    let c = imported.index_of("c");

    assert_eq!(precheck(&imported.graph, a, b), Ok((0, 1)));
    assert_eq!(
        precheck(&imported.graph, a, None),
        Err(PrecheckError::MissingTerminal)
    );
    assert_eq!(
        precheck(&imported.graph, a, a),
        Err(PrecheckError::SameTerminal)
    );
    assert_eq!(precheck(&imported.graph, a, c), Err(PrecheckError::NoPath));
}
