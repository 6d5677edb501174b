#![allow(missing_docs)]

use std::fs::File;

use catgraph::graph::GraphSnapshot;
use catgraph::{
    CategoryGraph, CategoryId, CatgraphError, GraphOptions, Language, MemoryHierarchy,
    SnapshotFormat,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tempfile::tempdir;

fn random_graph(seed: u64, categories: u64) -> CategoryGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut source = MemoryHierarchy::new(Language::new("fr").unwrap());
    for i in 0..categories {
        let cost = if rng.gen_bool(0.2) {
            None
        } else {
            Some(rng.gen_range(0.0..10.0))
        };
        source = source.category(i * 7 + 3, &format!("Catégorie {i}"), cost);
    }
    for _ in 0..categories * 3 {
        let parent = rng.gen_range(0..categories) * 7 + 3;
        let child = rng.gen_range(0..categories) * 7 + 3;
        source = source.edge(parent, child);
    }
    for _ in 0..categories * 2 {
        let category = rng.gen_range(0..categories) * 7 + 3;
        source = source.page(category, rng.gen_range(0..1_000));
    }
    CategoryGraph::load(&mut source, GraphOptions::new()).unwrap()
}

fn assert_same_answers(left: &CategoryGraph, right: &CategoryGraph) {
    assert_eq!(left.language(), right.language());
    assert_eq!(left.len(), right.len());
    assert_eq!(left.minimum_cost(), right.minimum_cost());
    for id in left.categories() {
        assert_eq!(left.category_index(id), right.category_index(id));
        assert_eq!(left.children(id), right.children(id));
        assert_eq!(left.parents(id), right.parents(id));
        assert_eq!(left.pages(id), right.pages(id));
        assert_eq!(left.label(id), right.label(id));
        assert_eq!(
            left.cost(id).map(f64::to_bits),
            right.cost(id).map(f64::to_bits)
        );
    }
}

#[test]
fn files_roundtrip_in_both_formats() {
    let graph = random_graph(7, 200);
    let dir = tempdir().unwrap();
    for name in ["graph.json", "graph.snap"] {
        let path = dir.path().join(name);
        let format = SnapshotFormat::from_path(&path);
        graph
            .write_snapshot(File::create(&path).unwrap(), format)
            .unwrap();
        let restored =
            CategoryGraph::read_snapshot(File::open(&path).unwrap(), format, GraphOptions::new())
                .unwrap();
        assert_same_answers(&graph, &restored);
    }
}

#[test]
fn costs_survive_bit_for_bit() {
    let mut rng = ChaCha8Rng::seed_from_u64(19);
    let mut source = MemoryHierarchy::new(Language::new("en").unwrap());
    let mut id = 0u64;
    while id < 20_000 {
        // any finite non-negative double, subnormals and extremes included
        let cost = f64::from_bits(rng.gen::<u64>() >> 1);
        if !cost.is_finite() {
            continue;
        }
        source = source.category(id, "c", Some(cost));
        id += 1;
    }
    for _ in 0..5_000 {
        source = source.category(id, "c", Some(rng.gen_range(0.0..100.0)));
        id += 1;
    }
    let graph = CategoryGraph::load(&mut source, GraphOptions::new()).unwrap();

    for format in [SnapshotFormat::Json, SnapshotFormat::JsonSnappy] {
        let mut buf = Vec::new();
        graph.write_snapshot(&mut buf, format).unwrap();
        let restored =
            CategoryGraph::read_snapshot(buf.as_slice(), format, GraphOptions::new()).unwrap();
        let mismatches = graph
            .indices()
            .filter(|i| graph.cost_of(*i).to_bits() != restored.cost_of(*i).to_bits())
            .count();
        assert_eq!(mismatches, 0, "{format:?}");
        assert_eq!(
            graph.minimum_cost().map(f64::to_bits),
            restored.minimum_cost().map(f64::to_bits)
        );
    }
}

#[test]
fn compressed_snapshot_is_smaller() {
    let graph = random_graph(11, 500);
    let mut plain = Vec::new();
    let mut packed = Vec::new();
    graph.write_snapshot(&mut plain, SnapshotFormat::Json).unwrap();
    graph
        .write_snapshot(&mut packed, SnapshotFormat::JsonSnappy)
        .unwrap();
    assert!(packed.len() < plain.len());
}

#[test]
fn reading_with_wrong_format_fails() {
    let graph = random_graph(3, 20);
    let mut packed = Vec::new();
    graph
        .write_snapshot(&mut packed, SnapshotFormat::JsonSnappy)
        .unwrap();
    let err = CategoryGraph::read_snapshot(packed.as_slice(), SnapshotFormat::Json, GraphOptions::new())
        .unwrap_err();
    assert!(matches!(err, CatgraphError::Json(_)));
}

#[test]
fn hand_written_snapshot_is_validated() {
    let json = r#"{
        "version": 1,
        "language": "en",
        "categories": [
            {"id": 1, "label": "A", "cost": 1.0, "children": [2]},
            {"id": 2, "label": "B", "cost": 0.5, "parents": [1], "pages": [9]}
        ]
    }"#;
    let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
    let graph = CategoryGraph::from_snapshot(snapshot, GraphOptions::new()).unwrap();
    assert_eq!(graph.children(CategoryId(1)), vec![CategoryId(2)]);
    assert_eq!(graph.minimum_cost(), Some(0.5));

    let bad = json.replace(r#""cost": 0.5"#, r#""cost": -0.5"#);
    let snapshot: GraphSnapshot = serde_json::from_str(&bad).unwrap();
    assert!(matches!(
        CategoryGraph::from_snapshot(snapshot, GraphOptions::new()),
        Err(CatgraphError::InvalidCost { .. })
    ));
}
