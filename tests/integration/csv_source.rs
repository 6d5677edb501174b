#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use catgraph::{
    CategoryGraph, CategoryId, CatgraphError, CostPolicy, CsvHierarchy, GraphOptions, Language,
    PageId,
};
use tempfile::{tempdir, TempDir};

struct Fixture {
    _dir: TempDir,
    categories: PathBuf,
    edges: PathBuf,
    pages: PathBuf,
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn fixture(categories: &str, edges: &str, pages: &str) -> Fixture {
    let dir = tempdir().unwrap();
    Fixture {
        categories: write(dir.path(), "categories.csv", categories),
        edges: write(dir.path(), "edges.csv", edges),
        pages: write(dir.path(), "pages.csv", pages),
        _dir: dir,
    }
}

fn source(f: &Fixture) -> CsvHierarchy {
    CsvHierarchy::new(Language::new("en").unwrap(), &f.categories)
        .with_edges(&f.edges)
        .with_pages(&f.pages)
}

#[test]
fn loads_hierarchy_from_csv_files() {
    let f = fixture(
        "id,label,cost\n10,Science,1.5\n20,Physics,\n30,Optics,0.25\n",
        "parent,child\n10,20\n20,30\n10,20\n",
        "category,page\n20,7\n20,8\n30,7\n",
    );
    let graph = CategoryGraph::load(&mut source(&f), GraphOptions::new()).unwrap();

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.children(CategoryId(10)), vec![CategoryId(20)]);
    assert_eq!(graph.parents(CategoryId(30)), vec![CategoryId(20)]);
    assert_eq!(graph.pages(CategoryId(20)), vec![PageId(7), PageId(8)]);
    assert_eq!(graph.label(CategoryId(20)), Some("Physics"));
    // empty cost cell falls back to the uniform policy
    assert_eq!(graph.cost(CategoryId(20)), Some(1.0));
    assert_eq!(graph.minimum_cost(), Some(0.25));

    let stats = graph.stats();
    assert_eq!(stats.edges, 2);
    assert_eq!(stats.page_memberships, 3);
    assert_eq!(stats.distinct_pages, 2);
    assert_eq!(stats.roots, 1);
}

#[test]
fn log_membership_policy_fills_missing_costs() {
    let f = fixture(
        "id,label\n1,Root\n2,Leaf\n",
        "parent,child\n1,2\n",
        "category,page\n1,100\n1,101\n",
    );
    let options = GraphOptions::new().cost_policy(CostPolicy::LogMembership);
    let graph = CategoryGraph::load(&mut source(&f), options).unwrap();

    let root = graph.cost(CategoryId(1)).unwrap();
    assert!((root - 4f64.ln()).abs() < 1e-12);
    assert_eq!(graph.cost(CategoryId(2)), Some(0.0));
    assert_eq!(graph.minimum_cost(), Some(0.0));
}

#[test]
fn edge_to_unknown_category_fails() {
    let f = fixture(
        "id,label\n1,Root\n",
        "parent,child\n1,99\n",
        "category,page\n",
    );
    let err = CategoryGraph::load(&mut source(&f), GraphOptions::new()).unwrap_err();
    assert!(matches!(
        err,
        CatgraphError::UnknownCategory {
            id: CategoryId(99),
            ..
        }
    ));
}

#[test]
fn self_loops_follow_options() {
    let f = fixture(
        "id,label\n1,Root\n",
        "parent,child\n1,1\n",
        "category,page\n",
    );
    let graph = CategoryGraph::load(&mut source(&f), GraphOptions::new()).unwrap();
    assert_eq!(graph.children(CategoryId(1)), vec![CategoryId(1)]);
    assert_eq!(graph.parents(CategoryId(1)), vec![CategoryId(1)]);

    let err = CategoryGraph::load(
        &mut source(&f),
        GraphOptions::new().reject_self_loops(true),
    )
    .unwrap_err();
    assert!(matches!(err, CatgraphError::SelfLoop(CategoryId(1))));
}

#[test]
fn malformed_cost_reports_line() {
    let f = fixture(
        "id,label,cost\n1,Root,1.0\n2,Bad,abc\n",
        "parent,child\n",
        "category,page\n",
    );
    match CategoryGraph::load(&mut source(&f), GraphOptions::new()) {
        Err(CatgraphError::Parse { path, line, .. }) => {
            assert_eq!(path, f.categories);
            assert_eq!(line, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let mut source = CsvHierarchy::new(
        Language::new("en").unwrap(),
        dir.path().join("missing.csv"),
    );
    let err = CategoryGraph::load(&mut source, GraphOptions::new()).unwrap_err();
    assert!(matches!(err, CatgraphError::Csv(_) | CatgraphError::Io(_)));
}
