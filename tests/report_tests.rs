//! Integration tests for the plain-text recall report

use clone_recall::core::model::{
    CloneType, DetectedReport, Fragment, FragmentSize, Functionality, Locality, ReferenceClone,
    Similarity, Tool,
};
use clone_recall::engine::{EvaluationSettings, RecallEvaluator};
use clone_recall::io::report::ReportWriter;
use clone_recall::io::store::{BenchmarkSnapshot, InMemoryStore, ToolDetections};
use clone_recall::matchers;
use tempfile::tempdir;

fn reference(
    id: i64,
    clone_type: CloneType,
    similarity: Option<f64>,
    locality: Locality,
) -> ReferenceClone {
    ReferenceClone {
        id,
        clone_type,
        similarity: similarity.map(|s| Similarity { line: s, token: s }),
        first: Fragment::new(format!("f{id}/Left.java"), 10, 29),
        second: Fragment::new(format!("f{id}/Right.java"), 40, 59),
        first_size: FragmentSize::default(),
        second_size: FragmentSize::default(),
        judges: 1,
        confidence: 1,
        locality,
        functionality: Some(2),
        internal: false,
    }
}

fn benchmark() -> InMemoryStore {
    InMemoryStore::from_snapshot(BenchmarkSnapshot {
        version: "bench-2024".to_string(),
        tools: vec![Tool {
            id: 4,
            name: "NiCad".to_string(),
            description: "Near-miss clone detector".to_string(),
        }],
        functionalities: vec![Functionality {
            id: 2,
            name: "Bubble Sort".to_string(),
            description: "Sort an array".to_string(),
        }],
        clones: vec![
            reference(1, CloneType::Type1, None, Locality::Intra),
            reference(2, CloneType::Type1, None, Locality::Inter),
            reference(3, CloneType::Type3, Some(75.0), Locality::Inter),
            reference(4, CloneType::Type3, Some(20.0), Locality::Intra),
        ],
        detections: vec![ToolDetections {
            tool_id: 4,
            reports: vec![
                DetectedReport::new(
                    Fragment::new("f1/Left.java", 10, 29),
                    Fragment::new("f1/Right.java", 40, 59),
                ),
                DetectedReport::new(
                    Fragment::new("f3/Right.java", 38, 60),
                    Fragment::new("f3/Left.java", 8, 31),
                ),
            ],
        }],
    })
    .unwrap()
}

fn render(min_similarity: u32, functionalities: Vec<i64>) -> String {
    let store = benchmark();
    let matcher = matchers::load(4, "CoverageMatcher", "0.7").unwrap();
    let evaluator = RecallEvaluator::new(&store, EvaluationSettings::new(4), matcher).unwrap();

    let mut out = Vec::new();
    ReportWriter::new(&store, min_similarity)
        .unwrap()
        .with_functionalities(functionalities)
        .write(&mut out, &evaluator)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_header_describes_run() {
    let report = render(0, Vec::new());

    assert!(report.contains("       Tool: 4 - NiCad"));
    assert!(report.contains("    #Clones: 2"));
    assert!(report.contains("Benchmark: bench-2024"));
    assert!(report.contains("Sim Type: both"));
    assert!(report.contains("CoverageMatcher"));
}

#[test]
fn test_per_type_rows() {
    let report = render(0, Vec::new());

    assert!(report.contains("Type-1: 1 / 2 = 0.5000"));
    assert!(report.contains("Type-2: 0 / 0 = n/a"));
    assert!(report.contains("Strongly Type-3: 1 / 1 = 1.0000"));
    assert!(report.contains("Weakly Type-3/Type-4: 0 / 1 = 0.0000"));
    assert!(report.contains("[75,80]: 1 / 1 = 1.0000"));
    assert!(report.contains("[20,100]: 1 / 2 = 0.5000"));
}

#[test]
fn test_min_similarity_hides_lower_bands() {
    let report = render(50, Vec::new());

    assert!(!report.contains("Weakly Type-3/Type-4: 0 /"));
    assert!(!report.contains("[45,50]"));
    assert!(report.contains("[50,55]"));
    assert!(report.contains("[50,100]: 1 / 1 = 1.0000"));
}

#[test]
fn test_functionality_sections() {
    let report = render(0, vec![2, 77]);

    assert!(report.contains("name: Bubble Sort"));
    assert!(report.contains("  id: 77"));
    assert!(report.contains("name: (unknown)"));
    assert_eq!(report.matches("-- Inter-Project Recall Per Clone Type").count(), 3);
}

#[test]
fn test_invalid_min_similarity() {
    let store = benchmark();
    assert!(ReportWriter::new(&store, 33).is_err());
    assert!(ReportWriter::new(&store, 100).is_err());
}

#[test]
fn test_write_to_path() {
    let store = benchmark();
    let matcher = matchers::load(4, "CoverageMatcher", "0.7").unwrap();
    let evaluator = RecallEvaluator::new(&store, EvaluationSettings::new(4), matcher).unwrap();
    let dir = tempdir().unwrap();
    let writer = ReportWriter::new(&store, 0).unwrap();

    let path = dir.path().join("nicad.report");
    writer.write_to_path(&path, &evaluator).unwrap();
    assert!(std::fs::read_to_string(&path).unwrap().contains("-- Tool --"));

    let missing_dir = dir.path().join("missing").join("nicad.report");
    assert!(writer.write_to_path(&missing_dir, &evaluator).is_err());
}
