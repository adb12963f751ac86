//! End-to-end pipeline tests against the deterministic mock detector.

use std::sync::Arc;

use nioi_detectors::detector::schemas::Candidate;
use nioi_detectors::{
    AnalysisConfig, AnalysisError, MockDetectorProvider, SmellAnalyzer, SmellCategory,
};

fn config_for(categories: &[SmellCategory]) -> AnalysisConfig {
    AnalysisConfig {
        enabled_categories: categories.to_vec(),
        ..AnalysisConfig::default()
    }
}

fn method_candidate(name: &str, description: &str) -> Candidate {
    Candidate {
        detected: Some(true),
        method_name: Some(name.to_string()),
        description: Some(description.to_string()),
        ..Default::default()
    }
}

/// Exactly 70 lines, 3 parameters, cyclomatic complexity 9.
fn crowded_function() -> String {
    let mut source = String::from("def crowded(a, b, c):\n");
    for i in 0..8 {
        source.push_str(&format!("    if a > {}:\n", i));
        source.push_str(&format!("        b += {}\n", i));
    }
    for i in 0..52 {
        source.push_str(&format!("    c += {}\n", i));
    }
    source.push_str("    return b + c\n");
    assert_eq!(source.lines().count(), 70);
    source
}

#[tokio::test]
async fn test_long_and_complex_method_share_one_resolved_range() {
    let categories = [
        SmellCategory::ComplexMethod,
        SmellCategory::LongMethod,
        SmellCategory::LongParameterList,
    ];
    let provider = Arc::new(
        MockDetectorProvider::new()
            .with_candidates(
                SmellCategory::LongMethod,
                vec![method_candidate("crowded", "Method 'crowded' is too long")],
            )
            .with_candidates(
                SmellCategory::ComplexMethod,
                vec![method_candidate("crowded", "Method 'crowded' is complex")],
            )
            .with_candidates(
                SmellCategory::LongParameterList,
                vec![method_candidate("crowded", "Method 'crowded' has parameters")],
            ),
    );

    let analyzer = SmellAnalyzer::new(provider, config_for(&categories));
    let report = analyzer
        .analyze(&crowded_function(), Some("pkg/module.py"), "Code")
        .await
        .unwrap();

    // 70 lines > 67 and CC 9 > 7 pass; 3 parameters is under the limit.
    assert_eq!(report.total_findings(), 2);
    assert_eq!(report.count_for(SmellCategory::LongMethod), 1);
    assert_eq!(report.count_for(SmellCategory::ComplexMethod), 1);
    assert_eq!(report.count_for(SmellCategory::LongParameterList), 0);

    let long = &report.findings[1];
    let complex = &report.findings[0];
    assert_eq!(complex.category, SmellCategory::ComplexMethod);
    assert_eq!(long.location, complex.location);
    assert_eq!(long.location.display(), "1 - 70");
}

#[tokio::test]
async fn test_single_detector_failure_is_isolated() {
    let categories = [
        SmellCategory::ComplexMethod,
        SmellCategory::LongMethod,
        SmellCategory::MagicNumber,
    ];
    let provider = Arc::new(
        MockDetectorProvider::new()
            .failing_for(SmellCategory::ComplexMethod)
            .with_candidates(
                SmellCategory::LongMethod,
                vec![method_candidate("crowded", "Method 'crowded' is too long")],
            )
            .with_candidates(
                SmellCategory::MagicNumber,
                vec![Candidate {
                    detected: Some(true),
                    description: Some("Magic number 9.81 detected".to_string()),
                    line_no: Some(3),
                    ..Default::default()
                }],
            ),
    );

    let analyzer = SmellAnalyzer::new(provider, config_for(&categories));
    let report = analyzer.analyze(&crowded_function(), None, "Code").await.unwrap();

    assert_eq!(report.usage.calls_attempted, 3);
    assert_eq!(report.usage.calls_failed, 1);
    assert_eq!(report.usage.calls_succeeded, 2);
    assert_eq!(report.count_for(SmellCategory::LongMethod), 1);
    assert_eq!(report.count_for(SmellCategory::MagicNumber), 1);
    assert_eq!(report.count_for(SmellCategory::ComplexMethod), 0);
}

#[tokio::test]
async fn test_identical_runs_produce_identical_reports() {
    let categories = [SmellCategory::LongMethod, SmellCategory::MagicNumber];
    let source = crowded_function();

    let mut reports = Vec::new();
    for _ in 0..2 {
        let provider = Arc::new(
            MockDetectorProvider::new()
                .with_candidates(
                    SmellCategory::LongMethod,
                    vec![method_candidate("crowded", "Method 'crowded' is too long")],
                )
                .with_candidates(
                    SmellCategory::MagicNumber,
                    vec![Candidate {
                        detected: Some(true),
                        description: Some("Magic number 365 detected".to_string()),
                        line_no: Some(2),
                        ..Default::default()
                    }],
                ),
        );
        let analyzer = SmellAnalyzer::new(provider, config_for(&categories));
        reports.push(analyzer.analyze(&source, Some("a/b.py"), "Code").await.unwrap());
    }

    let first = serde_json::to_value(&reports[0].findings).unwrap();
    let second = serde_json::to_value(&reports[1].findings).unwrap();
    assert_eq!(first, second);
    assert_eq!(reports[0].counts_by_category, reports[1].counts_by_category);
}

#[tokio::test]
async fn test_unresolvable_candidates_never_reach_the_report() {
    let provider = Arc::new(MockDetectorProvider::new().with_candidates(
        SmellCategory::LongMethod,
        vec![
            method_candidate("no_such_method", "Method 'no_such_method' has 90 lines"),
            Candidate {
                detected: Some(true),
                description: Some("has 90 lines".to_string()),
                line_no: Some(40_000),
                ..Default::default()
            },
        ],
    ));

    let analyzer = SmellAnalyzer::new(provider, config_for(&[SmellCategory::LongMethod]));
    let report = analyzer
        .analyze("def real():\n    pass\n", None, "Code")
        .await
        .unwrap();

    assert!(report.is_empty());
    // The call itself succeeded; dropping locations is not a failure.
    assert_eq!(report.usage.calls_failed, 0);
}

#[tokio::test]
async fn test_invalid_source_differs_from_oversized_source() {
    let provider = Arc::new(MockDetectorProvider::new());
    let analyzer = SmellAnalyzer::new(provider, AnalysisConfig::default());

    let report = analyzer
        .analyze("def broken(:\n    pass\n", None, "Code")
        .await
        .unwrap();
    assert!(report.is_empty());
    assert!(report.parse_error.is_some());

    let mut tight = AnalysisConfig::default();
    tight.limits.max_source_bytes = 8;
    let analyzer = SmellAnalyzer::new(Arc::new(MockDetectorProvider::new()), tight);
    let result = analyzer.analyze("x = 1111111111\n", None, "Code").await;
    assert!(matches!(result, Err(AnalysisError::SourceTooLarge { .. })));
}

#[tokio::test]
async fn test_duplicate_candidates_collapse() {
    let duplicate = Candidate {
        detected: Some(true),
        description: Some("Magic number 9.81 detected".to_string()),
        line_no: Some(1),
        ..Default::default()
    };
    let provider = Arc::new(MockDetectorProvider::new().with_candidates(
        SmellCategory::MagicNumber,
        vec![duplicate.clone(), duplicate],
    ));

    let analyzer = SmellAnalyzer::new(provider, config_for(&[SmellCategory::MagicNumber]));
    let report = analyzer.analyze("g = 9.81\n", None, "Code").await.unwrap();

    assert_eq!(report.total_findings(), 1);
}

#[tokio::test]
async fn test_sequential_mode_produces_same_findings() {
    let source = crowded_function();
    let candidates = vec![method_candidate("crowded", "Method 'crowded' is too long")];

    let concurrent = SmellAnalyzer::new(
        Arc::new(
            MockDetectorProvider::new()
                .with_candidates(SmellCategory::LongMethod, candidates.clone()),
        ),
        config_for(&[SmellCategory::LongMethod]),
    );
    let mut sequential_config = config_for(&[SmellCategory::LongMethod]);
    sequential_config.execution = nioi_detectors::ExecutionMode::Sequential { pacing_ms: 1 };
    let sequential = SmellAnalyzer::new(
        Arc::new(
            MockDetectorProvider::new().with_candidates(SmellCategory::LongMethod, candidates),
        ),
        sequential_config,
    );

    let a = concurrent.analyze(&source, None, "Code").await.unwrap();
    let b = sequential.analyze(&source, None, "Code").await.unwrap();

    assert_eq!(
        serde_json::to_value(&a.findings).unwrap(),
        serde_json::to_value(&b.findings).unwrap()
    );
}
