use pretty_assertions::assert_eq;
use smellmap::config::SmellConfig;
use smellmap::core::{Severity, SmellDetails};
use smellmap::{analyze_source, SmellType};
use std::fmt::Write as _;

/// A bookstore class whose `process_order` spans 135 source lines with
/// cyclomatic complexity 18.
fn bookstore_source() -> String {
    let mut source = String::from("class BookstoreManager:\n");
    source.push_str("    def process_order(self, order):\n");
    for i in 0..17 {
        let _ = writeln!(source, "        if order.flag_{i}:");
        let _ = writeln!(source, "            step_{i} = {i}");
    }
    for i in 0..100 {
        let _ = writeln!(source, "        item_{i} = order.code");
    }
    source
}

#[test]
fn all_detectors_disabled_yields_an_empty_report() {
    let mut config = SmellConfig::default();
    config.retain_only(&[]);
    let report = analyze_source(&bookstore_source(), "bookstore.py", &config).unwrap();
    assert_eq!(report.summary.total_smells_detected, 0);
    assert!(report.details.is_empty());
    assert!(report.metadata.active_smells.is_empty());
}

#[test]
fn oversized_bookstore_method_is_a_high_long_method() {
    let mut config = SmellConfig::default();
    config.retain_only(&[SmellType::LongMethod]);
    let report = analyze_source(&bookstore_source(), "bookstore.py", &config).unwrap();

    assert_eq!(report.summary.total_smells_detected, 1);
    let finding = &report.details[0];
    assert_eq!(finding.smell_type, SmellType::LongMethod);
    assert_eq!(finding.severity, Severity::High);
    match &finding.details {
        SmellDetails::LongMethod {
            method_name,
            sloc,
            cyclomatic_complexity,
            sloc_threshold,
            complexity_threshold,
        } => {
            assert_eq!(method_name, "BookstoreManager.process_order");
            assert_eq!(*sloc, 135);
            assert_eq!(*cyclomatic_complexity, 18);
            assert_eq!(*sloc_threshold, 30);
            assert_eq!(*complexity_threshold, 12);
        }
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn eight_parameters_against_the_default_limit_is_medium() {
    let source = "def place_order(title, author, isbn, qty, price, buyer, address, coupon):\n    pass\n";
    let report = analyze_source(source, "order.py", &SmellConfig::default()).unwrap();
    let finding = report
        .details
        .iter()
        .find(|f| f.smell_type == SmellType::LargeParameterList)
        .expect("expected a LargeParameterList finding");
    assert_eq!(finding.severity, Severity::Medium);
    match &finding.details {
        SmellDetails::LargeParameterList {
            parameter_count, ..
        } => assert_eq!(*parameter_count, 8),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn five_occurrences_against_threshold_three_stay_medium() {
    let source = "a = 0.9\nb = 0.9\nc = 0.9\nd = 0.9\ne = 0.9\n";
    let report = analyze_source(source, "rates.py", &SmellConfig::default()).unwrap();
    assert_eq!(report.summary.total_smells_detected, 1);
    let finding = &report.details[0];
    assert_eq!(finding.smell_type, SmellType::MagicNumbers);
    // 5 < 2 * 3, so no escalation
    assert_eq!(finding.severity, Severity::Medium);
    match &finding.details {
        SmellDetails::MagicNumbers { occurrences, .. } => assert_eq!(*occurrences, 5),
        other => panic!("unexpected details: {other:?}"),
    }
}

#[test]
fn one_below_the_occurrence_threshold_never_appears() {
    let source = "a = 0.9\nb = 0.9\n";
    let report = analyze_source(source, "rates.py", &SmellConfig::default()).unwrap();
    assert!(report.details.is_empty());
}

#[test]
fn findings_come_out_in_declared_detector_order() {
    // Triggers LongMethod (complexity), LargeParameterList, and
    // MagicNumbers at once.
    let mut source = String::from("def busy(a, b, c, d, e, f, g, h):\n");
    for i in 0..13 {
        let _ = writeln!(source, "    if a:");
        let _ = writeln!(source, "        b = {}", 500 + (i % 2));
    }
    source.push_str("    c = 500\n    d = 500\n    e = 501\n    f = 501\n");

    let report = analyze_source(&source, "busy.py", &SmellConfig::default()).unwrap();
    let order: Vec<SmellType> = report.details.iter().map(|f| f.smell_type).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
    assert!(order.contains(&SmellType::LongMethod));
    assert!(order.contains(&SmellType::LargeParameterList));
    assert!(order.contains(&SmellType::MagicNumbers));
}

#[test]
fn identical_input_and_config_give_identical_findings() {
    let source = bookstore_source();
    let config = SmellConfig::default();
    let first = analyze_source(&source, "bookstore.py", &config).unwrap();
    let second = analyze_source(&source, "bookstore.py", &config).unwrap();

    // The timestamp differs between runs; everything else is stable.
    assert_eq!(
        serde_json::to_string(&first.summary).unwrap(),
        serde_json::to_string(&second.summary).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&first.details).unwrap(),
        serde_json::to_string(&second.details).unwrap()
    );
    assert_eq!(first.metadata.active_smells, second.metadata.active_smells);
}

#[test]
fn severity_does_not_decrease_as_sloc_grows() {
    let mut previous = None;
    for extra in [31, 40, 44, 45, 60, 90] {
        let mut source = String::from("def f(x):\n");
        for i in 0..extra {
            let _ = writeln!(source, "    x = x + {}", if i % 2 == 0 { "x" } else { "y" });
        }
        let mut config = SmellConfig::default();
        config.retain_only(&[SmellType::LongMethod]);
        let report = analyze_source(&source, "grow.py", &config).unwrap();
        let severity = report.details[0].severity;
        if let Some(previous) = previous {
            assert!(severity >= previous, "severity regressed at {extra} lines");
        }
        previous = Some(severity);
    }
}
