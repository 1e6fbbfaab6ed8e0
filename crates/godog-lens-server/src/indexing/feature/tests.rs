//! Tests for feature document parsing.

use super::*;
use rstest::rstest;

const PATH: &str = "/w/features/login.feature";

fn parse(text: &str) -> Vec<FeatureRecord> {
    parse_feature_document(Path::new(PATH), text)
}

#[expect(clippy::expect_used, reason = "tests use explicit failures for clarity")]
#[test]
fn records_feature_and_scenario_lines() {
    let text = concat!(
        "@auth\n",
        "Feature: Login\n",
        "  As a user\n",
        "\n",
        "  Background:\n",
        "    Given a user\n",
        "  Scenario: Valid creds\n",
        "    When they log in\n",
        "    Then they see the dashboard\n",
        "\n",
        "  Scenario Outline: Bad creds <n>\n",
        "    Examples:\n",
        "      | n |\n",
    );
    let records = parse(text);
    assert_eq!(records.len(), 1);
    let login = records.first().expect("one record");
    assert_eq!(login.name, "Login");
    assert_eq!(login.file_path, Path::new(PATH));
    assert_eq!(login.line_number, 1);
    assert_eq!(login.scenario_names, vec!["Valid creds", "Bad creds <n>"]);
    assert_eq!(login.scenario_line("Valid creds"), Some(6));
    assert_eq!(login.scenario_line("Bad creds <n>"), Some(10));
}

#[test]
fn every_feature_header_starts_a_new_record() {
    let text = concat!(
        "Feature: One\n",
        "  Scenario: a\n",
        "Feature: Two\n",
        "  Scenario: b\n",
        "  Scenario: c\n",
    );
    let records = parse(text);
    let summary: Vec<(&str, u32, usize)> = records
        .iter()
        .map(|r| (r.name.as_str(), r.line_number, r.scenario_names.len()))
        .collect();
    assert_eq!(summary, vec![("One", 0, 1), ("Two", 2, 2)]);
}

#[test]
fn scenarios_before_any_feature_are_dropped() {
    let text = concat!(
        "Scenario: orphan\n",
        "Feature: Late\n",
        "  Scenario: owned\n",
    );
    let records = parse(text);
    assert!(records.iter().all(|r| !r.has_scenario("orphan")));
    assert_eq!(
        records.first().map(|r| r.scenario_names.clone()),
        Some(vec!["owned".to_owned()])
    );
}

#[test]
fn document_without_feature_yields_nothing() {
    assert!(parse("Scenario: orphan\n  Given nothing\n").is_empty());
    assert!(parse("").is_empty());
}

#[test]
fn crlf_line_endings_do_not_leak_into_names() {
    let records = parse("Feature: Login\r\n  Scenario: Valid creds\r\n");
    assert_eq!(
        records.first().map(|r| (r.name.as_str(), r.scenario_line("Valid creds"))),
        Some(("Login", Some(1)))
    );
}

#[rstest]
#[case("Feature:", "")]
#[case("Feature:   Spaced   ", "Spaced")]
#[case("\tFeature: Tabbed", "Tabbed")]
fn feature_names_are_trimmed(#[case] line: &str, #[case] expected: &str) {
    let records = parse(line);
    assert_eq!(records.first().map(|r| r.name.as_str()), Some(expected));
}

#[test]
fn non_header_mentions_are_ignored() {
    let text = concat!(
        "Feature: Docs\n",
        "  Given the text \"Scenario: not a header\"\n",
        "  # Scenario: commented\n",
    );
    let records = parse(text);
    assert_eq!(records.first().map(|r| r.scenario_names.len()), Some(0));
}

#[test]
fn names_and_line_map_stay_in_step() {
    let text = concat!(
        "Feature: F\n",
        "  Scenario: a\n",
        "  Scenario: b\n",
        "  Scenario: a\n",
    );
    for record in parse(text) {
        for name in &record.scenario_names {
            assert!(record.has_scenario(name));
        }
        assert_eq!(record.scenario_line("a"), Some(3));
    }
}

#[test]
fn recorded_scenario_lines_point_at_their_header() {
    let text = "Feature: F\n\n  Scenario: first\n\n\n  Scenario: second\n";
    let lines: Vec<&str> = text.lines().collect();
    for record in parse(text) {
        for name in &record.scenario_names {
            let line = record
                .scenario_line(name)
                .and_then(|n| usize::try_from(n).ok())
                .and_then(|n| lines.get(n).copied());
            assert_eq!(line.map(str::trim), Some(format!("Scenario: {name}").as_str()));
        }
    }
}
