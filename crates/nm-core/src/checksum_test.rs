use super::*;

#[test]
fn test_split_simple_statements() {
    assert_eq!(
        split_statements("STATEMENT1;STATEMENT2;"),
        vec!["STATEMENT1", "STATEMENT2"]
    );
}

#[test]
fn test_split_drops_empty_statements_and_keeps_comments() {
    let script = "//some comment\n  MATCH (n) RETURN n;\n\n //some other comment\n MATCH (n)\n    RETURN (n);\n;\n";
    assert_eq!(
        split_statements(script),
        vec![
            "//some comment\n  MATCH (n) RETURN n",
            "//some other comment\n MATCH (n)\n    RETURN (n)",
        ]
    );
}

#[test]
fn test_split_ignores_unterminated_tail() {
    assert_eq!(
        split_statements("CREATE (:A);\nCREATE (:B)"),
        vec!["CREATE (:A)"]
    );
}

#[test]
fn test_split_empty_script() {
    assert!(split_statements("").is_empty());
    assert!(split_statements("  \n ; ;").is_empty());
}

#[test]
fn test_checksum_of_repeated_statements() {
    let statements = split_statements(
        "MATCH (n) RETURN count(n) AS n;\nMATCH (n) RETURN count(n) AS n;\nMATCH (n) RETURN count(n) AS n;\n",
    );
    assert_eq!(compute_checksum(&statements), "1902097523");
}

#[test]
fn test_checksum_ignores_surrounding_whitespace() {
    let script = "//some comment\n  MATCH (n) RETURN n;\n\n //some other comment\n MATCH (n)\n    RETURN (n);\n;\n";
    assert_eq!(compute_checksum(&split_statements(script)), "3156131171");
}

#[test]
fn test_checksum_is_stable() {
    let script = "CREATE INDEX person_name FOR (p:Person) ON (p.name);\nMATCH (n) RETURN n;";
    let first = compute_checksum(&split_statements(script));
    let second = compute_checksum(&split_statements(script));
    assert_eq!(first, second);
}

#[test]
fn test_checksum_changes_on_any_byte() {
    let original = compute_checksum(&["CREATE (:Person {name: 'a'})", "MATCH (n) RETURN n"]);
    let first_changed = compute_checksum(&["CREATE (:Person {name: 'b'})", "MATCH (n) RETURN n"]);
    let second_changed = compute_checksum(&["CREATE (:Person {name: 'a'})", "MATCH (m) RETURN m"]);
    assert_ne!(original, first_changed);
    assert_ne!(original, second_changed);
}

#[test]
fn test_checksum_of_nothing() {
    let empty: [&str; 0] = [];
    assert_eq!(compute_checksum(&empty), EMPTY_CHECKSUM);
    assert_eq!(compute_checksum(&split_statements("  \n")), "None");
}

#[test]
fn test_checksum_ignores_statement_boundaries() {
    let split = split_statements("CREATE (:A);CREATE (:B);");
    let joined = split_statements("CREATE (:A)CREATE (:B);");
    assert_ne!(split, joined);
    assert_eq!(compute_checksum(&split), compute_checksum(&joined));
}
