use super::*;
use crate::{
    db::{
        query::{QueryError, SearchSpec, SortSpec},
        row::Row,
    },
    value::Value,
};
use proptest::prelude::*;

fn check_row() -> Row {
    Row::new()
        .with("id", 3000)
        .with("title", "Ensure SSH root login is disabled")
        .with("result", "failed")
        .with("reason", Value::Null)
        .with("references", Value::from_list(vec!["https://a", "https://b"]))
}

//
// parse
//

#[test]
fn parses_single_comparison() {
    let predicate = parse("result=failed").unwrap();

    assert_eq!(predicate, Some(Predicate::eq("result", "failed")));
}

#[test]
fn semicolon_binds_tighter_than_comma() {
    let predicate = parse("result=failed;id>10,title~ssh").unwrap();

    assert_eq!(
        predicate,
        Some(Predicate::or(vec![
            Predicate::and(vec![
                Predicate::eq("result", "failed"),
                Predicate::gt("id", "10"),
            ]),
            Predicate::like("title", "ssh"),
        ]))
    );
}

#[test]
fn parentheses_override_precedence() {
    let predicate = parse("(result=failed,result=passed);id!=3").unwrap();

    assert_eq!(
        predicate,
        Some(Predicate::and(vec![
            Predicate::or(vec![
                Predicate::eq("result", "failed"),
                Predicate::eq("result", "passed"),
            ]),
            Predicate::ne("id", "3"),
        ]))
    );
}

#[test]
fn values_keep_inner_spaces() {
    let predicate = parse("title~root login").unwrap();

    assert_eq!(predicate, Some(Predicate::like("title", "root login")));
}

#[test]
fn blank_query_is_no_predicate() {
    assert_eq!(parse("   ").unwrap(), None);
}

#[test]
fn reports_parse_errors_with_position() {
    let cases = [
        ("result", 6),
        ("=x", 0),
        ("result=", 7),
        ("result!x", 7),
        ("(result=x", 9),
        ("result=x)", 8),
        ("result^x", 6),
    ];

    for (input, expected) in cases {
        match parse(input) {
            Err(QueryError::Parse { position, .. }) => {
                assert_eq!(position, expected, "input {input:?}");
            }
            other => panic!("expected parse error for {input:?}, got {other:?}"),
        }
    }
}

#[test]
fn deep_nesting_is_rejected() {
    let input = format!("{}a=1{}", "(".repeat(100), ")".repeat(100));

    assert!(matches!(parse(&input), Err(QueryError::Parse { .. })));
}

//
// eval
//

#[test]
fn literal_comparisons_follow_stored_type() {
    let row = check_row();

    assert!(eval(&row, &Predicate::gt("id", "999")));
    assert!(eval(&row, &Predicate::lt("id", "3001")));
    assert!(eval(&row, &Predicate::eq("id", 3000)));
    assert!(!eval(&row, &Predicate::eq("id", "abc")));
    assert!(eval(&row, &Predicate::like("title", "SSH ROOT")));
}

#[test]
fn null_and_missing_never_match() {
    let row = check_row();

    assert!(!eval(&row, &Predicate::eq("reason", "")));
    assert!(!eval(&row, &Predicate::ne("reason", "x")));
    assert!(!eval(&row, &Predicate::eq("command", "x")));
    assert!(!eval(&row, &Predicate::ne("command", "x")));
}

#[test]
fn list_fields_match_any_item() {
    let row = check_row();

    assert!(eval(&row, &Predicate::eq("references", "https://b")));
    assert!(!eval(&row, &Predicate::ne("references", "https://b")));
    assert!(eval(&row, &Predicate::ne("references", "https://c")));
}

#[test]
fn search_honours_negation() {
    let row = check_row();
    let search = SearchSpec::new("ROOT").in_fields(["title", "result"]);

    assert!(search_matches(&row, &search));
    assert!(!search_matches(&row, &search.clone().negated()));
    assert!(!search_matches(
        &row,
        &SearchSpec::new("root").in_fields(["result"])
    ));
}

#[test]
fn sort_is_stable_and_reversible() {
    let mut rows = vec![
        Row::new().with("id", 2).with("result", "passed"),
        Row::new().with("id", 1).with("result", "failed"),
        Row::new().with("id", 3).with("result", "failed"),
        Row::new().with("id", 4),
    ];

    sort_rows(&mut rows, &SortSpec::asc(["result"]));
    let ids: Vec<_> = rows.iter().map(|r| r.check_id("id").unwrap().get()).collect();
    assert_eq!(ids, vec![4, 1, 3, 2]);

    sort_rows(&mut rows, &SortSpec::desc(["id"]));
    let ids: Vec<_> = rows.iter().map(|r| r.check_id("id").unwrap().get()).collect();
    assert_eq!(ids, vec![4, 3, 2, 1]);
}

//
// properties
//

fn arb_predicate() -> impl Strategy<Value = Predicate> {
    let leaf = prop_oneof![
        (0i64..10).prop_map(|n| Predicate::eq("id", n)),
        (0i64..10).prop_map(|n| Predicate::gt("id", n.to_string())),
        "[a-z]{0,3}".prop_map(|s| Predicate::like("title", s)),
    ];

    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Predicate::And),
            prop::collection::vec(inner, 0..4).prop_map(Predicate::Or),
        ]
    })
}

proptest! {
    #[test]
    fn conjoin_matches_only_when_both_sides_match(
        left in arb_predicate(),
        right in arb_predicate(),
        id in 0i64..10,
        title in "[a-z]{0,5}",
    ) {
        let row = Row::new().with("id", id).with("title", title);
        let expected = eval(&row, &left) && eval(&row, &right);
        let joined = Predicate::conjoin(Some(left), Some(right));

        prop_assert_eq!(joined.is_some_and(|p| eval(&row, &p)), expected);
    }

    #[test]
    fn or_matches_when_any_branch_matches(
        branches in prop::collection::vec(arb_predicate(), 0..4),
        id in 0i64..10,
    ) {
        let row = Row::new().with("id", id);
        let expected = branches.iter().any(|p| eval(&row, p));

        prop_assert_eq!(eval(&row, &Predicate::or(branches)), expected);
    }

    #[test]
    fn search_negation_partitions_rows(value in "[a-z]{0,3}", title in "[a-z]{0,6}") {
        let row = Row::new().with("title", title);
        let search = SearchSpec::new(value).in_fields(["title"]);

        let negated = search.clone().negated();

        prop_assert_ne!(search_matches(&row, &search), search_matches(&row, &negated));
    }
}
