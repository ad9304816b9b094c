use regcompare::{diff, ChangeStatus, ClauseChange, ClauseMap, DiffSummary};
use serde_json::json;

fn map(entries: &[(&str, &str)]) -> ClauseMap {
    entries.iter().map(|&(k, v)| (k, v)).collect()
}

#[test]
fn added_clause() {
    let out = diff(&map(&[("Pasal 1", "A")]), &map(&[("Pasal 1", "A"), ("Pasal 2", "B")]));
    assert_eq!(out.changes, vec![ClauseChange::added("Pasal 2", "B")]);
    assert_eq!(out.summary, DiffSummary { added: 1, removed: 0, modified: 0 });
}

#[test]
fn modified_clause() {
    let out = diff(&map(&[("Pasal 1", "A")]), &map(&[("Pasal 1", "A2")]));
    assert_eq!(out.changes, vec![ClauseChange::modified("Pasal 1", "A", "A2")]);
    assert_eq!(out.summary, DiffSummary { added: 0, removed: 0, modified: 1 });
}

#[test]
fn removed_clause() {
    let out = diff(&map(&[("Pasal 1", "A"), ("Pasal 2", "B")]), &map(&[("Pasal 1", "A")]));
    assert_eq!(out.changes, vec![ClauseChange::removed("Pasal 2", "B")]);
    assert_eq!(out.summary, DiffSummary { added: 0, removed: 1, modified: 0 });
}

#[test]
fn surrounding_whitespace_is_not_a_change() {
    let out = diff(&map(&[("Pasal 1", "A \n")]), &map(&[("Pasal 1", "  A")]));
    assert!(out.changes.is_empty());
    assert_eq!(out.summary.total(), 0);
}

#[test]
fn inner_whitespace_is_a_change() {
    let out = diff(&map(&[("Pasal 1", "A B")]), &map(&[("Pasal 1", "A  B")]));
    assert_eq!(out.summary.modified, 1);
}

#[test]
fn removals_follow_new_side_changes() {
    let old = map(&[("Pasal 1", "a"), ("Pasal 2", "b"), ("Pasal 3", "c")]);
    let new = map(&[("Pasal 3", "c2"), ("Pasal 4", "d"), ("Pasal 1", "a")]);
    let out = diff(&old, &new);
    let order: Vec<(&str, ChangeStatus)> = out.changes.iter().map(|c| (c.pasal.as_str(), c.status)).collect();
    assert_eq!(
        order,
        vec![
            ("Pasal 3", ChangeStatus::Modified),
            ("Pasal 4", ChangeStatus::Added),
            ("Pasal 2", ChangeStatus::Removed),
        ]
    );
    assert_eq!(out.summary, DiffSummary { added: 1, removed: 1, modified: 1 });
}

#[test]
fn empty_sides() {
    let full = map(&[("Pasal 1", "a"), ("Pasal 2", "b")]);
    let empty = ClauseMap::new();
    assert_eq!(diff(&empty, &full).summary, DiffSummary { added: 2, removed: 0, modified: 0 });
    assert_eq!(diff(&full, &empty).summary, DiffSummary { added: 0, removed: 2, modified: 0 });
    assert!(diff(&empty, &empty).changes.is_empty());
}

#[test]
fn change_serializes_with_lowercase_status_and_nulls() {
    let v = serde_json::to_value(ClauseChange::added("Pasal 2", "B")).unwrap();
    assert_eq!(v, json!({"pasal": "Pasal 2", "status": "added", "old_text": null, "new_text": "B"}));
    let v = serde_json::to_value(ClauseChange::removed("Pasal 2", "B")).unwrap();
    assert_eq!(v, json!({"pasal": "Pasal 2", "status": "removed", "old_text": "B", "new_text": null}));
}
