//! Integration tests for day column layout.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dayview_core::{
    compute_blobs, compute_layout, Chunk, ColumnContext, EventColumn, LayoutTree, Occurrence,
    OccurrenceId, SchedulerConfig,
};
use std::sync::Arc;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
}

fn event(id: &str, start: (u32, u32), end: (u32, u32)) -> Arc<Occurrence> {
    Arc::new(Occurrence::event(id, id, at(start.0, start.1), at(end.0, end.1)))
}

fn ctx() -> ColumnContext {
    ColumnContext::new(date(), chrono_tz::UTC)
}

fn slots(occurrences: &[Arc<Occurrence>], ctx: &ColumnContext) -> Vec<(usize, Vec<(String, usize, usize)>)> {
    compute_blobs(occurrences, ctx)
        .unwrap()
        .into_iter()
        .map(|blob| {
            let assignments = blob
                .assignments
                .iter()
                .map(|a| (a.interval.id().to_string(), a.start_col, a.col_span))
                .collect();
            (blob.total_cols, assignments)
        })
        .collect()
}

fn assert_no_overlap(tree: &LayoutTree) {
    for layer in &tree.layers {
        for column in &layer.columns {
            let chunks: Vec<_> = column.occurrence_chunks().collect();
            for pair in chunks.windows(2) {
                assert!(
                    pair[0].end <= pair[1].start,
                    "{} overlaps {}",
                    pair[0].occurrence.id,
                    pair[1].occurrence.id
                );
            }
        }
    }
}

#[test]
fn test_two_overlapping_events() {
    let events = [event("a", (9, 0), (10, 0)), event("b", (9, 30), (10, 30))];
    let result = slots(&events, &ctx());
    assert_eq!(
        result,
        [(2, vec![("a".into(), 0, 1), ("b".into(), 1, 1)])]
    );
}

#[test]
fn test_nested_events_reuse_freed_column() {
    let events = [
        event("a", (9, 0), (11, 0)),
        event("b", (9, 15), (9, 45)),
        event("c", (9, 45), (10, 15)),
    ];
    let result = slots(&events, &ctx());
    assert_eq!(
        result,
        [(
            2,
            vec![("a".into(), 0, 1), ("b".into(), 1, 1), ("c".into(), 1, 1)]
        )]
    );
}

#[test]
fn test_gap_separates_blobs() {
    let events = [event("a", (9, 0), (9, 30)), event("b", (10, 0), (10, 30))];
    let result = slots(&events, &ctx());
    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|(total, _)| *total == 1));
}

#[test]
fn test_zero_length_task_is_padded_before_allocation() {
    let ctx = ctx().with_minimum_duration(30);
    let task = Arc::new(Occurrence::task("t", "Ship", Some(at(9, 0)), Some(at(9, 0))));
    let other = event("b", (9, 20), (10, 0));
    // Padded to 09:00-09:30, the task now overlaps b.
    let result = slots(&[task.clone(), other], &ctx);
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].0, 2);

    let tree = compute_layout([&task], &ctx).unwrap();
    let chunk = tree.find(&OccurrenceId::new("t")).unwrap();
    assert_eq!(chunk.duration.num_minutes(), 30);
}

#[test]
fn test_removal_repacks_immediately() {
    let mut column = EventColumn::new(ctx(), &SchedulerConfig { debounce_ms: 5 });
    column.start_batch();
    for occ in [
        event("a", (9, 0), (10, 0)),
        event("b", (9, 15), (10, 0)),
        event("c", (9, 30), (10, 0)),
    ] {
        column.add_occurrence((*occ).clone());
    }
    column.end_batch();
    assert_eq!(column.layout().layers[0].total_cols, 3);

    assert!(column.remove_occurrence(&OccurrenceId::new("b")));
    let tree = column.layout();
    assert_eq!(tree.layers.len(), 1);
    assert_eq!(tree.layers[0].total_cols, 2);
    let ids: Vec<Vec<&str>> = tree.layers[0]
        .columns
        .iter()
        .map(|c| c.occurrence_chunks().map(|o| o.occurrence.id.as_str()).collect())
        .collect();
    assert_eq!(ids, [vec!["a"], vec!["c"]]);
}

#[test]
fn test_malformed_occurrence_is_skipped() {
    let events = [
        event("a", (9, 0), (10, 0)),
        Arc::new(Occurrence::task("broken", "No dates", None, None)),
    ];
    let tree = compute_layout(&events, &ctx()).unwrap();
    assert_eq!(tree.occurrence_chunks().count(), 1);
    assert!(tree.find(&OccurrenceId::new("broken")).is_none());
}

#[test]
fn test_busy_day_has_no_overlaps_and_full_spans() {
    let events = [
        event("a", (8, 0), (12, 0)),
        event("b", (8, 30), (9, 0)),
        event("c", (8, 45), (10, 0)),
        event("d", (9, 0), (9, 30)),
        event("e", (9, 10), (11, 0)),
        event("f", (9, 30), (9, 40)),
        event("g", (10, 0), (10, 20)),
        event("h", (13, 0), (14, 0)),
        event("i", (13, 30), (13, 45)),
    ];
    let tree = compute_layout(&events, &ctx()).unwrap();
    assert_no_overlap(&tree);
    assert_eq!(tree.occurrence_chunks().count(), events.len());
    for layer in &tree.layers {
        assert_eq!(layer.span_total(), layer.total_cols as f64);
    }
}

#[test]
fn test_chunks_start_with_gap_from_view_start() {
    let ctx = ctx().with_visible_minutes(8 * 60, 18 * 60);
    let tree = compute_layout(&[event("a", (9, 0), (10, 0))], &ctx).unwrap();
    let chunks = &tree.layers[0].columns[0].chunks;
    assert!(matches!(chunks[0], Chunk::Gap { duration } if duration.num_minutes() == 60));
    assert!(matches!(chunks[1], Chunk::Occurrence(_)));
}

#[test]
fn test_layout_is_serializable() {
    let tree = compute_layout(&[event("a", (9, 0), (10, 0))], &ctx()).unwrap();
    let json = serde_json::to_value(&tree).unwrap();
    let chunk = &json["layers"][0]["columns"][0]["chunks"][1];
    assert_eq!(chunk["kind"], "occurrence");
    assert_eq!(chunk["occurrence"]["id"], "a");
    assert_eq!(chunk["duration_secs"], 3600);
    assert_eq!(chunk["grip_bars"], "both");
}
