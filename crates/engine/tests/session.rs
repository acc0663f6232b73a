// End-to-end tests driving ChartSession through whole update cycles.

use binchart_config::{ChartConfig, ChartKind, ConfigPatch, TextPaletteChoice};
use binchart_core::{Cell, Column, ColumnRole, Key};
use binchart_engine::*;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn row(i: usize, cells: Vec<Cell>) -> Row {
    Row {
        cells,
        cross_filter_ref: CrossFilterRef::new(format!("row-{i}")),
    }
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// city | age | region | sales
fn people() -> Dataset {
    let data = [
        ("Oslo", 12.0, "north", Some(5.0)),
        ("Rome", 15.0, "south", Some(3.0)),
        ("Oslo", 22.0, "north", None),
        ("Rome", 31.0, "south", Some(7.0)),
        ("Oslo", 40.0, "south", Some(2.0)),
        ("Rome", 41.0, "north", Some(4.0)),
        ("Oslo", 60.0, "north", Some(9.0)),
    ];
    Dataset {
        columns: vec![
            Column::new("city", ColumnRole::Category, 0),
            Column::new("age", ColumnRole::Category, 1),
            Column::new("region", ColumnRole::Category, 2),
            Column::new("sales", ColumnRole::Measure, 3),
        ],
        rows: data
            .iter()
            .enumerate()
            .map(|(i, (city, age, region, sales))| {
                row(
                    i,
                    vec![
                        text(city),
                        Cell::Number(*age),
                        text(region),
                        sales.map_or(Cell::Null, Cell::Number),
                    ],
                )
            })
            .collect(),
    }
}

fn age_chart() -> ChartConfig {
    ChartConfig {
        group_column: 0,
        target_column: 3,
        bin_column: Some(1),
        number_of_bins: 3,
        ..ChartConfig::default()
    }
}

/// Same data, columns reversed: sales | region | age | city
fn reversed(mut dataset: Dataset) -> Dataset {
    dataset.columns.reverse();
    for (i, c) in dataset.columns.iter_mut().enumerate() {
        c.ordinal = i;
    }
    for r in &mut dataset.rows {
        r.cells.reverse();
    }
    dataset
}

fn labels(view: &ViewModel) -> Vec<&str> {
    view.bins.iter().map(|b| b.label.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Binning and aggregation through the session
// ---------------------------------------------------------------------------

#[test]
fn age_bins_of_three() {
    let mut session = ChartSession::new(age_chart());
    let view = session.update(people(), UpdateOrigin::User);

    assert!(view.validation.is_ok());
    assert_eq!(labels(&view), vec!["(12 - 22)", "(31 - 41)", "(60)"]);
    let sizes: Vec<usize> = view.bins.iter().map(|b| b.fact_count).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(view.per_bin_stats.len(), 3);
}

#[test]
fn null_measure_counts_as_zero() {
    let mut session = ChartSession::new(age_chart());
    let view = session.update(people(), UpdateOrigin::User);

    // first bin: Oslo 12 (5), Rome 15 (3), Oslo 22 (null)
    let oslo = &view.bins[0].leaves[0];
    assert_eq!(oslo.leaf.group_key, Key::text("Oslo"));
    assert_eq!(oslo.leaf.sum, 5.0);
    assert_eq!(oslo.leaf.fact_count, 2);
    assert_eq!(view.per_bin_stats[0].max, 5.0);
    assert_eq!(view.per_bin_stats[0].min, 3.0);
    assert_eq!(view.per_bin_stats[0].average, 4.0);
}

#[test]
fn unbinned_chart_has_one_bin() {
    let mut session = ChartSession::new(ChartConfig {
        bin_column: None,
        ..age_chart()
    });
    let view = session.update(people(), UpdateOrigin::User);
    assert_eq!(view.bins.len(), 1);
    assert_eq!(view.bins[0].fact_count, 7);
    assert_eq!(view.bins[0].leaves.len(), 2);
}

#[test]
fn color_by_splits_leaves_and_totals_groups() {
    let mut session = ChartSession::new(ChartConfig {
        bin_column: None,
        color_by_column: Some(2),
        ..age_chart()
    });
    let view = session.update(people(), UpdateOrigin::User);
    let bin = &view.bins[0];

    // Oslo: north, south; Rome: south, north
    assert_eq!(bin.leaves.len(), 4);
    assert_eq!(bin.groups.len(), 2);
    assert_eq!(bin.groups[0].total, 16.0);
    assert_eq!(bin.groups[1].total, 14.0);
    assert_eq!(view.color_assignments.len(), 2);
    assert_eq!(view.color_assignments[0].key, Key::text("north"));

    // stats over group totals, not leaves
    assert_eq!(view.per_bin_stats[0].max, 16.0);
    assert_eq!(view.per_bin_stats[0].min, 14.0);
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[test]
fn row_limit_rejects_cycle() {
    let columns = vec![
        Column::new("k", ColumnRole::Category, 0),
        Column::new("v", ColumnRole::Measure, 1),
    ];
    let rows = (0..20_001)
        .map(|i| row(i, vec![text("a"), Cell::Number(1.0)]))
        .collect();
    let mut session = ChartSession::new(ChartConfig {
        target_column: 1,
        ..ChartConfig::default()
    });
    let view = session.update(Dataset { columns, rows }, UpdateOrigin::User);

    assert_eq!(
        view.validation,
        Validation::RowLimitExceeded {
            rows: 20_001,
            limit: 20_000
        }
    );
    assert!(view.bins.is_empty());
    assert!(view.message.is_some());
    assert!(session.leaf_refs().is_empty());
}

#[test]
fn bin_cardinality_rejects_cycle() {
    let columns = vec![
        Column::new("k", ColumnRole::Category, 0),
        Column::new("v", ColumnRole::Measure, 1),
    ];
    let rows = (0..1_201)
        .map(|i| row(i, vec![Cell::Number(i as f64), Cell::Number(1.0)]))
        .collect();
    let mut session = ChartSession::new(ChartConfig {
        target_column: 1,
        bin_column: Some(0),
        ..ChartConfig::default()
    });
    let view = session.update(Dataset { columns, rows }, UpdateOrigin::User);

    assert!(matches!(
        view.validation,
        Validation::BinCardinalityExceeded { limit: 1_200, .. }
    ));
    assert!(view.bins.is_empty());

    // Dropping the bin column recovers on the next cycle.
    session.apply_configuration(&ConfigPatch {
        bin_column: Some(None),
        ..ConfigPatch::default()
    });
    let view = session.render();
    assert!(view.validation.is_ok());
    assert_eq!(view.bins.len(), 1);
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[test]
fn undo_restores_every_configuration_field() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);
    let before = session.config().snapshot();

    session.apply_configuration(&ConfigPatch {
        chart_kind: Some(ChartKind::Brick),
        group_column: Some(2),
        bin_column: Some(None),
        color_by_column: Some(Some(0)),
        number_of_bins: Some(7),
        ..ConfigPatch::default()
    });
    assert_ne!(session.config().snapshot(), before);

    assert_eq!(session.undo(), UndoOutcome::Configuration(before));
    assert_eq!(session.config().snapshot(), before);
    assert!(!session.can_undo());
}

#[test]
fn undo_interleaves_configuration_and_selection() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);
    let original = session.config().snapshot();

    session.apply_configuration(&ConfigPatch {
        chart_kind: Some(ChartKind::Column),
        ..ConfigPatch::default()
    });
    let after_first = session.config().snapshot();
    session.render();
    assert!(session.select_leaf(0, false));
    session.apply_configuration(&ConfigPatch {
        number_of_bins: Some(2),
        ..ConfigPatch::default()
    });

    assert_eq!(session.undo(), UndoOutcome::Configuration(after_first));
    assert!(matches!(session.undo(), UndoOutcome::Selection(s) if s.is_empty()));
    assert!(session.isolation().is_empty());
    assert_eq!(session.undo(), UndoOutcome::Configuration(original));
    assert_eq!(session.undo(), UndoOutcome::Underflow);
}

#[test]
fn display_only_edits_do_not_shadow_undo() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);
    let original = session.config().snapshot();

    session.apply_configuration(&ConfigPatch {
        chart_kind: Some(ChartKind::Column),
        ..ConfigPatch::default()
    });
    assert!(session.apply_configuration(&ConfigPatch {
        text_palette: Some(TextPaletteChoice::Light),
        selected_table_columns: Some(vec![0, 3]),
        ..ConfigPatch::default()
    }));
    assert_eq!(session.history().len(), 1);

    // the single undo reverses the chart kind edit, not the text palette
    assert_eq!(session.undo(), UndoOutcome::Configuration(original));
    assert_eq!(session.config().chart_kind, ChartKind::Bar);
    assert_eq!(session.config().text_palette, TextPaletteChoice::Light);
    assert_eq!(session.undo(), UndoOutcome::Underflow);
}

#[test]
fn long_sessions_undo_back_to_the_start() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);

    for i in 0..150 {
        assert!(session.apply_configuration(&ConfigPatch {
            group_column: Some(1 + i % 3),
            ..ConfigPatch::default()
        }));
    }
    let mut undone = 0;
    while session.undo().applied() {
        undone += 1;
    }
    assert_eq!(undone, 150);
    assert_eq!(session.config().group_column, 0);
}

#[test]
fn undo_after_reorder_follows_column_names() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);

    session.apply_configuration(&ConfigPatch {
        bin_column: Some(None),
        ..ConfigPatch::default()
    });
    session.update(reversed(people()), UpdateOrigin::Host);
    assert_eq!(session.config().group_column, 3);

    assert!(session.undo().applied());
    let view = session.render();
    assert_eq!(session.config().bin_column, Some(2));
    assert_eq!(view.axes.bin.as_deref(), Some("age"));
    assert_eq!(labels(&view), vec!["(12 - 22)", "(31 - 41)", "(60)"]);
    assert_eq!(view.axes.group.as_deref(), Some("city"));
}

#[test]
fn host_updates_never_touch_history() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::Host);
    session.update(people(), UpdateOrigin::Host);
    session.apply_host_configuration(&ConfigPatch {
        palette: Some(binchart_config::PaletteChoice::Bold),
        ..ConfigPatch::default()
    });
    assert!(!session.can_undo());

    // user actions after a host update are still recorded
    session.apply_configuration(&ConfigPatch {
        chart_kind: Some(ChartKind::Table),
        ..ConfigPatch::default()
    });
    assert!(session.can_undo());
}

// ---------------------------------------------------------------------------
// Isolation
// ---------------------------------------------------------------------------

#[test]
fn drill_into_one_leaf() {
    let mut session = ChartSession::new(age_chart());
    let view = session.update(people(), UpdateOrigin::User);

    // leaf 1 is Rome in (12 - 22)
    let rome = view.leaf(1).cloned().unwrap();
    assert_eq!(rome.group_key, Key::text("Rome"));
    session.toggle_select(&rome, false);

    let view = session.render();
    assert!(view.isolation.active);
    assert_eq!(view.isolation.isolated_group_keys, vec![Key::text("Rome")]);
    assert_eq!(labels(&view), vec!["(15)"]);
    assert_eq!(view.bins[0].leaves.len(), 1);
    assert_eq!(view.bins[0].leaves[0].leaf.sum, 3.0);
    assert!(view.bins[0].leaves[0].selected);
}

#[test]
fn multi_select_unions_groups_and_bins() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);

    // leaf 0: Oslo in (12 - 22); leaf 2: Rome in (31 - 41)
    assert!(session.select_leaf(0, true));
    assert!(session.select_leaf(2, true));
    let view = session.render();

    // Oslo or Rome, in either bin: ages 12, 15, 22, 31, 40, 41
    let total: usize = view.bins.iter().map(|b| b.fact_count).sum();
    assert_eq!(total, 6);
}

#[test]
fn toggle_twice_restores_full_view() {
    let mut session = ChartSession::new(age_chart());
    let full = session.update(people(), UpdateOrigin::User);
    let leaf = full.leaf(0).cloned().unwrap();

    session.toggle_select(&leaf, false);
    session.render();
    session.toggle_select(&leaf, false);
    let view = session.render();

    assert!(session.isolation().is_empty());
    assert_eq!(labels(&view), labels(&full));
}

#[test]
fn isolation_survives_configuration_change() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);
    assert!(session.select_leaf(0, false));

    session.apply_configuration(&ConfigPatch {
        chart_kind: Some(ChartKind::Table),
        ..ConfigPatch::default()
    });
    let view = session.render();
    assert!(view.isolation.active);
    assert!(session.clear_selection());
    assert!(!session.render().isolation.active);
}

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

#[test]
fn reordered_columns_keep_roles() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);

    let view = session.update(reversed(people()), UpdateOrigin::Host);
    assert_eq!(session.config().group_column, 3);
    assert_eq!(session.config().target_column, 0);
    assert_eq!(session.config().bin_column, Some(2));
    assert_eq!(labels(&view), vec!["(12 - 22)", "(31 - 41)", "(60)"]);
    assert_eq!(view.axes.bin.as_deref(), Some("age"));
    assert!(!session.can_undo());
}

#[test]
fn removed_column_falls_back_to_first() {
    let mut session = ChartSession::new(age_chart());
    session.update(people(), UpdateOrigin::User);

    let mut fewer = people();
    fewer.columns.remove(1);
    for (i, c) in fewer.columns.iter_mut().enumerate() {
        c.ordinal = i;
    }
    for r in &mut fewer.rows {
        r.cells.remove(1);
    }

    session.update(fewer, UpdateOrigin::User);
    assert_eq!(session.config().bin_column, Some(0));
    assert_eq!(session.config().target_column, 2);
}
