use tidy_table::expr::{col, lit};
use tidy_table::ingestion::load_mammals;
use tidy_table::processing::{Aggregation, ColumnSelector, ReduceOp, SortKey};
use tidy_table::types::{DataSet, Value};

fn mammals() -> DataSet {
    load_mammals("tests/fixtures/mammals.tsv").unwrap()
}

fn strings(ds: &DataSet, column: &str) -> Vec<String> {
    ds.column_values(column)
        .unwrap()
        .into_iter()
        .map(|v| match v {
            Value::Utf8(s) => s.clone(),
            other => panic!("expected text, got {other:?}"),
        })
        .collect()
}

#[test]
fn select_preserves_row_count_and_order() {
    let ds = mammals();
    let selections: Vec<Vec<ColumnSelector>> = vec![
        vec!["binomial".into(), "adult_body_mass".into()],
        vec![ColumnSelector::range("adult_body_mass", "litter_size")],
        vec![ColumnSelector::StartsWith("adult_".to_string())],
        vec![ColumnSelector::Glob("*_s*".to_string())],
        vec![ColumnSelector::exclude("order".into())],
        vec![ColumnSelector::Regex("^nothing$".to_string())],
    ];

    for selection in &selections {
        let out = ds.select(selection).unwrap();
        assert_eq!(out.row_count(), ds.row_count(), "{selection:?}");
        for (i, name) in out.schema.field_names().enumerate() {
            assert_eq!(
                out.column_values(name).unwrap(),
                ds.column_values(name).unwrap(),
                "column {i} of {selection:?}"
            );
        }
    }
}

#[test]
fn filter_never_adds_rows_or_changes_columns() {
    let ds = mammals();
    let predicates = vec![
        col("order").eq(lit("Carnivora")),
        col("adult_body_mass").gt(100000.0),
        col("home_range").is_null(),
        col("adult_body_mass").lt(0.0),
        col("litter_size").gt_eq(1.0).or(col("home_range").gt(1.0)),
    ];

    for predicate in &predicates {
        let out = ds.filter(predicate).unwrap();
        assert!(out.row_count() <= ds.row_count(), "{predicate}");
        assert_eq!(out.schema, ds.schema, "{predicate}");
    }

    let heavy = ds.filter(&col("adult_body_mass").gt(100000.0)).unwrap();
    assert_eq!(
        strings(&heavy, "binomial"),
        vec!["Ursus arctos", "Cervus elaphus", "Panthera leo", "Balaenoptera musculus"]
    );
}

#[test]
fn filter_drops_rows_where_the_predicate_is_missing() {
    let ds = mammals();
    let ranged = ds.filter(&col("home_range").gt(1.0)).unwrap();
    assert_eq!(
        strings(&ranged, "binomial"),
        vec!["Vulpes vulpes", "Ursus arctos", "Cervus elaphus", "Panthera leo"]
    );
}

#[test]
fn arrange_is_stable_idempotent_and_puts_missing_last() {
    let ds = mammals();

    let by_range = ds.arrange(&[SortKey::desc("home_range")]).unwrap();
    assert_eq!(
        strings(&by_range, "binomial"),
        vec![
            "Ursus arctos",
            "Panthera leo",
            "Cervus elaphus",
            "Vulpes vulpes",
            "Sciurus vulgaris",
            "Sorex araneus",
            // missing home ranges, in input order
            "Mus musculus",
            "Homo sapiens",
            "Myotis lucifugus",
            "Hydrochoerus hydrochaeris",
            "Macaca mulatta",
            "Balaenoptera musculus",
        ]
    );
    assert_eq!(by_range.arrange(&[SortKey::desc("home_range")]).unwrap(), by_range);

    // Stable: within an order, rows keep their input order.
    let by_order = ds.arrange(&[SortKey::asc("order")]).unwrap();
    let rodents: Vec<String> = strings(&by_order, "binomial")
        .into_iter()
        .zip(strings(&by_order, "order"))
        .filter(|(_, o)| o == "Rodentia")
        .map(|(b, _)| b)
        .collect();
    assert_eq!(rodents, vec!["Mus musculus", "Sciurus vulgaris", "Hydrochoerus hydrochaeris"]);
}

#[test]
fn mutate_evaluates_in_declaration_order() {
    let ds = mammals();
    let out = ds
        .mutate(&[
            (col("adult_body_mass") / lit(1000.0)).alias("mass_kg"),
            col("mass_kg").log10().alias("log_mass_kg"),
        ])
        .unwrap();

    assert_eq!(out.column_count(), ds.column_count() + 2);
    let log_mass = out.column_values("log_mass_kg").unwrap();
    match log_mass[6] {
        Value::Float64(x) => assert!((x - (240867.0_f64 / 1000.0).log10()).abs() < 1e-12),
        other => panic!("expected a float, got {other:?}"),
    }

    // A later column cannot be referenced by an earlier one.
    let err = ds
        .mutate(&[
            col("b").alias("a"),
            lit(1.0).alias("b"),
        ])
        .unwrap_err();
    assert!(matches!(err, tidy_table::ProcessingError::ColumnNotFound { .. }));
}

#[test]
fn grouped_summary_has_one_row_per_order() {
    let ds = mammals();
    let out = ds
        .group_by(&["order"])
        .unwrap()
        .summarise(&[Aggregation::count(), Aggregation::mean("adult_body_mass").alias("mean_mass")])
        .unwrap();

    assert_eq!(
        strings(&out, "order"),
        vec![
            "Artiodactyla",
            "Carnivora",
            "Cetacea",
            "Chiroptera",
            "Primates",
            "Rodentia",
            "Soricomorpha",
        ]
    );
    assert_eq!(out.rows[1][1], Value::Int64(3));
    assert_eq!(out.rows[4][2], Value::Float64(34400.0));
}

#[test]
fn excluding_missing_changes_only_groups_with_missing_values() {
    let ds = mammals();
    let grouped = ds.group_by(&["order"]).unwrap();
    let kept = grouped.summarise(&[Aggregation::mean("home_range").alias("m")]).unwrap();
    let dropped = grouped
        .summarise(&[Aggregation::mean("home_range").alias("m").exclude_missing()])
        .unwrap();

    let counts = grouped
        .summarise(&[
            Aggregation::new(ReduceOp::Count, "home_range").alias("rows"),
            Aggregation::new(ReduceOp::Count, "home_range").alias("present").exclude_missing(),
        ])
        .unwrap();

    for (g, row) in counts.rows.iter().enumerate() {
        if row[1] == row[2] {
            assert_eq!(kept.rows[g], dropped.rows[g], "group {g}");
        }
    }

    // Rodentia: two of three ranges missing.
    assert_eq!(kept.rows[5][1], Value::Null);
    assert_eq!(dropped.rows[5][1], Value::Float64(0.03));
    // Primates: every range missing, so there is nothing to average either way.
    assert_eq!(dropped.rows[4][1], Value::Null);
}

#[test]
fn ragged_rows_surface_as_row_width_errors() {
    let mut ds = mammals();
    ds.rows[3].pop();
    let err = ds.arrange(&[SortKey::asc("adult_body_mass")]).unwrap_err();
    assert!(matches!(
        err,
        tidy_table::ProcessingError::RowWidth { row: 3, expected: 6, found: 5 }
    ));
    assert!(ds.group_by(&["order"]).unwrap().summarise(&[Aggregation::count()]).is_err());
}
