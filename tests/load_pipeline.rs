use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use httpmock::prelude::*;
use parquet::arrow::ArrowWriter;

use indicator_explorer::{
    decode_table, fetch_table, IndicatorExplorer, IndicatorRecord, LoadError, TableLoader,
    TerritorySelect, YearInterval,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Encode indicator rows the way the published datasets are laid out:
/// Spanish headers, one scalar column per field.
fn indicator_parquet(rows: &[(&str, i64, f64)]) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Departamento", DataType::Utf8, false),
        Field::new("Año", DataType::Int64, false),
        Field::new("Tasa", DataType::Float64, false),
    ]));
    let territory = StringArray::from(rows.iter().map(|r| r.0).collect::<Vec<_>>());
    let year = Int64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>());
    let rate = Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>());
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(territory), Arc::new(year), Arc::new(rate)],
    )
    .unwrap();

    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
    buf
}

fn row(territory: &str, year: i64, rate: f64) -> IndicatorRecord {
    IndicatorRecord {
        territory: territory.to_string(),
        year,
        rate,
    }
}

#[tokio::test]
async fn loads_filters_and_selects_end_to_end() {
    init_logging();
    let server = MockServer::start();
    let payload = indicator_parquet(&[("A", 2020, 1.2), ("B", 2021, 3.4)]);
    let mock = server.mock(|when, then| {
        when.method(GET).path("/indicators.parquet");
        then.status(200)
            .header("content-type", "application/octet-stream")
            .body(payload);
    });

    let mut loader = TableLoader::default();
    let state = loader.load(&server.url("/indicators.parquet")).await;
    mock.assert();

    assert!(!state.loading());
    assert!(state.error().is_none());
    let table = state.table().expect("table should be ready");
    assert_eq!(table.field_names, vec!["Departamento", "Año", "Tasa"]);

    let mut explorer = IndicatorExplorer::new();
    explorer.set_records(table.indicators());
    assert_eq!(explorer.territories(), ["A", "B"]);
    assert_eq!(explorer.year_interval(), YearInterval::new(2020, 2021));

    // Narrow through the multi-select control, as the consuming view would.
    let control = TerritorySelect::new(explorer.territories().to_vec());
    let selected = control.toggle(&BTreeSet::new(), "B");
    explorer.set_selection(selected);
    explorer.set_year_interval(YearInterval::new(2021, 2021));
    assert_eq!(explorer.filtered(), &[row("B", 2021, 3.4)]);

    // Clearing the selection restores the default-to-all policy.
    explorer.set_selection(control.clear_all());
    explorer.set_year_interval(YearInterval::new(2020, 2021));
    assert_eq!(explorer.filtered().len(), 2);
}

#[tokio::test]
async fn transport_failure_is_terminal_with_empty_data() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/indicators.parquet");
        then.status(503);
    });

    let mut loader = TableLoader::default();
    loader.load(&server.url("/indicators.parquet")).await;

    assert!(!loader.loading());
    assert!(loader.records().is_empty());
    match loader.error() {
        Some(LoadError::Transport { status }) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_parquet_payload_is_a_decode_error() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/indicators.parquet");
        then.status(200).body("<html>maintenance page</html>");
    });

    let mut loader = TableLoader::default();
    loader.load(&server.url("/indicators.parquet")).await;

    assert!(!loader.loading());
    assert!(matches!(loader.error(), Some(LoadError::Decode(_))));
    assert!(loader.records().is_empty());
}

#[tokio::test]
async fn empty_payload_is_success_not_failure() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/empty.parquet");
        then.status(200).body(indicator_parquet(&[]));
    });

    let mut loader = TableLoader::default();
    let state = loader.load(&server.url("/empty.parquet")).await;

    assert!(state.error().is_none());
    let table = state.table().expect("empty table is still a table");
    assert!(table.is_empty());
    assert_eq!(table.field_names.len(), 3);
}

#[tokio::test]
async fn stale_load_result_cannot_overwrite_a_fresher_one() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/v1.parquet");
        then.status(200).body(indicator_parquet(&[("Old", 2010, 1.0)]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v2.parquet");
        then.status(200).body(indicator_parquet(&[("New", 2020, 2.0)]));
    });

    let client = reqwest::Client::new();
    let mut loader = TableLoader::new(client.clone());

    // First locator goes in flight, then gets superseded before it lands.
    let stale_ticket = loader.begin();
    let stale_result = fetch_table(&client, &server.url("/v1.parquet")).await;
    let fresh_ticket = loader.begin();
    let fresh_result = fetch_table(&client, &server.url("/v2.parquet")).await;

    assert!(!loader.commit(stale_ticket, stale_result));
    assert!(loader.loading());

    assert!(loader.commit(fresh_ticket, fresh_result));
    let indicators = loader.state().table().unwrap().indicators();
    assert_eq!(indicators, vec![row("New", 2020, 2.0)]);
}

#[tokio::test]
async fn reload_replaces_previous_state_wholesale() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/good.parquet");
        then.status(200).body(indicator_parquet(&[("A", 2020, 1.2)]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/gone.parquet");
        then.status(404);
    });

    let mut loader = TableLoader::default();
    loader.load(&server.url("/good.parquet")).await;
    assert_eq!(loader.records().len(), 1);

    loader.load(&server.url("/gone.parquet")).await;
    assert!(loader.records().is_empty());
    assert!(matches!(
        loader.error(),
        Some(LoadError::Transport { .. })
    ));
}

#[tokio::test]
async fn schema_aware_load_exposes_the_decoded_schema() {
    init_logging();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/indicators.parquet");
        then.status(200)
            .body(indicator_parquet(&[("A", 2020, 1.2)]));
    });

    let mut loader = TableLoader::default();
    loader
        .load_with_schema(&server.url("/indicators.parquet"))
        .await;

    let schema = loader.schema().expect("schema should be exposed");
    assert_eq!(schema.field(0).name(), "Departamento");
    assert_eq!(schema.field(1).data_type(), &DataType::Int64);

    // A fresh attempt drops the stale schema with the stale table.
    loader.begin();
    assert!(loader.schema().is_none());
}

#[test]
fn decode_works_on_payloads_round_tripped_through_disk() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("indicators.parquet");
    std::fs::write(&path, indicator_parquet(&[("A", 2020, 1.2), ("B", 2021, 3.4)])).unwrap();

    let bytes = Bytes::from(std::fs::read(&path).unwrap());
    let table = decode_table(bytes).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.indicators(),
        vec![row("A", 2020, 1.2), row("B", 2021, 3.4)]
    );
}
