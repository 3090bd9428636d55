use std::io::Cursor;
use std::sync::Mutex;

use cinedex_core::config::LoadSettings;
use cinedex_core::error::{Error, Result};
use cinedex_core::traits::{BulkWriter, Embedder};
use cinedex_core::types::MovieDoc;
use cinedex_embed::FakeEmbedder;
use cinedex_loader::BatchLoader;

/// Records every batch it is handed, like the real client but in memory.
#[derive(Default)]
struct RecordingWriter {
    batches: Mutex<Vec<Vec<MovieDoc>>>,
}

impl RecordingWriter {
    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().expect("lock").iter().map(Vec::len).collect()
    }
}

impl BulkWriter for RecordingWriter {
    fn bulk_write(&self, _index: &str, docs: &[MovieDoc]) -> Result<usize> {
        self.batches.lock().expect("lock").push(docs.to_vec());
        Ok(docs.len())
    }
}

/// Wraps the fake embedder and remembers every text it was asked to embed.
struct RecordingEmbedder {
    inner: FakeEmbedder,
    inputs: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    fn new(dim: usize) -> Self {
        Self { inner: FakeEmbedder::new(dim), inputs: Mutex::new(Vec::new()) }
    }
}

impl Embedder for RecordingEmbedder {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inputs.lock().expect("lock").push(text.to_string());
        self.inner.embed(text)
    }
}

fn test_settings(dim: usize) -> LoadSettings {
    let mut settings = LoadSettings::default_local();
    settings.dim = dim;
    settings
}

fn movies_ndjson(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        out.push_str("{\"index\": {\"_index\": \"movies\"}}\n");
        out.push_str(&format!("{{\"title\": \"Movie {i}\", \"year\": {}}}\n", 1990 + i));
    }
    out
}

#[test]
fn twenty_three_records_flush_as_11_11_1() {
    let embedder = FakeEmbedder::new(8);
    let writer = RecordingWriter::default();
    let settings = test_settings(8);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let stats = loader.load_all(Cursor::new(movies_ndjson(23))).expect("load");

    assert_eq!(writer.batch_sizes(), vec![11, 11, 1], "tail batch is flushed");
    assert_eq!(stats.records, 23);
    assert_eq!(stats.indexed, 23);
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.headers_skipped, 23);
}

#[test]
fn exact_multiple_of_threshold_leaves_no_tail() {
    let embedder = FakeEmbedder::new(8);
    let writer = RecordingWriter::default();
    let settings = test_settings(8);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let stats = loader.load_all(Cursor::new(movies_ndjson(22))).expect("load");

    assert_eq!(writer.batch_sizes(), vec![11, 11]);
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.indexed, 22);
}

#[test]
fn headers_never_reach_the_embedder() {
    let embedder = RecordingEmbedder::new(8);
    let writer = RecordingWriter::default();
    let settings = test_settings(8);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let input = concat!(
        "{\"index\": {\"_index\": \"movies\"}}\n",
        "{\"title\": \"Don Jon\", \"plot\": \"A New Jersey guy...\"}\n",
        "{\"index\": {\"_index\": \"movies\"}}\n",
        "{\"title\": \"Up\"}\n",
    );
    loader.load_all(Cursor::new(input)).expect("load");

    let inputs = embedder.inputs.lock().expect("lock").clone();
    assert_eq!(inputs, vec!["Don Jon", "A New Jersey guy...", "Up"]);
}

#[test]
fn plotless_records_get_only_a_title_vector() {
    let embedder = FakeEmbedder::new(16);
    let writer = RecordingWriter::default();
    let settings = test_settings(16);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let input = "{\"title\": \"Up\"}\n{\"title\": \"Don Jon\", \"plot\": \"A New Jersey guy...\"}\n";
    loader.load_all(Cursor::new(input)).expect("load");

    let batches = writer.batches.lock().expect("lock");
    let docs = &batches[0];
    assert_eq!(docs[0].v_title.as_ref().map(Vec::len), Some(16));
    assert!(docs[0].v_plot.is_none());
    assert_eq!(docs[1].v_title.as_ref().map(Vec::len), Some(16));
    assert_eq!(docs[1].v_plot.as_ref().map(Vec::len), Some(16));
}

#[test]
fn source_fields_pass_through_unchanged() {
    let embedder = FakeEmbedder::new(8);
    let writer = RecordingWriter::default();
    let settings = test_settings(8);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let input = "{\"title\": \"Don Jon\", \"plot\": \"A New Jersey guy...\", \"rating\": 6.5, \"genres\": [\"Comedy\"]}\n";
    loader.load_all(Cursor::new(input)).expect("load");

    let batches = writer.batches.lock().expect("lock");
    let doc = &batches[0][0];
    assert_eq!(doc.title, "Don Jon");
    assert_eq!(doc.plot.as_deref(), Some("A New Jersey guy..."));
    assert_eq!(doc.extra.get("rating"), Some(&serde_json::json!(6.5)));
    assert_eq!(doc.extra.get("genres"), Some(&serde_json::json!(["Comedy"])));
}

#[test]
fn malformed_line_aborts_the_run() {
    let embedder = FakeEmbedder::new(8);
    let writer = RecordingWriter::default();
    let settings = test_settings(8);
    let loader = BatchLoader::new(&embedder, &writer, &settings);

    let input = "{\"title\": \"Up\"}\n{broken\n";
    let err = loader.load_all(Cursor::new(input)).expect_err("abort");
    assert!(matches!(err, Error::Parse { line: 2, .. }));
}
