use airman_core::config::RetrievalConfig;
use airman_core::{AirmanError, ChunkId, DocumentBatch, PageChunk};
use airman_index::{load_snapshot, save_snapshot, Bm25Params, IndexBuilder};

fn batch(source: &str, texts: &[&str], dims: usize) -> DocumentBatch {
    DocumentBatch {
        source_id: source.into(),
        fingerprint: format!("{:064}", texts.len()),
        page_count: texts.len(),
        chunks: texts
            .iter()
            .enumerate()
            .map(|(i, t)| PageChunk {
                page_number: i as u32 + 1,
                sequence_index: 0,
                char_offset: 0,
                text: t.to_string(),
            })
            .collect(),
        embeddings: (0..texts.len())
            .map(|i| {
                let mut v = vec![0.0; dims];
                v[i % dims] = 1.0;
                v
            })
            .collect(),
    }
}

fn snapshot() -> airman_index::IndexSnapshot {
    let mut builder = IndexBuilder::new(4, Bm25Params::default(), "test");
    builder
        .add_document(&batch(
            "phak.pdf",
            &["Indicated airspeed is shown on the airspeed indicator.", "Density altitude."],
            4,
        ))
        .unwrap();
    builder
        .add_document(&batch("afh.pdf", &["Crosswind landing technique."], 4))
        .unwrap();
    builder.finish()
}

#[test]
fn saved_snapshot_answers_queries_identically_after_reload() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("vector_store");
    let original = snapshot();
    save_snapshot(&original, &dir).unwrap();

    let loaded = load_snapshot(&dir, 4, Bm25Params::default()).unwrap().unwrap();
    assert_eq!(loaded.chunk_count(), 3);
    assert_eq!(loaded.manifest(), original.manifest());
    assert_eq!(loaded.store().get(ChunkId(2)).unwrap().source_id, "afh.pdf");

    let cfg = RetrievalConfig::default();
    let query_vec = [1.0, 0.0, 0.0, 0.0];
    let before = original.retrieve("indicated airspeed", &query_vec, 3, &cfg).unwrap();
    let after = loaded.retrieve("indicated airspeed", &query_vec, 3, &cfg).unwrap();
    assert_eq!(before, after);
}

#[test]
fn missing_directory_means_no_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let loaded = load_snapshot(&tmp.path().join("nothing"), 4, Bm25Params::default()).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn resave_replaces_previous_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("vector_store");
    save_snapshot(&snapshot(), &dir).unwrap();

    let mut builder = IndexBuilder::new(4, Bm25Params::default(), "test");
    builder.add_document(&batch("only.pdf", &["Weight and balance."], 4)).unwrap();
    save_snapshot(&builder.finish(), &dir).unwrap();

    let loaded = load_snapshot(&dir, 4, Bm25Params::default()).unwrap().unwrap();
    assert_eq!(loaded.chunk_count(), 1);
    assert_eq!(loaded.manifest().documents[0].source_id, "only.pdf");

    let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("vector_store")]);
}

#[test]
fn loading_with_other_dimensions_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("vector_store");
    save_snapshot(&snapshot(), &dir).unwrap();

    let err = load_snapshot(&dir, 384, Bm25Params::default()).unwrap_err();
    assert!(matches!(err, AirmanError::DimensionMismatch { expected: 384, actual: 4 }));
}

#[test]
fn corrupt_chunk_file_is_serialization_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("vector_store");
    save_snapshot(&snapshot(), &dir).unwrap();
    std::fs::write(dir.join("chunks.bin"), b"garbage").unwrap();

    assert!(load_snapshot(&dir, 4, Bm25Params::default()).is_err());
}
