//! One-pass batch pipeline: NDJSON records in, embedded documents out.
//!
//! Records stream through a `RecordReader`, get their `v_title`/`v_plot`
//! vectors attached, and accumulate into batches of `settings.batch_size`
//! before going to the `BulkWriter`. The tail batch ships too; exhausting
//! the input must never drop records. Batches already written stay written
//! on failure; idempotent document ids make a rerun safe.

use std::io::BufRead;

use indicatif::{ProgressBar, ProgressStyle};

use cinedex_core::config::LoadSettings;
use cinedex_core::error::Result;
use cinedex_core::ndjson::RecordReader;
use cinedex_core::traits::{BulkWriter, Embedder};
use cinedex_core::types::{LoadStats, MovieDoc};

pub struct BatchLoader<'a> {
    embedder: &'a dyn Embedder,
    writer: &'a dyn BulkWriter,
    settings: &'a LoadSettings,
}

impl<'a> BatchLoader<'a> {
    pub fn new(
        embedder: &'a dyn Embedder,
        writer: &'a dyn BulkWriter,
        settings: &'a LoadSettings,
    ) -> Self {
        Self { embedder, writer, settings }
    }

    /// Drive the whole load. The first non-retryable error aborts the run.
    pub fn load_all<R: BufRead>(&self, source: R) -> Result<LoadStats> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} records {msg}")
                .unwrap()
        );

        let mut reader = RecordReader::new(source);
        let mut stats = LoadStats::default();
        let mut batch: Vec<MovieDoc> = Vec::with_capacity(self.settings.batch_size);
        while let Some(item) = reader.next() {
            let doc = self.enrich(item?)?;
            batch.push(doc);
            stats.records += 1;
            pb.inc(1);
            if batch.len() >= self.settings.batch_size {
                self.flush(&mut batch, &mut stats, &pb)?;
            }
        }
        if !batch.is_empty() {
            self.flush(&mut batch, &mut stats, &pb)?;
        }
        stats.headers_skipped = reader.headers_skipped();
        pb.finish_with_message(format!(
            "✅ indexed {} documents in {} batches",
            stats.indexed, stats.batches
        ));
        Ok(stats)
    }

    fn enrich(&self, mut doc: MovieDoc) -> Result<MovieDoc> {
        doc.v_title = Some(self.embedder.embed(&doc.title)?);
        doc.v_plot = match &doc.plot {
            Some(plot) => Some(self.embedder.embed(plot)?),
            None => None,
        };
        Ok(doc)
    }

    fn flush(
        &self,
        batch: &mut Vec<MovieDoc>,
        stats: &mut LoadStats,
        pb: &ProgressBar,
    ) -> Result<()> {
        stats.indexed += self.writer.bulk_write(&self.settings.index, batch)?;
        stats.batches += 1;
        pb.set_message(format!("flushed batch {} ({} docs)", stats.batches, batch.len()));
        batch.clear();
        Ok(())
    }
}
