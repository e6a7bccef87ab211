//! Step callback that records the run for external charts and renderers.
//!
//! After each step the sink logs the counters and, when a snapshot path is
//! configured, appends the [`StepSnapshot`] as one JSON line. At the end of
//! the run the per-parcel views can be dumped as a single JSON document.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use enclave_core::{SchellingModel, StepCallback};
use enclave_types::{ParcelView, StepSnapshot};
use tracing::{info, warn};

use crate::error::EngineError;

/// Callback that bridges the step loop to the JSON-lines sink.
pub struct SnapshotSink {
    writer: Option<BufWriter<File>>,
    written: u64,
}

impl SnapshotSink {
    /// Open the sink. `None` logs steps without writing a file.
    ///
    /// The initial state is written as the first line so charts start at
    /// step 0.
    pub fn create(path: Option<&Path>, initial: &StepSnapshot) -> Result<Self, EngineError> {
        let writer = match path {
            Some(path) => {
                ensure_parent(path)?;
                info!(path = %path.display(), "Writing step snapshots");
                Some(BufWriter::new(File::create(path)?))
            }
            None => None,
        };
        let mut sink = Self { writer, written: 0 };
        sink.write_line(initial)?;
        Ok(sink)
    }

    /// Flush buffered lines to disk and return how many were written.
    pub fn finish(mut self) -> Result<u64, EngineError> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(self.written)
    }

    fn write_line(&mut self, snapshot: &StepSnapshot) -> Result<(), EngineError> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        serde_json::to_writer(&mut *writer, snapshot)?;
        writer.write_all(b"\n")?;
        self.written = self.written.saturating_add(1);
        Ok(())
    }
}

impl StepCallback for SnapshotSink {
    fn on_step(&mut self, snapshot: &StepSnapshot, model: &SchellingModel) {
        info!(
            step = snapshot.step,
            happy = snapshot.happy,
            agents = snapshot.active_agents,
            vacant = model.occupancy().vacant_count(),
            running = snapshot.running,
            "Step"
        );
        // A failed write disables the file sink; the run itself goes on.
        if let Err(err) = self.write_line(snapshot) {
            warn!(error = %err, "Snapshot sink write failed, disabling file output");
            self.writer = None;
        }
    }
}

/// Write the final per-parcel views as one JSON array.
pub fn write_final_state(path: &Path, views: &[ParcelView]) -> Result<(), EngineError> {
    ensure_parent(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, views)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    info!(path = %path.display(), parcels = views.len(), "Final parcel state written");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
