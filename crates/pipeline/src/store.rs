use decoder::Detection;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

pub type RecordId = u64;

/// The persisted subset of a detection: label and confidence only, box
/// geometry stays with the rendering side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    pub confidence: f32,
}

impl From<&Detection> for DetectedObject {
    fn from(det: &Detection) -> Self {
        Self {
            label: det.label.clone(),
            confidence: det.confidence,
        }
    }
}

#[derive(Serialize)]
struct DetectionRecord<'a> {
    record_id: RecordId,
    model: &'a str,
    timestamp_ns: u64,
    items: &'a [DetectedObject],
}

/// Where detection history goes. Saves are fire-and-forget from the
/// session's point of view: errors are logged upstream and never block
/// the frame loop.
pub trait DetectionStore {
    fn save(&mut self, model_id: &str, items: &[DetectedObject]) -> anyhow::Result<RecordId>;
}

/// Append-only JSON-lines store, one record per save.
pub struct JsonlStore {
    writer: BufWriter<File>,
    sequence: RecordId,
}

impl JsonlStore {
    pub fn create(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            sequence: 0,
        })
    }

    pub fn sequence(&self) -> RecordId {
        self.sequence
    }
}

impl DetectionStore for JsonlStore {
    fn save(&mut self, model_id: &str, items: &[DetectedObject]) -> anyhow::Result<RecordId> {
        self.sequence += 1;
        let record = DetectionRecord {
            record_id: self.sequence,
            model: model_id,
            timestamp_ns: timestamp_ns()?,
            items,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(self.sequence)
    }
}

/// In-memory store for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sequence: RecordId,
    pub records: Vec<(String, Vec<DetectedObject>)>,
}

impl DetectionStore for MemoryStore {
    fn save(&mut self, model_id: &str, items: &[DetectedObject]) -> anyhow::Result<RecordId> {
        self.sequence += 1;
        self.records.push((model_id.to_string(), items.to_vec()));
        Ok(self.sequence)
    }
}

fn timestamp_ns() -> anyhow::Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos() as u64)
}
