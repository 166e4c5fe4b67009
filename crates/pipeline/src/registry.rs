use decoder::{DecodeError, ModelFamily, ModelResolution};

// Identifiers map to row layouts by name convention: the v7-tiny exports
// emit flat [N, 7] rows, the v10 export emits a [1, N, 6] batch.
const FLAT_BATCH_PREFIX: &str = "yolov7";
const BATCHED_TRIPLET_PREFIX: &str = "yolov10";

/// Resolve a model identifier to its output layout. Path components are
/// ignored; only the file name participates in the convention.
pub fn family_for_identifier(identifier: &str) -> Result<ModelFamily, DecodeError> {
    let file_name = identifier.rsplit('/').next().unwrap_or(identifier);
    if file_name.starts_with(BATCHED_TRIPLET_PREFIX) {
        Ok(ModelFamily::BatchedTriplet)
    } else if file_name.starts_with(FLAT_BATCH_PREFIX) {
        Ok(ModelFamily::FlatBatch)
    } else {
        Err(DecodeError::UnsupportedModel {
            identifier: identifier.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub identifier: String,
    pub resolution: ModelResolution,
    pub family: ModelFamily,
}

/// Ordered set of models the session can cycle through.
///
/// Families are resolved here, once, so the per-frame path never inspects
/// identifier strings.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    active: usize,
}

impl ModelRegistry {
    pub fn new<I, S>(models: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (ModelResolution, S)>,
        S: Into<String>,
    {
        let mut entries = Vec::new();
        for (resolution, identifier) in models {
            let identifier = identifier.into();
            let family = family_for_identifier(&identifier)?;
            entries.push(ModelEntry {
                identifier,
                resolution,
                family,
            });
        }
        if entries.is_empty() {
            anyhow::bail!("model registry needs at least one model");
        }
        Ok(Self { entries, active: 0 })
    }

    /// The model set the demo ships with.
    pub fn default_set() -> anyhow::Result<Self> {
        Self::new([
            (ModelResolution::new(640, 640), "yolov10n.onnx"),
            (ModelResolution::new(256, 256), "yolov7-tiny_256x256.onnx"),
            (ModelResolution::new(320, 320), "yolov7-tiny_320x320.onnx"),
            (ModelResolution::new(640, 640), "yolov7-tiny_640x640.onnx"),
        ])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> &ModelEntry {
        &self.entries[self.active]
    }

    /// Switch to the model at `index`. Returns false (and keeps the current
    /// selection) when the index is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Cycle to the next model, wrapping at the end of the list.
    pub fn advance(&mut self) -> &ModelEntry {
        self.active = (self.active + 1) % self.entries.len();
        self.active()
    }
}
