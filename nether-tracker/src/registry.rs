//! Format recognition and dispatch
//!
//! Each decoder implements [`FormatLoader`]. The [`FormatRegistry`] asks every
//! registered loader to score the input and hands it to the best one.

use tracing::debug;

use crate::TrackerModule;

/// Loading error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// No registered decoder recognized the data
    #[error("unrecognized module format")]
    UnrecognizedFormat,

    /// A field holds a structurally impossible value
    #[error("invalid module data: {0}")]
    InvalidData(String),

    /// Too few bytes for the fixed-size header
    #[error("file is truncated")]
    TruncatedFile,
}

/// A decoder for one module format
pub trait FormatLoader: Send + Sync {
    /// Short format name for diagnostics
    fn name(&self) -> &'static str;

    /// Confidence that `data` is in this format (0 = not recognized)
    fn identify(&self, data: &[u8]) -> u32;

    /// Decode `data` into a module
    fn load(&self, data: &[u8]) -> Result<TrackerModule, FormatError>;
}

/// Ordered set of decoders
#[derive(Default)]
pub struct FormatRegistry {
    loaders: Vec<Box<dyn FormatLoader>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a decoder. Earlier registrations win ties.
    pub fn register(&mut self, loader: impl FormatLoader + 'static) {
        self.loaders.push(Box::new(loader));
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, loader: impl FormatLoader + 'static) -> Self {
        self.register(loader);
        self
    }

    /// Number of registered decoders
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Best scoring decoder for `data`, if any scores above zero
    pub fn identify(&self, data: &[u8]) -> Option<&dyn FormatLoader> {
        let mut best: Option<(&dyn FormatLoader, u32)> = None;
        for loader in &self.loaders {
            let score = loader.identify(data);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((loader.as_ref(), score));
            }
        }
        best.map(|(loader, _)| loader)
    }

    /// Decode `data` with the best scoring decoder
    pub fn load(&self, data: &[u8]) -> Result<TrackerModule, FormatError> {
        let loader = self.identify(data).ok_or(FormatError::UnrecognizedFormat)?;
        debug!(format = loader.name(), bytes = data.len(), "loading module");
        loader.load(data)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.loaders.iter().map(|l| l.name()))
            .finish()
    }
}
