//! Reading module files from disk

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use nether_tracker::TrackerModule;
use tracing::debug;

/// A decoded module and the size of the file it came from
pub struct LoadedModule {
    pub module: TrackerModule,
    pub file_size: usize,
}

pub fn load_module(path: &Path) -> Result<LoadedModule> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let module = nether_mod::registry()
        .load(&data)
        .with_context(|| format!("Failed to decode {}", path.display()))?;

    debug!(
        path = %path.display(),
        channels = module.num_channels,
        patterns = module.patterns.len(),
        orders = module.order_table.len(),
        "Loaded module"
    );

    Ok(LoadedModule {
        module,
        file_size: data.len(),
    })
}
