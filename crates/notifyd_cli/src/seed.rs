use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};

use notify_store::{MemoryStore, StoreSeed};

/// Load the declarative objects the gateway serves from a JSON seed file.
pub(crate) fn load_store(path: &Path) -> Result<MemoryStore> {
    let file =
        File::open(path).with_context(|| format!("failed to open seed {}", path.display()))?;
    let reader = BufReader::new(file);
    let seed: StoreSeed = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse seed {}", path.display()))?;
    Ok(MemoryStore::from_seed(seed))
}
