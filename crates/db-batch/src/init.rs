use std::{fs, path::Path};

use anyhow::Context;
use tracing::info;

use crate::{SledStore, StoreConfig, engine::SledEngine};

/// Opens a sled-backed store under `<datadir>/sled/<dbname>`, creating the directory if needed.
pub fn open_sled_store(
    datadir: &Path,
    dbname: &str,
    config: StoreConfig,
) -> anyhow::Result<SledStore> {
    let mut database_dir = datadir.to_path_buf();
    database_dir.push("sled");
    database_dir.push(dbname);

    if !database_dir.exists() {
        fs::create_dir_all(&database_dir)
            .with_context(|| format!("creating {}", database_dir.display()))?;
    }

    let sled_db = sled::open(&database_dir).context("opening sled database")?;
    info!(path = %database_dir.display(), sync = config.write_options.sync, "opened sled store");

    Ok(SledStore::new(SledEngine::new(sled_db), config))
}
