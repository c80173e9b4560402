use anyhow::{anyhow, Result};
use std::path::PathBuf;

use CaskDB::store::Store;

use super::util::read_all;

pub fn exec(path: PathBuf, key: String, value: Option<String>, value_file: Option<PathBuf>) -> Result<()> {
    let bytes = match (value_file, value) {
        (Some(p), _) => read_all(&p)?,
        (None, Some(s)) => s.into_bytes(),
        (None, None) => return Err(anyhow!("either --value or --value-file is required")),
    };

    let mut store = Store::open(&path)?;
    store.put(key.as_bytes(), &bytes)?;
    store.close()?;
    println!("ok '{}' ({} B)", key, bytes.len());
    Ok(())
}
