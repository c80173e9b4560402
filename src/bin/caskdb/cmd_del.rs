use anyhow::Result;
use std::path::PathBuf;

use CaskDB::store::Store;

pub fn exec(path: PathBuf, key: String) -> Result<()> {
    let mut store = Store::open(&path)?;
    let existed = store.delete(key.as_bytes())?;
    store.close()?;
    if existed {
        println!("deleted '{}'", key);
    } else {
        println!("not found '{}'", key);
    }
    Ok(())
}
