use anyhow::Result;
use std::path::PathBuf;

use CaskDB::store::Store;

use super::util::display_text;

pub fn exec(path: PathBuf) -> Result<()> {
    let store = Store::open(&path)?;
    let mut keys = store.list_keys();
    keys.sort_unstable();
    for key in &keys {
        println!("{}", display_text(key));
    }
    eprintln!("{} live keys", keys.len());
    Ok(())
}
