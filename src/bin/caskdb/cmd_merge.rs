use anyhow::Result;
use std::path::PathBuf;

use CaskDB::store::Store;

pub fn exec(path: PathBuf) -> Result<()> {
    let mut store = Store::open(&path)?;
    let rep = store.merge()?;
    store.close()?;
    match rep.merge_file_id {
        Some(id) => println!(
            "merged {} files into {} ({} records, {} B)",
            rep.source_files, id, rep.records_copied, rep.bytes_copied
        ),
        None => println!("nothing to merge"),
    }
    Ok(())
}
