use anyhow::Result;
use std::path::PathBuf;

use CaskDB::files::{self, FileKind};
use CaskDB::metrics;
use CaskDB::store::Store;

// serde_json для безопасного JSON-вывода
use serde_json::json;

pub fn exec(path: PathBuf, json: bool) -> Result<()> {
    let store = Store::open(&path)?;

    let listing = files::scan_store_dir(&path)?;
    let data_files = listing.iter().filter(|f| f.kind == FileKind::Data).count();
    let hint_files = listing.iter().filter(|f| f.kind == FileKind::Hint).count();
    let live_keys = store.live_len();
    let active_file_id = store.active_file_id();
    let cfg = store.config().clone();
    let m = metrics::metrics_snapshot();

    if json {
        let obj = json!({
            "path": path.display().to_string(),
            "data_files": data_files,
            "hint_files": hint_files,
            "live_keys": live_keys,
            "active_file_id": active_file_id,
            "config": {
                "max_file_size": cfg.max_file_size,
                "data_fsync": cfg.data_fsync,
                "rotate_fsync": cfg.rotate_fsync,
            },
            "metrics": {
                "index_files_scanned": m.index_files_scanned,
                "index_hints_used": m.index_hints_used,
                "index_records_seen": m.index_records_seen,
                "index_torn_tails": m.index_torn_tails,
            },
        });
        println!("{}", serde_json::to_string_pretty(&obj)?);
        return Ok(());
    }

    println!("store:          {}", path.display());
    println!("data files:     {}", data_files);
    println!("hint files:     {}", hint_files);
    println!("live keys:      {}", live_keys);
    match active_file_id {
        Some(id) => println!("active file:    {}.data", id),
        None => println!("active file:    (closed for writes)"),
    }
    println!("config:         {}", cfg);
    println!(
        "index build:    {} files ({} via hint), {} records, {} torn tails discarded",
        m.index_files_scanned, m.index_hints_used, m.index_records_seen, m.index_torn_tails
    );
    Ok(())
}
