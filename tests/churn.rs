use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use CaskDB::config::CaskConfig;
use CaskDB::store::Store;

// Случайный поток put/delete с маленьким порогом ротации; эталон — HashMap.
// Состояние сверяется трижды: в процессе, после рестарта и после merge.
#[test]
fn churn_matches_model_across_reopen_and_merge() -> Result<()> {
    let root = unique_root("churn");
    let cfg = CaskConfig::default().with_max_file_size(512);

    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
    let mut rng = StdRng::seed_from_u64(0xC45D);

    {
        let mut store = Store::open_with_config(&root, cfg.clone())?;
        for _ in 0..2000 {
            let key = format!("key{:03}", rng.gen_range(0..150)).into_bytes();
            if rng.gen_bool(0.2) {
                store.delete(&key)?;
                model.remove(&key);
            } else {
                let len = rng.gen_range(1..64usize);
                let value: Vec<u8> = (0..len).map(|_| rng.gen::<u8>()).collect();
                store.put(&key, &value)?;
                model.insert(key.clone(), value);
            }
        }

        assert_eq!(store.live_len(), model.len());
        for (k, v) in &model {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }
        store.close()?;
    }

    {
        let mut store = Store::open_with_config(&root, cfg.clone())?;
        assert_eq!(store.live_len(), model.len(), "index after restart");
        for (k, v) in &model {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }

        let rep = store.merge()?;
        assert!(rep.merge_file_id.is_some(), "churn leaves files to merge");
        assert_eq!(store.live_len(), model.len(), "index after merge");
        for (k, v) in &model {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }
        store.close()?;
    }

    {
        let store = Store::open_with_config(&root, cfg)?;
        assert_eq!(store.live_len(), model.len(), "hint-driven index after merge");
        for (k, v) in &model {
            assert_eq!(store.get(k)?.as_deref(), Some(v.as_slice()));
        }
        store.close()?;
    }

    let _ = fs::remove_dir_all(&root);
    Ok(())
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("caskdb-{}-{}-{}", prefix, pid, t))
}
