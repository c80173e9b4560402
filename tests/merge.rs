use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use CaskDB::config::CaskConfig;
use CaskDB::files::{scan_store_dir, FileKind};
use CaskDB::store::Store;

// Запись ключа key{:02} со значением в 30 байт занимает 12 + 5 + 30 = 47 байт;
// порог в 470 укладывает ровно десять записей в файл.
const MAX_FILE: u64 = 470;

fn value_for(i: u32) -> String {
    format!("{:030}", i)
}

fn fill(store: &mut Store, n: u32) -> Result<()> {
    for i in 0..n {
        let key = format!("key{:02}", i);
        store.put(key.as_bytes(), value_for(i).as_bytes())?;
    }
    Ok(())
}

fn assert_all_readable(store: &Store, n: u32) -> Result<()> {
    for i in 0..n {
        let key = format!("key{:02}", i);
        let expect = value_for(i);
        assert_eq!(
            store.get(key.as_bytes())?.as_deref(),
            Some(expect.as_bytes()),
            "{} must be readable",
            key
        );
    }
    Ok(())
}

fn file_counts(root: &Path) -> Result<(usize, usize)> {
    let listing = scan_store_dir(root)?;
    let data = listing.iter().filter(|f| f.kind == FileKind::Data).count();
    let hint = listing.iter().filter(|f| f.kind == FileKind::Hint).count();
    Ok((data, hint))
}

#[test]
fn merge_reclaims_files_and_preserves_values() -> Result<()> {
    let root = unique_root("merge");
    let cfg = CaskConfig::default().with_max_file_size(MAX_FILE);
    let mut store = Store::open_with_config(&root, cfg)?;
    fill(&mut store, 100)?;

    let (data_before, hint_before) = file_counts(&root)?;
    assert!(data_before >= 10, "expected ~10 data files, got {}", data_before);
    assert_eq!(hint_before, 0);

    let rep = store.merge()?;
    assert!(rep.merge_file_id.is_some());
    assert_eq!(rep.source_files as usize, data_before - 1);
    assert_eq!(rep.records_copied, 90, "10 newest keys live in the active file");

    // Неактивные файлы схлопнулись в одну пару data+hint; активный остался
    let (data_after, hint_after) = file_counts(&root)?;
    assert_eq!(data_after, 2);
    assert_eq!(hint_after, 1);

    assert_all_readable(&store, 100)?;
    store.close()?;
    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn second_merge_is_a_noop() -> Result<()> {
    let root = unique_root("mergenoop");
    let cfg = CaskConfig::default().with_max_file_size(MAX_FILE);
    let mut store = Store::open_with_config(&root, cfg)?;
    fill(&mut store, 100)?;

    store.merge()?;
    let listing_before: Vec<(u32, bool)> = scan_store_dir(&root)?
        .iter()
        .map(|f| (f.id, f.kind == FileKind::Data))
        .collect();

    let rep = store.merge()?;
    assert!(rep.merge_file_id.is_none(), "nothing eligible after a merge");
    assert_eq!(rep.records_copied, 0);

    let listing_after: Vec<(u32, bool)> = scan_store_dir(&root)?
        .iter()
        .map(|f| (f.id, f.kind == FileKind::Data))
        .collect();
    assert_eq!(listing_before, listing_after, "no files created or deleted");

    store.close()?;
    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn merge_drops_overwritten_and_deleted_records() -> Result<()> {
    let root = unique_root("mergedrop");
    let cfg = CaskConfig::default().with_max_file_size(MAX_FILE);
    let mut store = Store::open_with_config(&root, cfg)?;
    fill(&mut store, 40)?;
    // Перезаписи и удаления до merge: старые версии должны быть отброшены
    store.put(b"key00", b"fresh")?;
    store.delete(b"key01")?;
    fill_more_rotations(&mut store)?;

    let rep = store.merge()?;
    assert!(rep.merge_file_id.is_some());

    assert_eq!(store.get(b"key00")?.as_deref(), Some(&b"fresh"[..]));
    assert!(store.get(b"key01")?.is_none());
    for i in 2..40u32 {
        let key = format!("key{:02}", i);
        assert_eq!(
            store.get(key.as_bytes())?.as_deref(),
            Some(value_for(i).as_bytes())
        );
    }

    store.close()?;
    let _ = fs::remove_dir_all(&root);
    Ok(())
}

// Догоняем ротацию, чтобы перезапись/удаление выше уехали из активного файла
fn fill_more_rotations(store: &mut Store) -> Result<()> {
    for i in 100..120u32 {
        let key = format!("pad{:03}", i);
        store.put(key.as_bytes(), value_for(i).as_bytes())?;
    }
    Ok(())
}

#[test]
fn index_rebuild_with_and_without_hints_is_equivalent() -> Result<()> {
    let root = unique_root("hinteq");
    let cfg = CaskConfig::default().with_max_file_size(MAX_FILE);
    {
        let mut store = Store::open_with_config(&root, cfg.clone())?;
        fill(&mut store, 100)?;
        store.merge()?;
        store.close()?;
    }

    // Перестройка по hint-файлам
    let with_hints: Vec<(Vec<u8>, Vec<u8>)> = {
        let store = Store::open_with_config(&root, cfg.clone())?;
        let mut pairs = store.fold(Vec::new(), |mut acc, k, v| {
            acc.push((k.to_vec(), v.to_vec()));
            acc
        })?;
        pairs.sort();
        store.close()?;
        pairs
    };

    // Перестройка после удаления всех hint-файлов — тот же результат
    for f in scan_store_dir(&root)? {
        if f.kind == FileKind::Hint {
            fs::remove_file(&f.path)?;
        }
    }
    let without_hints: Vec<(Vec<u8>, Vec<u8>)> = {
        let store = Store::open_with_config(&root, cfg)?;
        let mut pairs = store.fold(Vec::new(), |mut acc, k, v| {
            acc.push((k.to_vec(), v.to_vec()));
            acc
        })?;
        pairs.sort();
        store.close()?;
        pairs
    };

    assert_eq!(with_hints.len(), 100);
    assert_eq!(with_hints, without_hints);
    let _ = fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn merged_store_survives_reopen() -> Result<()> {
    let root = unique_root("mergereopen");
    let cfg = CaskConfig::default().with_max_file_size(MAX_FILE);
    {
        let mut store = Store::open_with_config(&root, cfg.clone())?;
        fill(&mut store, 100)?;
        store.merge()?;
        store.close()?;
    }
    {
        let store = Store::open_with_config(&root, cfg)?;
        assert_all_readable(&store, 100)?;
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
