#[cfg(test)]
mod tests {
    use crate::DedupStore;
    use std::fs;

    fn store_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("state_reddit_ids.json")
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DedupStore::load(store_path(&dir)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_mark_and_contains() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DedupStore::load(store_path(&dir)).unwrap();

        assert!(!store.contains("t3_abc"));
        store.mark("t3_abc");
        assert!(store.contains("t3_abc"));
        assert_eq!(store.len(), 1);

        // Marking twice is a no-op
        store.mark("t3_abc");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let mut store = DedupStore::load(&path).unwrap();
        store.mark("t3_one");
        store.mark("t3_two");
        store.persist().unwrap();

        let reloaded = DedupStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("t3_one"));
        assert!(reloaded.contains("t3_two"));
        assert!(!reloaded.contains("t3_three"));
    }

    #[test]
    fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let mut store = DedupStore::load(&path).unwrap();
        store.mark("t3_abc");
        store.persist().unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["state_reddit_ids.json".to_string()]);
    }

    #[test]
    fn test_reads_original_state_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, r#"{"t3_old1": true, "t3_old2": true}"#).unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert!(store.contains("t3_old1"));
        assert!(store.contains("t3_old2"));
    }

    #[test]
    fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        fs::write(&path, "{ not json").unwrap();

        let store = DedupStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_persist_overwrites_previous_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let mut store = DedupStore::load(&path).unwrap();
        store.mark("t3_first");
        store.persist().unwrap();

        let mut store = DedupStore::load(&path).unwrap();
        store.mark("t3_second");
        store.persist().unwrap();

        let reloaded = DedupStore::load(&path).unwrap();
        assert!(reloaded.contains("t3_first"));
        assert!(reloaded.contains("t3_second"));
    }
}
