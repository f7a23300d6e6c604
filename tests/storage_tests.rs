use listener_console::storage::{FileStorage, KeyValueStorage, MemoryStorage, TOKEN_KEY};
use listener_console::ConsoleError;

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));

        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        storage.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        storage.remove(TOKEN_KEY).unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        // Removing twice is not an error.
        storage.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path()).set("k", "v").unwrap();
        assert_eq!(
            FileStorage::new(dir.path()).get("k").unwrap().as_deref(),
            Some("v")
        );
    }

    #[test]
    fn test_keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("inner"));
        storage.set("../../escape", "x").unwrap();

        assert!(!dir.path().join("escape").exists());
        assert!(dir.path().join("inner").join("escape").exists());
    }

    #[test]
    fn test_unusable_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.set("../..", "x"),
            Err(ConsoleError::InvalidArgument(_))
        ));
    }
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_memory_success() {
        let storage = MemoryStorage::with_value(TOKEN_KEY, "seeded");
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("seeded"));
    }

    #[test]
    fn test_memory_failure() {
        let storage = MemoryStorage::new_failing();
        assert!(matches!(
            storage.set(TOKEN_KEY, "abc"),
            Err(ConsoleError::StorageUnavailable(_))
        ));
        assert!(storage.get(TOKEN_KEY).is_err());
    }
}
