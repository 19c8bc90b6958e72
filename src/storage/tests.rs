#[cfg(test)]
mod tests {
    use crate::error_handling::types::StorageError;
    use crate::external::location::ExternalLocation;
    use crate::hashing::ImageHasher;
    use crate::registry::{register_phash_storage_with_hasher, StorageRegistry};
    use crate::storage::{PerceptualHashStorage, StorageProtocol};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    // Runs the create workflow the snapshot framework performs for `phash:`
    fn create_external(storage: &dyn StorageProtocol, src: &Path) -> ExternalLocation {
        let empty = ExternalLocation::parse("phash:").unwrap();
        let location = storage.new_location(&empty, src).unwrap();
        storage.store(&location, src).unwrap();
        location
    }

    fn stored_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|n| n != ".gitignore")
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_concurrent_stores_leave_one_file() {
        let dir = TempDir::new().unwrap();
        let hasher: Arc<dyn ImageHasher> =
            Arc::new(|_: &Path| -> Result<String, StorageError> { Ok("shared".to_string()) });
        let storage = Arc::new(PerceptualHashStorage::with_hasher(dir.path().join("store"), hasher));

        let sources: Vec<PathBuf> = (0..8)
            .map(|i| {
                let p = dir.path().join(format!("src{}.png", i));
                fs::write(&p, b"identical content").unwrap();
                p
            })
            .collect();

        let handles: Vec<_> = sources
            .into_iter()
            .map(|src| {
                let storage = storage.clone();
                thread::spawn(move || create_external(storage.as_ref(), &src))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap().path(), "shared.png");
        }

        assert_eq!(stored_files(storage.directory()), vec!["shared.png"]);
        let loc = ExternalLocation::parse("phash:shared.png").unwrap();
        assert_eq!(storage.load(&loc).unwrap().read_bytes().unwrap(), b"identical content");
    }

    #[test]
    fn test_lifecycle_through_registry() {
        let dir = TempDir::new().unwrap();
        let mut registry = StorageRegistry::new();
        let hasher: Arc<dyn ImageHasher> = Arc::new(|p: &Path| -> Result<String, StorageError> {
            Ok(fs::read_to_string(p).unwrap_or_default().trim().to_string())
        });
        register_phash_storage_with_hasher(&mut registry, Some(dir.path().join("phash").as_path()), hasher);

        let src = dir.path().join("pic.png");
        fs::write(&src, "k42").unwrap();

        let reference = ExternalLocation::parse("phash:").unwrap();
        let storage = registry.resolve(&reference).unwrap();
        let location = create_external(storage.as_ref(), &src);
        assert_eq!(location.to_string(), "phash:k42.png");

        {
            let loaded = storage.load(&location).unwrap();
            assert!(loaded.ends_with("k42.png"));
            assert_eq!(fs::read(loaded.path()).unwrap(), b"k42");
        }

        storage.delete(&location).unwrap();
        assert!(matches!(storage.load(&location), Err(StorageError::LookupFailed(_))));
    }

    #[cfg(feature = "builtin-hasher")]
    mod images {
        use super::*;
        use crate::storage::phash_storage::PROTOCOL_NAME;
        use image::{Rgb, RgbImage};

        fn fill_png(dir: &Path, name: &str, w: u32, h: u32, c: [u8; 3]) -> PathBuf {
            let path = dir.join(name);
            RgbImage::from_pixel(w, h, Rgb(c)).save(&path).unwrap();
            path
        }

        fn checkerboard_png(dir: &Path, name: &str, w: u32, h: u32, cell: u32) -> PathBuf {
            let path = dir.join(name);
            RgbImage::from_fn(w, h, |x, y| {
                if (x / cell + y / cell) % 2 == 0 {
                    Rgb([0, 0, 0])
                } else {
                    Rgb([255, 255, 255])
                }
            })
            .save(&path)
            .unwrap();
            path
        }

        fn setup() -> (TempDir, PerceptualHashStorage) {
            let dir = TempDir::new().unwrap();
            let storage = PerceptualHashStorage::new(dir.path().join(".inline-snapshot").join(PROTOCOL_NAME)).unwrap();
            (dir, storage)
        }

        #[test]
        fn test_same_image_different_resolution_is_deduplicated() {
            let (dir, storage) = setup();
            let big = fill_png(dir.path(), "red_square.png", 100, 100, [255, 0, 0]);
            fs::create_dir(dir.path().join("tiny")).unwrap();
            let tiny = fill_png(&dir.path().join("tiny"), "red_square.png", 2, 2, [255, 0, 0]);

            let first = create_external(&storage, &big);
            let second = create_external(&storage, &tiny);
            assert_eq!(first.stem(), second.stem());
            assert_eq!(stored_files(storage.directory()), vec![first.path()]);

            // the tiny image was skipped, so the stored bytes are the first image's
            let loaded = storage.load(&second).unwrap();
            assert_eq!(loaded.read_bytes().unwrap(), fs::read(&big).unwrap());
        }

        #[test]
        fn test_distinct_images_get_distinct_files() {
            let (dir, storage) = setup();
            let board = checkerboard_png(dir.path(), "checkerboard.png", 64, 64, 8);
            let red = fill_png(dir.path(), "red_square.png", 100, 100, [255, 0, 0]);

            let a = create_external(&storage, &board);
            let b = create_external(&storage, &red);
            assert_ne!(a.stem(), b.stem());
            assert_eq!(stored_files(storage.directory()).len(), 2);
        }

        #[test]
        fn test_red_and_blue_fills_differ() {
            let (dir, storage) = setup();
            let red = fill_png(dir.path(), "red.png", 32, 32, [255, 0, 0]);
            let blue = fill_png(dir.path(), "blue.png", 32, 32, [0, 0, 255]);
            let empty = ExternalLocation::parse("phash:").unwrap();
            let red_loc = storage.new_location(&empty, &red).unwrap();
            let blue_loc = storage.new_location(&empty, &blue).unwrap();
            assert_ne!(red_loc.stem(), blue_loc.stem());
        }

        #[test]
        fn test_store_then_load_returns_original_bytes() {
            let (dir, storage) = setup();
            let board = checkerboard_png(dir.path(), "board.png", 48, 48, 6);
            let loc = create_external(&storage, &board);
            let loaded = storage.load(&loc).unwrap();
            assert_eq!(loaded.read_bytes().unwrap(), fs::read(&board).unwrap());
        }

        #[test]
        fn test_extensionless_image_is_unsupported() {
            let (dir, storage) = setup();
            let path = dir.path().join("image_without_suffix");
            RgbImage::from_pixel(4, 4, Rgb([255, 0, 0]))
                .save_with_format(&path, image::ImageFormat::Png)
                .unwrap();
            let err = storage
                .new_location(&ExternalLocation::parse("phash:").unwrap(), &path)
                .unwrap_err();
            assert!(matches!(err, StorageError::UnsupportedInput(_)));
        }
    }
}
