//! Tests for filesystem object storage.

use nugu_interface::{ObjectMetadata, ObjectStorage};
use nugu_storage::FileSystemStorage;
use tempfile::TempDir;

fn metadata() -> ObjectMetadata {
    ObjectMetadata::default()
        .with_filename("https://cdn.example/irene.png")
        .with_mime_type("image/png")
        .with_channel_id(10u64)
        .with_user_id(20u64)
}

#[tokio::test]
async fn test_put_and_get() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let data = b"fake png bytes";
    let key = storage.put(data, &metadata()).await.unwrap();

    assert_eq!(key.len(), 32);
    let retrieved = storage.get(&key).await.unwrap();
    assert_eq!(retrieved, data);

    let path = temp_dir.path().join(&key[0..2]).join(&key[2..4]).join(&key);
    assert!(path.exists());
    assert!(path.with_extension("json").exists());
}

#[tokio::test]
async fn test_identical_bytes_get_distinct_keys() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let first = storage.put(b"same", &metadata()).await.unwrap();
    let second = storage.put(b"same", &metadata()).await.unwrap();
    assert_ne!(first, second);

    storage.delete(&first).await.unwrap();
    assert_eq!(storage.get(&second).await.unwrap(), b"same");
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let key = storage.put(b"bytes", &metadata()).await.unwrap();
    storage.delete(&key).await.unwrap();

    let err = storage.get(&key).await.unwrap_err();
    assert!(err.is_user_facing());
    // Deleting twice is not an error.
    storage.delete(&key).await.unwrap();
}

#[tokio::test]
async fn test_corrupted_object_fails_checksum() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let key = storage.put(b"original", &metadata()).await.unwrap();
    let path = temp_dir.path().join(&key[0..2]).join(&key[2..4]).join(&key);
    std::fs::write(&path, b"tampered").unwrap();

    assert!(storage.get(&key).await.is_err());
}

#[tokio::test]
async fn test_rejects_path_like_keys() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    assert!(storage.get("../../etc/passwd").await.is_err());
    assert!(storage.delete("short").await.is_err());
}
