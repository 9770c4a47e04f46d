//! The lifecycle over on-disk stores, reopened between steps.

mod common;

use common::{alice, fixed};
use sealdrive_drive::{DriveConfig, LifecycleManager, UploadRequest};
use sealdrive_store::{FileRecordStore, LocalBlobStore};
use std::sync::Arc;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> LifecycleManager {
    let blobs = LocalBlobStore::open(dir.path().join("blobs")).await.unwrap();
    let records = FileRecordStore::open(dir.path().join("records")).await.unwrap();
    LifecycleManager::new(Arc::new(blobs), Arc::new(records), DriveConfig::default()).unwrap()
}

#[tokio::test]
async fn encrypted_object_survives_restart_and_trash_cycle() {
    let dir = TempDir::new().unwrap();
    let content = b"tax return 2024".to_vec();

    let id = {
        let manager = open(&dir).await;
        manager
            .upload(
                &alice(),
                UploadRequest::new("tax.txt", "text/plain", content.clone()),
                &fixed("s3cret"),
            )
            .await
            .unwrap()
            .id
    };

    let trashed_id = {
        let manager = open(&dir).await;
        manager.move_to_trash(&alice(), &id).await.unwrap().id
    };

    let manager = open(&dir).await;
    let restored = manager.restore(&alice(), &trashed_id).await.unwrap();
    assert_eq!(restored.id, id);

    let manager = open(&dir).await;
    let file = manager
        .download(&alice(), &id, &fixed("s3cret"))
        .await
        .unwrap();
    assert_eq!(file.bytes, content);
}

#[tokio::test]
async fn purge_removes_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let manager = open(&dir).await;
    let object = manager
        .upload_unencrypted(&alice(), UploadRequest::new("a.txt", "text/plain", b"a".to_vec()))
        .await
        .unwrap();
    let on_disk = object
        .record
        .path
        .split('/')
        .fold(dir.path().join("blobs"), |p, s| p.join(s));
    assert!(on_disk.exists());

    let trashed = manager.move_to_trash(&alice(), &object.id).await.unwrap();
    manager.purge(&alice(), &trashed.id).await.unwrap();
    assert!(!on_disk.exists());
}

#[tokio::test]
async fn failed_trash_write_keeps_object_active_across_restart() {
    let dir = TempDir::new().unwrap();
    let id = {
        let manager = open(&dir).await;
        manager
            .upload_unencrypted(&alice(), UploadRequest::new("a.txt", "text/plain", b"a".to_vec()))
            .await
            .unwrap()
            .id
    };
    let blocker = dir.path().join("records").join("trash.json.part");
    std::fs::create_dir(&blocker).unwrap();

    {
        let manager = open(&dir).await;
        assert!(manager.move_to_trash(&alice(), &id).await.is_err());
        assert!(manager.move_to_trash(&alice(), &id).await.is_err());
        assert!(manager.list_trashed(&alice()).await.unwrap().is_empty());
        assert_eq!(manager.list_active(&alice()).await.unwrap().len(), 1);
    }

    {
        let manager = open(&dir).await;
        assert_eq!(manager.list_active(&alice()).await.unwrap().len(), 1);
        assert!(manager.list_trashed(&alice()).await.unwrap().is_empty());
    }

    std::fs::remove_dir(&blocker).unwrap();
    let trashed_id = {
        let manager = open(&dir).await;
        manager.move_to_trash(&alice(), &id).await.unwrap().id
    };

    let manager = open(&dir).await;
    assert!(manager.list_active(&alice()).await.unwrap().is_empty());
    let trashed = manager.list_trashed(&alice()).await.unwrap();
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].id, trashed_id);
    assert_eq!(trashed[0].record.original_identity.as_ref(), Some(&id));
}
