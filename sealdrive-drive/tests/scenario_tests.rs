//! End-to-end walk through upload, trash, restore, and download with the
//! production iteration count.

mod common;

use common::{Harness, alice, fixed};
use pretty_assertions::assert_eq;
use sealdrive_drive::{DriveError, UploadRequest};

#[tokio::test]
async fn report_pdf_survives_trash_and_restore() {
    let h = Harness::new();
    let original: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

    // Upload
    let uploaded = h
        .manager
        .upload(
            &alice(),
            UploadRequest::new("report.pdf", "application/pdf", original.clone()),
            &fixed("hunter2"),
        )
        .await
        .unwrap();
    assert!(uploaded.record.is_encrypted);
    assert_eq!(uploaded.record.size_original, 10_000);
    let crypto = uploaded.record.crypto.clone().unwrap();
    assert_eq!(crypto.iters, Some(250_000));

    // Trash
    let trashed = h
        .manager
        .move_to_trash(&alice(), &uploaded.id)
        .await
        .unwrap();
    assert_eq!(trashed.record.original_identity.as_ref(), Some(&uploaded.id));
    assert!(trashed.record.deleted_at.is_some());

    // Restore
    let restored = h.manager.restore(&alice(), &trashed.id).await.unwrap();
    assert_eq!(restored.id, uploaded.id);
    assert_eq!(restored.record.crypto.as_ref(), Some(&crypto));
    assert_eq!(
        serde_json::to_string(&restored.record.crypto).unwrap(),
        serde_json::to_string(&uploaded.record.crypto).unwrap()
    );

    // Download
    let file = h
        .manager
        .download(&alice(), &restored.id, &fixed("hunter2"))
        .await
        .unwrap();
    assert_eq!(file.bytes.len(), 10_000);
    assert_eq!(file.bytes, original);

    let err = h
        .manager
        .download(&alice(), &restored.id, &fixed("wrongpass"))
        .await
        .unwrap_err();
    assert!(matches!(err, DriveError::AuthenticationFailure));
}

#[tokio::test]
async fn purge_is_terminal() {
    let h = Harness::new();
    let uploaded = h
        .manager
        .upload(
            &alice(),
            UploadRequest::new("report.pdf", "application/pdf", vec![7u8; 100]),
            &fixed("hunter2"),
        )
        .await
        .unwrap();
    let trashed = h
        .manager
        .move_to_trash(&alice(), &uploaded.id)
        .await
        .unwrap();

    h.manager.purge(&alice(), &trashed.id).await.unwrap();

    use sealdrive_store::BlobStore;
    assert!(h
        .blobs
        .inner
        .get(&uploaded.record.path)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(matches!(
        h.manager.get_trashed(&alice(), &trashed.id).await,
        Err(DriveError::NotFound(_))
    ));
    h.manager.purge(&alice(), &trashed.id).await.unwrap();
}
