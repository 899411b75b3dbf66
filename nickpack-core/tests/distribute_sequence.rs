use mockall::Sequence;
use nickpack_core::compose::Bundle;
use nickpack_core::contract::{
    ArtifactUploadKind, ArtifactUploadResult, MockArtifactUploader, MockReplyPoster, ReplyTarget,
    UploadError,
};
use nickpack_core::distribute::{distribute, DistributeError, Pacing};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

const OWNER: i64 = -77;

fn sample_bundle() -> Bundle {
    Bundle {
        avatar: vec![1, 2, 3],
        cover_primary: vec![4, 5, 6],
        cover_secondary: vec![7, 8, 9],
    }
}

fn target() -> ReplyTarget {
    ReplyTarget {
        owner_id: OWNER,
        post_id: 123,
        comment_id: 5001,
    }
}

fn no_pacing() -> Pacing {
    Pacing { min_ms: 0, max_ms: 0 }
}

#[tokio::test]
async fn test_full_sequence_uploads_and_replies_in_order() {
    let mut uploader = MockArtifactUploader::new();
    let ids = Arc::new(AtomicI64::new(0));

    let preview_ids = ids.clone();
    uploader
        .expect_upload_preview()
        .times(3)
        .returning(move |_, _| {
            Ok(ArtifactUploadResult {
                owner_id: OWNER,
                id: preview_ids.fetch_add(1, Ordering::SeqCst) + 1,
                kind: ArtifactUploadKind::Photo,
            })
        });

    let document_ids = ids.clone();
    uploader
        .expect_upload_document()
        .times(4)
        .returning(move |_, _| {
            Ok(ArtifactUploadResult {
                owner_id: OWNER,
                id: document_ids.fetch_add(1, Ordering::SeqCst) + 1,
                kind: ArtifactUploadKind::Document,
            })
        });

    let mut replies = MockReplyPoster::new();
    let mut reply_order = Sequence::new();
    replies
        .expect_post_reply()
        .times(1)
        .in_sequence(&mut reply_order)
        .withf(|_, message, attachments| {
            message.contains("abc")
                && attachments == "photo-77_1,photo-77_2,photo-77_3,doc-77_4,doc-77_5"
        })
        .returning(|_, _, _| Ok(()));
    replies
        .expect_post_reply()
        .times(1)
        .in_sequence(&mut reply_order)
        .withf(|_, _, attachments| attachments == "doc-77_6,doc-77_7")
        .returning(|_, _, _| Ok(()));

    let report = distribute(
        &sample_bundle(),
        "abc",
        &target(),
        &uploader,
        &replies,
        &no_pacing(),
    )
    .await
    .expect("sequence should succeed");

    assert_eq!(report.artifacts.len(), 7);
    assert_eq!(report.replies_posted, 2);
}

#[tokio::test]
async fn test_failed_preview_aborts_and_sends_one_fallback_reply() {
    let mut uploader = MockArtifactUploader::new();
    let mut upload_order = Sequence::new();
    uploader
        .expect_upload_preview()
        .times(1)
        .in_sequence(&mut upload_order)
        .returning(|_, _| {
            Ok(ArtifactUploadResult {
                owner_id: OWNER,
                id: 1,
                kind: ArtifactUploadKind::Photo,
            })
        });
    uploader
        .expect_upload_preview()
        .times(1)
        .in_sequence(&mut upload_order)
        .returning(|_, _| {
            Err(UploadError::Transport {
                operation: "photos.upload".to_string(),
                message: "connection reset".to_string(),
            })
        });
    // Nothing after the failed preview runs.
    uploader.expect_upload_document().times(0);

    let mut replies = MockReplyPoster::new();
    replies
        .expect_post_reply()
        .times(1)
        .withf(|_, message, attachments| message.contains("error") && attachments.is_empty())
        .returning(|_, _, _| Ok(()));

    let err = distribute(
        &sample_bundle(),
        "abc",
        &target(),
        &uploader,
        &replies,
        &no_pacing(),
    )
    .await
    .expect_err("sequence should abort");

    assert!(matches!(err, DistributeError::Upload(_)), "got {err:?}");
}

#[tokio::test]
async fn test_failing_fallback_reply_is_swallowed() {
    let mut uploader = MockArtifactUploader::new();
    uploader.expect_upload_preview().times(1).returning(|_, _| {
        Err(UploadError::MalformedResponse {
            operation: "photos.getUploadServer".to_string(),
        })
    });

    let mut replies = MockReplyPoster::new();
    replies.expect_post_reply().times(1).returning(|_, _, _| {
        Err(nickpack_core::contract::ReplyError::Transport {
            message: "down".to_string(),
        })
    });

    // The original upload error surfaces; the fallback failure is only logged.
    let err = distribute(
        &sample_bundle(),
        "abc",
        &target(),
        &uploader,
        &replies,
        &no_pacing(),
    )
    .await
    .expect_err("sequence should abort");
    assert!(matches!(err, DistributeError::Upload(_)));
}
