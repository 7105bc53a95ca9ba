//! End-to-end tests through the bootstrap path and the controller envelope.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::object_store::StoredObject;
use bridge_traits::{BridgeError, FixedClock, ObjectStore};
use bytes::Bytes;
use core_catalog::{
    AudioUpload, Genre, NewSong, SongQueryParams, SongUpdate, StatsQueryParams,
};
use core_service::{CatalogCore, CoreConfig};
use mockall::mock;
use std::path::PathBuf;
use std::sync::Arc;

mock! {
    pub Store {}

    #[async_trait]
    impl ObjectStore for Store {
        async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> BridgeResult<StoredObject>;
        async fn delete_object(&self, key: &str) -> BridgeResult<()>;
        async fn object_exists(&self, key: &str) -> BridgeResult<bool>;
    }
}

fn storage_dir() -> PathBuf {
    std::env::temp_dir().join(format!("catalog-service-{}", uuid::Uuid::new_v4()))
}

fn config(storage_dir: PathBuf) -> CoreConfig {
    CoreConfig::builder()
        .database_url("sqlite::memory:")
        .storage_dir(storage_dir)
        .public_base_url("http://localhost:3000")
        .build()
        .unwrap()
}

async fn core() -> (CatalogCore, PathBuf) {
    let dir = storage_dir();
    let core = CatalogCore::bootstrap(config(dir.clone())).await.unwrap();
    (core, dir)
}

fn mp3(name: &str) -> AudioUpload {
    AudioUpload::new(name, "audio/mpeg", Bytes::from_static(b"ID3\x03fake-audio"))
}

fn hotel_california() -> NewSong {
    NewSong::new("Hotel California", "Eagles", Genre::Rock)
        .with_album("Hotel California")
        .with_duration(391)
}

#[tokio::test]
async fn test_create_requires_audio_file() {
    let (core, _dir) = core().await;

    let response = core.controller().create_song(hotel_california(), None).await;

    assert_eq!(response.status_code, 400);
    assert!(!response.success);
    assert_eq!(response.message, "Audio file is required");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_song_lifecycle_with_local_store() {
    let (core, dir) = core().await;
    let controller = core.controller();

    let created = controller
        .create_song(hotel_california(), Some(mp3("hotel.mp3")))
        .await;
    assert_eq!(created.status_code, 201);
    assert_eq!(created.message, "Song created successfully");

    let song = created.data.unwrap();
    let file_url = song.file_url.clone().unwrap();
    assert!(file_url.starts_with("http://localhost:3000/songs/"));
    assert!(file_url.ends_with(".mp3"));
    assert_eq!(song.file_name.as_deref(), Some("hotel.mp3"));
    assert_eq!(song.file_size, Some(14));

    let key = file_url.trim_start_matches("http://localhost:3000/");
    let stored_path = dir.join(key);
    assert!(stored_path.exists());

    let fetched = controller.get_song(&song.id).await;
    assert_eq!(fetched.status_code, 200);
    assert_eq!(fetched.data.unwrap().title, "Hotel California");

    let listed = controller.list_songs(&SongQueryParams::default()).await;
    let payload = listed.data.unwrap();
    assert_eq!(payload.items.len(), 1);
    assert_eq!(payload.pagination.total, 1);
    assert_eq!(payload.pagination.page, 1);
    assert_eq!(payload.pagination.limit, 10);

    let deleted = controller.delete_song(&song.id).await;
    assert_eq!(deleted.status_code, 200);
    assert_eq!(deleted.data.as_deref(), Some(song.id.as_str()));
    assert!(!stored_path.exists());

    let missing = controller.get_song(&song.id).await;
    assert_eq!(missing.status_code, 404);

    core.shutdown().await;
    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test]
async fn test_rejected_upload_stores_nothing() {
    let (core, dir) = core().await;

    let upload = AudioUpload::new("clip.mp4", "video/mp4", Bytes::from_static(b"not audio"));
    let response = core
        .controller()
        .create_song(hotel_california(), Some(upload))
        .await;

    assert_eq!(response.status_code, 400);
    assert!(response.message.starts_with("Invalid file type"));
    assert!(!dir.join("songs").exists());

    let listed = core.controller().list_songs(&SongQueryParams::default()).await;
    assert_eq!(listed.data.unwrap().pagination.total, 0);
}

#[tokio::test]
async fn test_invalid_metadata_is_rejected_before_upload() {
    let (core, dir) = core().await;

    let response = core
        .controller()
        .create_song(NewSong::new("   ", "Eagles", Genre::Rock), Some(mp3("x.mp3")))
        .await;

    assert_eq!(response.status_code, 400);
    let errors = response.errors.unwrap();
    assert!(errors.iter().any(|e| e.field == "title"));
    assert!(!dir.join("songs").exists());
}

#[tokio::test]
async fn test_update_with_blank_payload_is_bad_request() {
    let (core, _dir) = core().await;
    let controller = core.controller();
    let song = controller
        .create_song(hotel_california(), Some(mp3("a.mp3")))
        .await
        .data
        .unwrap();

    let blank = SongUpdate {
        title: Some("  ".to_string()),
        ..SongUpdate::default()
    };
    let response = controller.update_song(&song.id, blank).await;
    assert_eq!(response.status_code, 400);
    assert_eq!(response.message, "No valid update data provided");

    let rename = SongUpdate {
        album: Some("Live".to_string()),
        ..SongUpdate::default()
    };
    let response = controller.update_song(&song.id, rename).await;
    assert_eq!(response.status_code, 200);
    assert_eq!(response.data.unwrap().album.as_deref(), Some("Live"));
}

#[tokio::test]
async fn test_soft_delete_hides_song_until_restored() {
    let (core, _dir) = core().await;
    let controller = core.controller();
    let song = controller
        .create_song(hotel_california(), Some(mp3("a.mp3")))
        .await
        .data
        .unwrap();

    assert_eq!(controller.soft_delete_song(&song.id).await.status_code, 200);
    assert_eq!(controller.get_song(&song.id).await.status_code, 404);

    let stats = controller.get_stats(&StatsQueryParams::default()).await;
    assert_eq!(stats.data.unwrap().total_songs, 0);

    assert_eq!(controller.restore_song(&song.id).await.status_code, 200);
    assert_eq!(controller.get_song(&song.id).await.status_code, 200);

    let stats = controller.get_stats(&StatsQueryParams::default()).await;
    let stats = stats.data.unwrap();
    assert_eq!(stats.total_songs, 1);
    assert_eq!(stats.songs_by_genre[&Genre::Rock], 1);
    assert_eq!(stats.songs_by_genre.len(), 13);
}

#[tokio::test]
async fn test_failed_object_delete_keeps_song() {
    let mut store = MockStore::new();
    store.expect_put_object().returning(|key, data, _| {
        Ok(StoredObject {
            url: format!("http://localhost:3000/{}", key),
            key: key.to_string(),
            bucket: "mock".to_string(),
            size: data.len() as u64,
        })
    });
    store
        .expect_delete_object()
        .withf(|key| key.starts_with("songs/"))
        .times(1)
        .returning(|_| Err(BridgeError::OperationFailed("access denied".to_string())));

    let core = CatalogCore::with_object_store(
        config(storage_dir()),
        Arc::new(store),
        Arc::new(FixedClock::from_millis(1_704_067_200_000)),
    )
    .await
    .unwrap();
    let controller = core.controller();

    let song = controller
        .create_song(hotel_california(), Some(mp3("a.mp3")))
        .await
        .data
        .unwrap();
    assert_eq!(song.created_at, 1_704_067_200_000);

    let response = controller.delete_song(&song.id).await;
    assert_eq!(response.status_code, 500);
    assert_eq!(response.message, "Failed to delete file from object store");
    assert_eq!(response.timestamp, "2024-01-01T00:00:00.000Z");

    assert_eq!(controller.get_song(&song.id).await.status_code, 200);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let (core, _dir) = core().await;

    let response = core.controller().health();
    let health = response.data.unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.message, "Service is healthy");
    assert_eq!(health.status, "OK");
    assert!(health.uptime_seconds >= 0.0);
}

#[tokio::test]
async fn test_bootstrap_rejects_invalid_config() {
    let mut config = config(storage_dir());
    config.max_connections = 0;

    let result = CatalogCore::bootstrap(config).await;
    assert!(matches!(result, Err(core_service::CoreError::Runtime(_))));
}
