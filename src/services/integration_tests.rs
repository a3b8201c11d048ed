// Integration tests for the service layer
//
// Real implementations against temporary directories; unit tests elsewhere
// use the mocks.
//
// Usage:
//     cargo test --lib services::integration_tests

#[cfg(test)]
mod integration {
    use crate::agenda::{Agenda, NewAgendaItem, TriggeredAlarms};
    use crate::services::traits::*;
    use crate::services::*;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_agenda_round_trips_through_storage() {
        let temp_dir = TempDir::new().unwrap();
        let fs = Arc::new(RealFileSystem);
        let storage = FileStorageService::new(fs, temp_dir.path().to_path_buf());

        let now = Utc::now();
        let mut agenda = Agenda::default();
        let id = agenda.add(NewAgendaItem::new("Standup", now + Duration::hours(1)));
        agenda.add(NewAgendaItem::new("Gym", now + Duration::hours(3)));

        storage
            .set_items(&[
                (
                    "smart_plan_agenda_data".to_string(),
                    serde_json::to_string(agenda.items()).unwrap(),
                ),
                (
                    "smart_plan_triggered_alarms".to_string(),
                    serde_json::to_string(agenda.triggered()).unwrap(),
                ),
            ])
            .await
            .unwrap();

        let raw_items = storage.get_item("smart_plan_agenda_data").await.unwrap().unwrap();
        let raw_triggered = storage
            .get_item("smart_plan_triggered_alarms")
            .await
            .unwrap()
            .unwrap();

        let loaded = Agenda::from_parts(
            serde_json::from_str(&raw_items).unwrap(),
            serde_json::from_str::<TriggeredAlarms>(&raw_triggered).unwrap(),
            now,
        );
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get(&id).unwrap().title, "Standup");
        assert!(loaded.triggered().is_empty());
    }

    #[tokio::test]
    async fn test_storage_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let base_path = temp_dir.path().to_path_buf();

        {
            let storage = FileStorageService::new(Arc::new(RealFileSystem), base_path.clone());
            storage.set_item("smart_plan_active_view", "studio").await.unwrap();
            storage.set_item("smart_plan_auth", "true").await.unwrap();
            storage.remove_item("smart_plan_auth").await.unwrap();
        }

        let storage = FileStorageService::new(Arc::new(RealFileSystem), base_path);
        assert_eq!(
            storage.get_item("smart_plan_active_view").await.unwrap(),
            Some("studio".to_string())
        );
        assert_eq!(storage.get_item("smart_plan_auth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_all_kept() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorageService::new(
            Arc::new(RealFileSystem),
            temp_dir.path().to_path_buf(),
        ));

        let mut handles = vec![];
        for i in 0..10 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage
                    .set_item(&format!("key_{}", i), &format!("value {}", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // A fresh instance reads from disk, not the cache
        let reloaded =
            FileStorageService::new(Arc::new(RealFileSystem), temp_dir.path().to_path_buf());
        for i in 0..10 {
            assert_eq!(
                reloaded.get_item(&format!("key_{}", i)).await.unwrap(),
                Some(format!("value {}", i))
            );
        }
    }

    #[tokio::test]
    async fn test_video_bytes_written_under_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let fs = RealFileSystem;
        let videos = temp_dir.path().join("videos");

        fs.create_dir_all(&videos).await.unwrap();
        let file = videos.join("veo-video-1700000000000.mp4");
        fs.write_bytes(&file, &[0, 0, 0, 24, b'f', b't', b'y', b'p']).await.unwrap();

        assert!(fs.exists(&file).await);
        assert_eq!(fs.read(&file).await.unwrap().len(), 8);
    }
}
