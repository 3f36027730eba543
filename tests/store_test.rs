mod common;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use common::{linked_user, playlist};
use spotmix::{
    error::{Error, Result},
    store::{DefinitionStore, JsonStore, MemoryStore, PlaylistChange, UserStore},
    types::{LastRun, Playlist, RunStatus, User},
};
use tempfile::TempDir;

fn change(edit: impl FnOnce(&mut Playlist) -> Result<()> + Send + 'static) -> PlaylistChange {
    Box::new(edit)
}

fn create_test_store() -> (JsonStore, TempDir) {
    let dir = TempDir::new().unwrap();
    (JsonStore::new(dir.path()), dir)
}

#[tokio::test]
async fn test_empty_store() {
    let (store, _dir) = create_test_store();

    assert!(store.list("alice").await.unwrap().is_empty());
    assert!(store.get("alice", "mix").await.unwrap().is_none());
    assert!(store.get_user("alice").await.unwrap().is_none());
    assert!(store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_definitions_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = JsonStore::new(dir.path());
        store
            .upsert("alice", playlist("mix", &["p1"], &["other"], None))
            .await
            .unwrap();
        store
            .upsert("alice", playlist("other", &["p2"], &[], None))
            .await
            .unwrap();
    }

    let reopened = JsonStore::new(dir.path());
    let names: Vec<String> = reopened
        .list("alice")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["mix", "other"]);

    let mix = reopened.get("alice", "mix").await.unwrap().unwrap();
    assert_eq!(mix, playlist("mix", &["p1"], &["other"], None));
    assert!(
        dir.path()
            .join("users")
            .join("alice")
            .join("playlists.json")
            .exists()
    );
}

#[tokio::test]
async fn test_namespaces_are_separate() {
    let (store, _dir) = create_test_store();
    store
        .upsert("alice", playlist("mix", &["p1"], &[], None))
        .await
        .unwrap();

    assert!(store.get("bob", "mix").await.unwrap().is_none());
    assert!(!store.delete("bob", "mix").await.unwrap());
    assert!(store.delete("alice", "mix").await.unwrap());
    assert!(store.list("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_run_only_touches_last_run() {
    let (store, _dir) = create_test_store();
    let mut mix = playlist("mix", &["p1"], &[], Some("spotify:playlist:dest"));
    mix.shuffle = true;
    store.upsert("alice", mix.clone()).await.unwrap();

    store
        .record_run("alice", "mix", LastRun::success(Utc::now(), 12))
        .await
        .unwrap();

    let stored = store.get("alice", "mix").await.unwrap().unwrap();
    assert_eq!(stored.last_run.status, RunStatus::Success);
    assert_eq!(stored.last_run.message.as_deref(), Some("published 12 tracks"));
    assert_eq!(
        stored,
        spotmix::types::Playlist {
            last_run: stored.last_run.clone(),
            ..mix
        }
    );

    let err = store
        .record_run("alice", "ghost", LastRun::failed(Utc::now(), "boom"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn test_users_are_listed_sorted() {
    let (store, _dir) = create_test_store();
    store.save_user(User::new("zoe")).await.unwrap();
    store.save_user(linked_user("adam")).await.unwrap();

    let users = store.list_users().await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["adam", "zoe"]);

    let adam = store.get_user("adam").await.unwrap().unwrap();
    assert!(adam.spotify_linked);
    assert_eq!(adam.token.unwrap().refresh_token, "refresh");
}

#[tokio::test]
async fn test_path_like_usernames_are_rejected() {
    let (store, _dir) = create_test_store();

    for username in ["", "../escape", ".hidden", "a/b"] {
        assert!(
            matches!(
                store.get_user(username).await,
                Err(Error::InvalidInput(_))
            ),
            "{username:?} accepted"
        );
    }
}

#[tokio::test]
async fn test_update_edits_in_place() {
    let (store, _dir) = create_test_store();
    store
        .upsert("alice", playlist("mix", &["p1"], &[], None))
        .await
        .unwrap();

    let updated = store
        .update(
            "alice",
            "mix",
            change(|playlist| {
                playlist.shuffle = true;
                Ok(())
            }),
        )
        .await
        .unwrap();
    assert!(updated);
    assert!(store.get("alice", "mix").await.unwrap().unwrap().shuffle);

    let missing = store
        .update("alice", "ghost", change(|_| Ok(())))
        .await
        .unwrap();
    assert!(!missing);
}

#[tokio::test]
async fn test_failed_update_writes_nothing() {
    let (store, _dir) = create_test_store();
    let mix = playlist("mix", &["p1"], &[], None);
    store.upsert("alice", mix.clone()).await.unwrap();

    let err = store
        .update(
            "alice",
            "mix",
            change(|playlist| {
                playlist.shuffle = true;
                Err(Error::invalid_input("no changes to make"))
            }),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(store.get("alice", "mix").await.unwrap().unwrap(), mix);
}

/// Starts a slow edit, records a run while it is in progress and checks that
/// both changes survive.
async fn check_update_keeps_concurrent_run_outcome(store: Arc<dyn DefinitionStore>) {
    store
        .upsert("alice", playlist("mix", &["p1"], &[], None))
        .await
        .unwrap();

    let editing = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            store
                .update(
                    "alice",
                    "mix",
                    change(|playlist| {
                        std::thread::sleep(Duration::from_millis(50));
                        playlist.shuffle = true;
                        Ok(())
                    }),
                )
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    store
        .record_run("alice", "mix", LastRun::success(Utc::now(), 3))
        .await
        .unwrap();
    assert!(editing.await.unwrap().unwrap());

    let stored = store.get("alice", "mix").await.unwrap().unwrap();
    assert!(stored.shuffle);
    assert_eq!(stored.last_run.status, RunStatus::Success);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_json_update_keeps_concurrent_run_outcome() {
    let (store, _dir) = create_test_store();
    check_update_keeps_concurrent_run_outcome(Arc::new(store)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_memory_update_keeps_concurrent_run_outcome() {
    check_update_keeps_concurrent_run_outcome(Arc::new(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_unreadable_user_does_not_hide_others() {
    let (store, dir) = create_test_store();
    store.save_user(linked_user("adam")).await.unwrap();

    let broken = dir.path().join("users").join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("user.json"), "{ not json").unwrap();

    let users = store.list_users().await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["adam"]);

    assert!(store.get_user("broken").await.is_err());
}
