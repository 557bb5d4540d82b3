//! Reconciler driving a live server over HTTP

use std::sync::Arc;

use todo_core::{HttpRemoteStore, MemoryStorage, Reconciler, RemoteStore, Source, SyncPath, TodoId};
use todo_server::{serve_on, AppState};

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::in_memory().unwrap());
    tokio::spawn(async move {
        let _ = serve_on(listener, state).await;
    });
    format!("http://{}", addr)
}

/// A URL nothing is listening on
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn create_then_load_from_server() {
    let url = spawn_server().await;
    let mut reconciler = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());

    let applied = reconciler.create("Buy milk", None).await.unwrap();
    assert_eq!(applied.path, SyncPath::Remote);
    let item = applied.item.unwrap();
    assert_eq!(item.id, TodoId::Remote(1));
    assert_eq!(item.text, "Buy milk");
    assert!(!item.completed);

    reconciler.create("Walk dog", None).await.unwrap();

    let mut fresh = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());
    let applied = fresh.load().await.unwrap();
    assert_eq!(applied.path, SyncPath::Remote);
    assert_eq!(fresh.view().source(), Source::Remote);
    let texts: Vec<_> = fresh.view().items().iter().map(|i| i.text.as_str()).collect();
    assert_eq!(texts, ["Walk dog", "Buy milk"]);
}

#[tokio::test]
async fn toggle_and_edit_round_trip() {
    let url = spawn_server().await;
    let mut reconciler = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());
    let id = reconciler.create("Buy milk", None).await.unwrap().item.unwrap().id;

    let applied = reconciler.toggle(&id).await.unwrap();
    assert_eq!(applied.path, SyncPath::Remote);
    assert!(applied.item.unwrap().completed);

    let applied = reconciler.edit(&id, "Buy oat milk").await.unwrap();
    assert_eq!(applied.path, SyncPath::Remote);

    let remote = HttpRemoteStore::new(&url);
    let items = remote.list().await.unwrap();
    assert_eq!(items[0].text, "Buy oat milk");
    assert!(items[0].completed);
}

#[tokio::test]
async fn delete_twice_is_harmless() {
    let url = spawn_server().await;
    let mut reconciler = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());
    let id = reconciler.create("Buy milk", None).await.unwrap().item.unwrap().id;

    reconciler.delete(&id).await.unwrap();
    assert!(reconciler.view().is_empty());

    let applied = reconciler.delete(&id).await.unwrap();
    assert!(applied.changes.is_empty());
    assert!(HttpRemoteStore::new(&url).list().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_completed_reaches_server() {
    let url = spawn_server().await;
    let mut reconciler = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());
    let done = reconciler.create("done", None).await.unwrap().item.unwrap().id;
    reconciler.create("open", None).await.unwrap();
    reconciler.toggle(&done).await.unwrap();

    reconciler.clear_completed().await.unwrap();

    let items = HttpRemoteStore::new(&url).list().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "open");
    assert_eq!(reconciler.view().len(), 1);
}

#[tokio::test]
async fn unreachable_server_falls_back_to_cache() {
    let url = dead_url().await;
    let mut reconciler = Reconciler::new(HttpRemoteStore::new(&url), MemoryStorage::new());

    let applied = reconciler.create("Offline task", None).await.unwrap();
    assert_eq!(applied.path, SyncPath::Local);
    let item = applied.item.unwrap();
    assert!(item.id.is_local());
    assert_eq!(item.date, None);

    let applied = reconciler.load().await.unwrap();
    assert_eq!(applied.path, SyncPath::Local);
    assert_eq!(reconciler.view().source(), Source::Cache);
    assert_eq!(reconciler.view().items()[0].text, "Offline task");
}
