use std::sync::Arc;

use pilot_core::model::{CourseId, Email, Feedback, PilotState, User};
use storage::sqlite::SqliteKeyValueStore;
use storage::{KeyValueStore, STATE_KEY, Storage};

fn sample_state() -> PilotState {
    let email = Email::parse("a@x.com").unwrap();
    let mut user = User::new(email.clone(), Some("A"));
    user.enrol(&CourseId::new("m1"));
    user.enrolment_mut(&CourseId::new("m1"))
        .unwrap()
        .record_quiz(true);
    let mut state = PilotState::default();
    state.users.insert(email.clone(), user);
    state.current_user = Some(email);
    state
}

#[tokio::test]
async fn sqlite_state_round_trips() {
    let storage = Storage::sqlite("sqlite:file:memdb_state_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");

    assert_eq!(storage.state.load().await, PilotState::default());

    let state = sample_state();
    storage.state.save(&state).await.expect("save");
    let loaded = storage.state.load().await;
    assert_eq!(loaded, state);
    assert_eq!(
        loaded
            .current()
            .and_then(|user| user.enrolment(&CourseId::new("m1")))
            .map(|enrolment| enrolment.progress()),
        Some(40)
    );
}

#[tokio::test]
async fn sqlite_set_overwrites_single_row() {
    let store = SqliteKeyValueStore::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    store.migrate().await.expect("migrations are idempotent");

    store.set("k", "one").await.unwrap();
    store.set("k", "two").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);

    store.remove("k").await.unwrap();
    assert!(store.get("k").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_malformed_state_loads_empty() {
    let store = SqliteKeyValueStore::connect("sqlite:file:memdb_malformed?mode=memory&cache=shared")
        .await
        .expect("connect");
    store.migrate().await.expect("migrate");
    store.set(STATE_KEY, "{\"users\":").await.unwrap();

    let storage = Storage::from_store(Arc::new(store));
    assert_eq!(storage.state.load().await, PilotState::default());
}

#[tokio::test]
async fn sqlite_feedback_is_kept_separately_from_state() {
    let storage = Storage::sqlite("sqlite:file:memdb_feedback?mode=memory&cache=shared")
        .await
        .expect("connect");
    storage.state.save(&sample_state()).await.unwrap();
    storage
        .feedback
        .append(Feedback {
            name: "Ada".into(),
            email: "ada@x.com".into(),
            message: "More videos please".into(),
            date: "2023-11-14T22:13:20+00:00".into(),
        })
        .await
        .unwrap();

    assert_eq!(storage.feedback.entries().await.unwrap().len(), 1);
    assert_eq!(storage.state.load().await, sample_state());
}
