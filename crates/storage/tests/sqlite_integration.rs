use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::{QuestionFormat, QuestionId, RoundState, StudyProfile};
use quiz_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;
use storage::{ProgressStore, ROUND_STATE_KEY};

#[tokio::test]
async fn sqlite_kv_upserts_and_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Running migrations twice is a no-op.
    repo.migrate().await.expect("migrate again");

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("a", "1").await.unwrap();
    repo.set("a", "2").await.unwrap();
    assert_eq!(repo.get("a").await.unwrap().as_deref(), Some("2"));

    repo.remove("a").await.unwrap();
    assert_eq!(repo.get("a").await.unwrap(), None);
}

#[tokio::test]
async fn progress_store_persists_round_state_in_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress?mode=memory&cache=shared")
        .await
        .expect("sqlite storage");
    let store = ProgressStore::new(Arc::clone(&storage.kv));

    let state = RoundState {
        round_number: 3,
        selected_question_ids: vec![QuestionId::new(1), QuestionId::new(2)],
        progress: 1,
        completed_rounds: 2,
        total_answered: 8,
        total_correct: 6,
        formats: BTreeMap::from([
            (QuestionId::new(1), QuestionFormat::Completed),
            (QuestionId::new(2), QuestionFormat::Flashcard),
        ]),
        started_at: Some(fixed_now()),
        ..RoundState::default()
    };
    store.save(&state).await.unwrap();

    let profile = StudyProfile::new(
        Some("State University".into()),
        "Biology",
        "Final exam",
        vec!["Cells".to_string(), "Genetics".to_string()],
    )
    .unwrap();
    store.save_profile(&profile).await.unwrap();

    let reopened = ProgressStore::new(Arc::clone(&storage.kv));
    assert_eq!(reopened.load().await.unwrap(), state);
    assert_eq!(reopened.load_profile().await.unwrap(), Some(profile));
}

#[tokio::test]
async fn corrupt_sqlite_value_is_repaired_on_load() {
    let storage = Storage::sqlite("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("sqlite storage");
    storage
        .kv
        .set(
            ROUND_STATE_KEY,
            r#"{"round_number": "NaN", "progress": -1, "selected_question_ids": [4]}"#,
        )
        .await
        .unwrap();

    let state = ProgressStore::new(Arc::clone(&storage.kv)).load().await.unwrap();
    assert_eq!(state.round_number, 1);
    assert_eq!(state.progress, 0);
    assert_eq!(state.selected_question_ids, vec![QuestionId::new(4)]);
}
