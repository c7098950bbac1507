use founders_route::inbox;
use founders_route::journal;
use founders_route::model::{Board, Column, Tag, TagColor, Task};
use founders_route::profile::Profile;
use founders_route::storage::{FileStore, KvStore, MemoryStore, StorageKey, Synced};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn arb_task(id: String) -> impl Strategy<Value = Task> {
    (
        "[a-zA-Z0-9 ]{1,20}",
        proptest::option::of("[A-Za-z]{1,6}"),
        prop::collection::vec(
            ("[a-z]{1,8}", proptest::option::of(prop::sample::select(TagColor::ALL.to_vec()))),
            0..3,
        ),
        proptest::option::of("[A-Z]{2}"),
        any::<bool>(),
    )
        .prop_map(move |(title, due, tags, avatar, active)| {
            let mut task = Task::with_id(id.clone(), title);
            task.due_date = due;
            task.tags = tags
                .into_iter()
                .map(|(label, color)| Tag { label, color })
                .collect();
            task.avatar = avatar;
            task.avatar_active = active;
            task
        })
}

fn arb_board() -> impl Strategy<Value = Board> {
    prop::collection::vec(0_usize..4, 1..4).prop_flat_map(|sizes| {
        let columns: Vec<_> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                (0..*size)
                    .map(|j| arb_task(format!("c{i}t{j}")))
                    .collect::<Vec<_>>()
            })
            .collect();
        columns.prop_map(|lists| {
            let mut board = Board::with_columns(
                (0..lists.len())
                    .map(|i| {
                        let id = format!("c{i}");
                        Column::new(&id, &format!("Column {i}"), None, Some("sky"))
                    })
                    .collect(),
            );
            for (i, tasks) in lists.into_iter().enumerate() {
                board.tasks.insert(format!("c{i}"), tasks);
            }
            board
        })
    })
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn board_serialization_is_stable(board in arb_board()) {
        let first = serde_json::to_string(&board).unwrap();
        let back: Board = serde_json::from_str(&first).unwrap();
        let second = serde_json::to_string(&back).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(back, board);
    }
}

#[test]
fn fresh_sessions_seed_identically() {
    let mut first = MemoryStore::new();
    let mut second = MemoryStore::new();
    let a = Synced::load(&mut first, StorageKey::Board, Board::seed);
    let b = Synced::load(&mut second, StorageKey::Board, Board::seed);
    assert_eq!(a.get(), b.get());
    assert_eq!(first.raw(StorageKey::Board), second.raw(StorageKey::Board));

    let books_a = Synced::load(&mut first, StorageKey::JournalBooks, journal::seed_books);
    let books_b = Synced::load(&mut second, StorageKey::JournalBooks, journal::seed_books);
    assert_eq!(books_a.get(), books_b.get());
}

#[test]
fn malformed_board_falls_back_to_seed() {
    let mut store = MemoryStore::new().with_entry(StorageKey::Board, "{\"columns\": [oops");
    let board = Synced::load(&mut store, StorageKey::Board, Board::seed);
    assert_eq!(board.get(), &Board::seed());
    let rewritten: Board = serde_json::from_str(store.raw(StorageKey::Board).unwrap()).unwrap();
    assert_eq!(rewritten, Board::seed());
}

#[test]
fn wrong_shape_is_treated_like_malformed() {
    let mut store = MemoryStore::new().with_entry(StorageKey::Inbox, "{\"not\": \"a list\"}");
    let items = Synced::load(&mut store, StorageKey::Inbox, inbox::seed);
    assert!(items.get().is_empty());
}

#[test]
fn loaded_data_is_not_rewritten() {
    let mut store = MemoryStore::new();
    Synced::load(&mut store, StorageKey::Board, Board::seed);
    let writes = store.writes();
    let again = Synced::load(&mut store, StorageKey::Board, Board::default);
    assert_eq!(again.get(), &Board::seed());
    assert_eq!(store.writes(), writes);
}

#[test]
fn failed_writes_keep_memory_authoritative() {
    let mut store = MemoryStore::read_only();
    let mut board = Synced::load(&mut store, StorageKey::Board, Board::seed);
    let removed = board.update(&mut store, |b| b.complete_task("seed-pitch"));
    assert!(removed.is_ok());
    assert!(board.get().task("seed-pitch").is_none());
    assert!(board.try_save(&mut store).is_err());
    assert!(store.raw(StorageKey::Board).is_none());
}

#[test]
fn file_store_round_trips_updates() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let mut store = FileStore::open(tmp.path()).unwrap();
        let mut board = Synced::load(&mut store, StorageKey::Board, Board::seed);
        board
            .update(&mut store, |b| b.add_task("waiting", Task::with_id("t-new", "Hear back")))
            .unwrap();
    }
    let mut store = FileStore::open(tmp.path()).unwrap();
    assert!(store.path_for("board").exists());
    assert!(!tmp.path().join(".board.json.tmp").exists());
    let board = Synced::load(&mut store, StorageKey::Board, Board::default);
    assert_eq!(board.get().tasks_in("waiting")[0].id, "t-new");
}

#[test]
fn file_store_missing_key_reads_as_none() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(tmp.path().join("nested")).unwrap();
    assert_eq!(store.get("inbox").unwrap(), None);
    store.set("inbox", "[]").unwrap();
    assert_eq!(store.get("inbox").unwrap().as_deref(), Some("[]"));
    store.remove("inbox").unwrap();
    store.remove("inbox").unwrap();
    assert_eq!(store.get("inbox").unwrap(), None);
}

#[test]
fn profile_keys_are_independent() {
    let mut store = MemoryStore::new();
    let mut profile = Profile::load(&mut store);
    assert_eq!(profile.greeting_name(), "Founder");
    assert!(!profile.privacy_accepted());
    profile.set_display_name(&mut store, "  Ada ");
    profile.accept_privacy(&mut store);

    let reloaded = Profile::load(&mut store);
    assert_eq!(reloaded.display_name(), Some("Ada"));
    assert!(reloaded.privacy_accepted());

    let mut cleared = reloaded;
    cleared.set_display_name(&mut store, "   ");
    assert_eq!(Profile::load(&mut store).display_name(), None);
}
