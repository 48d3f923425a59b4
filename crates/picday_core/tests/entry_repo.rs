use chrono::NaiveDate;
use picday_core::db::open_db_in_memory;
use picday_core::{DateCover, EntryRepository, RepoError, SqliteEntryRepository};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn uris(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn add_then_read_back_entry_and_photo_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);

    let id = repo
        .add_for_date(day, "Beach", "Sunny", &uris(&["content://b", "content://a"]))
        .unwrap();

    let entry = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(entry.id, id);
    assert_eq!(entry.date, day);
    assert_eq!(entry.title, "Beach");
    assert_eq!(entry.content, "Sunny");
    assert!(entry.created_at > 0);

    let photos = repo.get_photos(id).unwrap();
    let ordered = photos
        .iter()
        .map(|photo| (photo.position, photo.uri.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(ordered, vec![(0, "content://b"), (1, "content://a")]);
}

#[test]
fn get_by_id_returns_none_for_unknown_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    assert!(repo.get_by_id(Uuid::new_v4()).unwrap().is_none());
    assert!(repo.get_photos(Uuid::new_v4()).unwrap().is_empty());
}

#[test]
fn update_reports_whether_entry_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let id = repo.add_for_date(date(2026, 1, 1), "t", "c", &[]).unwrap();

    assert!(repo.update(id, "new title", "new body").unwrap());
    let entry = repo.get_by_id(id).unwrap().unwrap();
    assert_eq!(entry.title, "new title");
    assert_eq!(entry.content, "new body");

    assert!(!repo.update(Uuid::new_v4(), "x", "y").unwrap());
}

#[test]
fn replace_photos_swaps_full_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let id = repo
        .add_for_date(date(2026, 1, 1), "", "", &uris(&["p1", "p2", "p3"]))
        .unwrap();

    repo.replace_photos(id, &uris(&["p3", "p1"])).unwrap();
    let stored = repo
        .get_photos(id)
        .unwrap()
        .into_iter()
        .map(|photo| photo.uri)
        .collect::<Vec<_>>();
    assert_eq!(stored, uris(&["p3", "p1"]));

    repo.replace_photos(id, &[]).unwrap();
    assert!(repo.get_photos(id).unwrap().is_empty());
}

#[test]
fn replace_photos_of_missing_entry_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo.replace_photos(missing, &uris(&["p"])).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_photos_and_tolerates_missing_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let id = repo
        .add_for_date(date(2026, 1, 1), "", "", &uris(&["p"]))
        .unwrap();

    repo.delete(id).unwrap();
    assert!(repo.get_by_id(id).unwrap().is_none());
    assert!(repo.get_photos(id).unwrap().is_empty());

    repo.delete(id).unwrap();
}

#[test]
fn list_for_date_filters_by_day() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);
    let first = repo.add_for_date(day, "first", "", &[]).unwrap();
    let second = repo.add_for_date(day, "second", "", &[]).unwrap();
    repo.add_for_date(date(2026, 1, 23), "other", "", &[]).unwrap();

    let ids = repo
        .list_for_date(day)
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![first, second]);
    assert!(repo.list_for_date(date(2026, 2, 1)).unwrap().is_empty());
}

#[test]
fn date_cover_upserts_and_clears() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);

    assert_eq!(repo.date_cover(day).unwrap(), None);
    repo.set_date_cover(day, Some("content://a")).unwrap();
    repo.set_date_cover(day, Some("content://b")).unwrap();
    assert_eq!(repo.date_cover(day).unwrap().as_deref(), Some("content://b"));

    repo.set_date_cover(day, None).unwrap();
    assert_eq!(repo.date_cover(day).unwrap(), None);
}

#[test]
fn list_date_covers_is_inclusive_and_ordered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    repo.set_date_cover(date(2026, 1, 31), Some("jan31")).unwrap();
    repo.set_date_cover(date(2026, 1, 1), Some("jan1")).unwrap();
    repo.set_date_cover(date(2026, 2, 1), Some("feb1")).unwrap();

    let covers = repo
        .list_date_covers(date(2026, 1, 1), date(2026, 1, 31))
        .unwrap();
    assert_eq!(
        covers,
        vec![
            DateCover {
                date: date(2026, 1, 1),
                uri: "jan1".to_string(),
            },
            DateCover {
                date: date(2026, 1, 31),
                uri: "jan31".to_string(),
            },
        ]
    );

    assert!(repo
        .list_date_covers(date(2026, 2, 2), date(2026, 1, 1))
        .unwrap()
        .is_empty());
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let result = SqliteEntryRepository::try_new(&conn);
    assert!(result.is_err());
}
