use chrono::NaiveDate;
use picday_core::db::open_db_in_memory;
use picday_core::{
    CoreConfig, EntryRepository, NavEffect, NavEvent, NavHost, NavHostError, NavigationState,
    RouteNode, SelectedDateCell, SqliteEntryRepository, Tab, WriteMode, WriteSessionError,
    WriteUiMode,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn host() -> NavHost {
    NavHost::new(&CoreConfig::default(), SelectedDateCell::default())
}

#[test]
fn write_route_gets_a_session_that_dies_with_it() {
    let mut host = host();
    assert_eq!(host.session_count(), 0);
    assert!(host.top_session().is_none());

    host.dispatch(NavEvent::CalendarDateSelected(date(2026, 1, 5), WriteMode::Add));
    let (first_id, session) = host.top_session().unwrap();
    assert_eq!(session.state().ui_mode(), WriteUiMode::Add);

    host.dispatch(NavEvent::WriteAddClick(date(2026, 1, 5)));
    let (second_id, _) = host.top_session().unwrap();
    assert_ne!(first_id, second_id);
    assert_eq!(host.session_count(), 2);

    host.dispatch(NavEvent::WriteBack);
    assert_eq!(host.top_session().unwrap().0, first_id);
    assert!(host.session(second_id).is_none());

    host.dispatch(NavEvent::BottomTabClick(Tab::Diary));
    assert_eq!(host.session_count(), 0);
    assert_eq!(host.state().back_stack, vec![RouteNode::Diary]);
}

#[test]
fn draft_survives_while_covered_by_another_route() {
    let mut host = host();
    host.dispatch(NavEvent::DiaryWriteClick(date(2026, 1, 5), WriteMode::Add));
    host.top_session_mut().unwrap().on_title_changed("half written");

    host.dispatch(NavEvent::WriteAddClick(date(2026, 1, 6)));
    host.dispatch(NavEvent::WriteBack);

    let (_, session) = host.top_session().unwrap();
    assert_eq!(session.state().title(), "half written");
}

#[test]
fn selected_date_is_broadcast_to_observers() {
    let cell = SelectedDateCell::default();
    let observer = cell.clone();
    let mut host = NavHost::new(&CoreConfig::default(), cell);
    let day = date(2026, 7, 14);

    host.dispatch(NavEvent::CalendarDateSelected(day, WriteMode::View));
    assert_eq!(observer.get(), Some(day));
    assert_eq!(host.selected_date().get(), Some(day));
}

#[test]
fn version_moves_only_on_effective_transitions() {
    let mut host = host();
    assert_eq!(host.version(), 0);

    assert!(host.dispatch(NavEvent::WriteBack).is_empty());
    assert!(host.dispatch(NavEvent::BottomTabClick(Tab::Calendar)).is_empty());
    assert!(host
        .dispatch(NavEvent::ProcessDeepLink(Some("garbage".to_string())))
        .is_empty());
    assert_eq!(host.version(), 0);

    host.dispatch(NavEvent::BottomTabClick(Tab::Diary));
    assert_eq!(host.version(), 1);
}

#[test]
fn edit_click_consumes_matching_pending_entry() {
    let mut host = host();
    let entry_id = Uuid::new_v4();
    host.set_pending_edit_entry(Some(entry_id));

    let effects = host.dispatch(NavEvent::DiaryEditClick(date(2026, 1, 22), entry_id));
    assert_eq!(effects.last(), Some(&NavEffect::ConsumeEditEntry(entry_id)));
    assert_eq!(host.pending_edit_entry(), None);

    let other = Uuid::new_v4();
    host.set_pending_edit_entry(Some(other));
    host.dispatch(NavEvent::WriteBack);
    host.dispatch(NavEvent::DiaryEditClick(date(2026, 1, 22), entry_id));
    assert_eq!(host.pending_edit_entry(), Some(other));
}

#[test]
fn deep_link_replaces_stack_and_drops_sessions() {
    let mut host = host();
    host.dispatch(NavEvent::CalendarDateSelected(date(2026, 1, 1), WriteMode::Add));
    assert_eq!(host.session_count(), 1);

    host.dispatch(NavEvent::ProcessDeepLink(Some(
        "app://picday.co/diary/2026-01-22".to_string(),
    )));
    assert_eq!(
        host.state().back_stack,
        vec![RouteNode::Calendar, RouteNode::Diary]
    );
    assert_eq!(host.selected_date().get(), Some(date(2026, 1, 22)));
    assert_eq!(host.session_count(), 0);
}

#[test]
fn save_top_persists_entry_stores_cover_and_pops() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);
    let mut host = host();

    host.dispatch(NavEvent::CalendarDateSelected(day, WriteMode::Add));
    let session = host.top_session_mut().unwrap();
    session.on_title_changed("Trip");
    session.on_photos_added(["content://last"]);
    session.on_photos_added(["content://first"]);

    let outcome = host.save_top(&repo, |_| {}).unwrap();
    let entry_id = outcome.entry_id.unwrap();

    assert_eq!(host.state().back_stack, vec![RouteNode::Calendar]);
    assert_eq!(host.session_count(), 0);
    assert_eq!(repo.get_by_id(entry_id).unwrap().unwrap().title, "Trip");
    assert_eq!(
        repo.date_cover(day).unwrap().as_deref(),
        Some("content://last")
    );
}

#[test]
fn load_edit_then_save_and_delete_through_host() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);
    let entry_id = repo
        .add_for_date(
            day,
            "t",
            "c",
            &["content://p1".to_string(), "content://p2".to_string()],
        )
        .unwrap();
    let mut host = host();

    host.dispatch(NavEvent::DiaryEditClick(day, entry_id));
    assert!(host.load_top_edit(&repo).unwrap());
    let session = host.top_session_mut().unwrap();
    assert_eq!(session.state().ui_mode(), WriteUiMode::Edit);
    let p1 = session.state().photo_items()[0].id();
    session.on_photo_removed(p1);

    let mut released = Vec::new();
    host.save_top(&repo, |uris| released.extend_from_slice(uris))
        .unwrap();
    assert_eq!(released, vec!["content://p1".to_string()]);
    let stored = repo
        .get_photos(entry_id)
        .unwrap()
        .into_iter()
        .map(|photo| photo.uri)
        .collect::<Vec<_>>();
    assert_eq!(stored, vec!["content://p2".to_string()]);

    host.dispatch(NavEvent::DiaryEditClick(day, entry_id));
    host.delete_top(&repo).unwrap();
    assert!(repo.get_by_id(entry_id).unwrap().is_none());
    assert_eq!(host.state().back_stack, vec![RouteNode::Calendar]);
}

#[test]
fn failed_save_leaves_stack_and_draft_untouched() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 1, 22);
    let mut host = host();

    host.dispatch(NavEvent::DiaryEditClick(day, Uuid::new_v4()));
    host.top_session_mut().unwrap().on_add_clicked();
    host.top_session_mut().unwrap().on_title_changed("draft");
    let version = host.version();

    conn.execute_batch("DROP TABLE entry_photos; DROP TABLE entries;")
        .unwrap();
    let err = host.save_top(&repo, |_| {}).unwrap_err();
    assert!(matches!(err, NavHostError::Session(WriteSessionError::Repo(_))));

    assert_eq!(host.version(), version);
    assert_eq!(host.state().back_stack.len(), 2);
    assert_eq!(host.top_session().unwrap().1.state().title(), "draft");
}

#[test]
fn write_operations_require_a_write_route() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let mut host = host();

    assert!(matches!(
        host.save_top(&repo, |_| {}),
        Err(NavHostError::NoActiveWrite)
    ));
    assert!(matches!(
        host.delete_top(&repo),
        Err(NavHostError::NoActiveWrite)
    ));

    host.dispatch(NavEvent::DiaryWriteClick(date(2026, 1, 1), WriteMode::Add));
    assert!(matches!(
        host.delete_top(&repo),
        Err(NavHostError::NoEditingEntry)
    ));
    assert!(!host.load_top_edit(&repo).unwrap());
}

#[test]
fn restoring_state_rebuilds_sessions_and_rejects_malformed_stacks() {
    let day = date(2026, 3, 3);
    let restored = NavigationState {
        back_stack: vec![
            RouteNode::Diary,
            RouteNode::write(day, WriteMode::Add, None),
        ],
        selected_date: Some(day),
    };
    let cell = SelectedDateCell::default();
    let host = NavHost::with_state(&CoreConfig::default(), restored.clone(), cell.clone());
    assert_eq!(host.state(), &restored);
    assert_eq!(host.session_count(), 1);
    assert_eq!(cell.get(), Some(day));

    let malformed = NavigationState {
        back_stack: vec![RouteNode::write(day, WriteMode::View, None)],
        selected_date: None,
    };
    let host = NavHost::with_state(&CoreConfig::default(), malformed, SelectedDateCell::default());
    assert_eq!(host.state(), &NavigationState::default());
    assert_eq!(host.session_count(), 0);
}

fn edit_and_remove_all_photos(
    host: &mut NavHost,
    repo: &SqliteEntryRepository<'_>,
    day: NaiveDate,
    entry_id: Uuid,
) -> Vec<String> {
    host.dispatch(NavEvent::DiaryEditClick(day, entry_id));
    assert!(host.load_top_edit(repo).unwrap());
    let session = host.top_session_mut().unwrap();
    let ids = session
        .state()
        .photo_items()
        .iter()
        .map(|item| item.id())
        .collect::<Vec<_>>();
    for id in ids {
        session.on_photo_removed(id);
    }

    let mut released = Vec::new();
    host.save_top(repo, |uris| released.extend_from_slice(uris))
        .unwrap();
    released
}

#[test]
fn saving_edit_without_photos_clears_cover() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 4, 1);
    let mut host = host();

    host.dispatch(NavEvent::CalendarDateSelected(day, WriteMode::Add));
    host.top_session_mut().unwrap().on_photos_added(["content://a"]);
    let entry_id = host.save_top(&repo, |_| {}).unwrap().entry_id.unwrap();
    assert_eq!(repo.date_cover(day).unwrap().as_deref(), Some("content://a"));

    let released = edit_and_remove_all_photos(&mut host, &repo, day, entry_id);
    assert_eq!(released, vec!["content://a".to_string()]);
    assert!(repo.get_photos(entry_id).unwrap().is_empty());
    assert_eq!(repo.date_cover(day).unwrap(), None);
}

#[test]
fn saving_edit_without_photos_falls_back_to_other_entry_of_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 4, 2);
    repo.add_for_date(
        day,
        "older",
        "",
        &["content://b1".to_string(), "content://b2".to_string()],
    )
    .unwrap();
    let edited = repo
        .add_for_date(day, "newer", "", &["content://a".to_string()])
        .unwrap();
    repo.set_date_cover(day, Some("content://a")).unwrap();
    let mut host = host();

    edit_and_remove_all_photos(&mut host, &repo, day, edited);
    assert_eq!(repo.date_cover(day).unwrap().as_deref(), Some("content://b2"));
}

#[test]
fn delete_top_recomputes_cover_and_reports_route_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();
    let day = date(2026, 4, 3);
    let older = repo
        .add_for_date(day, "older", "", &["content://b".to_string()])
        .unwrap();
    let newer = repo
        .add_for_date(day, "newer", "", &["content://a".to_string()])
        .unwrap();
    repo.set_date_cover(day, Some("content://a")).unwrap();
    let mut host = host();

    // Deleting straight from the route, without loading the draft first.
    host.dispatch(NavEvent::DiaryEditClick(day, newer));
    assert_eq!(host.delete_top(&repo).unwrap(), newer);
    assert_eq!(repo.date_cover(day).unwrap().as_deref(), Some("content://b"));

    host.dispatch(NavEvent::DiaryEditClick(day, older));
    assert_eq!(host.delete_top(&repo).unwrap(), older);
    assert!(repo.list_for_date(day).unwrap().is_empty());
    assert_eq!(repo.date_cover(day).unwrap(), None);
}
