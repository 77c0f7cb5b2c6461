use nomis_core::db::open_db_in_memory;
use nomis_core::{
    GroupRepository, GroupService, RepoError, ServiceError, SqliteGroupRepository,
    SqliteUserRepository, User, UserRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn service(conn: &Connection) -> GroupService<SqliteGroupRepository<'_>, SqliteUserRepository<'_>> {
    GroupService::new(
        SqliteGroupRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
}

fn register(conn: &Connection, id: &str, email: &str) {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    users.create_user(&User::new(id, id, email)).unwrap();
}

#[test]
fn owner_is_first_member_of_new_group() {
    let conn = open_db_in_memory().unwrap();
    let groups = service(&conn);

    let group = groups.create_group("alice", "  Flat 4B  ").unwrap();
    assert_eq!(group.name, "Flat 4B");
    assert_eq!(group.owner, "alice");
    assert_eq!(group.members, vec!["alice".to_string()]);

    let loaded = groups.select_group("alice", group.id).unwrap();
    assert_eq!(loaded, group);
}

#[test]
fn create_group_rejects_blank_name_and_owner() {
    let conn = open_db_in_memory().unwrap();
    let groups = service(&conn);

    assert!(matches!(
        groups.create_group("alice", "   "),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        groups.create_group(" ", "Trip"),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn list_groups_only_returns_memberships() {
    let conn = open_db_in_memory().unwrap();
    let groups = service(&conn);

    let first = groups.create_group("alice", "Home").unwrap();
    let second = groups.create_group("alice", "Trip").unwrap();
    groups.create_group("bob", "Bob only").unwrap();

    let listed: Vec<Uuid> = groups
        .list_groups("alice")
        .unwrap()
        .into_iter()
        .map(|group| group.id)
        .collect();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&first.id));
    assert!(listed.contains(&second.id));
    assert!(groups.list_groups("carol").unwrap().is_empty());
}

#[test]
fn members_can_invite_by_email_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "alice", "alice@example.com");
    register(&conn, "bob", "Bob@Example.com");
    let groups = service(&conn);

    let group = groups.create_group("alice", "Home").unwrap();
    let updated = groups
        .add_member_by_email("alice", group.id, " bob@example.COM ")
        .unwrap();
    assert_eq!(updated.members, vec!["alice".to_string(), "bob".to_string()]);

    let again = groups
        .add_member_by_email("bob", group.id, "bob@example.com")
        .unwrap();
    assert_eq!(again.members.len(), 2);

    let bob_groups = groups.list_groups("bob").unwrap();
    assert_eq!(bob_groups.len(), 1);
    assert_eq!(bob_groups[0].id, group.id);
}

#[test]
fn inviting_unknown_email_fails() {
    let conn = open_db_in_memory().unwrap();
    let groups = service(&conn);
    let group = groups.create_group("alice", "Home").unwrap();

    let err = groups
        .add_member_by_email("alice", group.id, "ghost@example.com")
        .unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound(_)));
}

#[test]
fn non_members_cannot_see_or_change_group() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "mallory", "mallory@example.com");
    let groups = service(&conn);
    let group = groups.create_group("alice", "Home").unwrap();

    assert!(matches!(
        groups.select_group("mallory", group.id),
        Err(ServiceError::PermissionDenied(_))
    ));
    assert!(matches!(
        groups.add_member_by_email("mallory", group.id, "mallory@example.com"),
        Err(ServiceError::PermissionDenied(_))
    ));
    assert!(matches!(
        groups.select_group("alice", Uuid::new_v4()),
        Err(ServiceError::GroupNotFound(_))
    ));
}

#[test]
fn only_owner_can_delete_group() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "bob", "bob@example.com");
    let groups = service(&conn);
    let group = groups.create_group("alice", "Home").unwrap();
    groups
        .add_member_by_email("alice", group.id, "bob@example.com")
        .unwrap();

    assert!(matches!(
        groups.delete_group("bob", group.id),
        Err(ServiceError::PermissionDenied(_))
    ));
    groups.delete_group("alice", group.id).unwrap();
    assert!(matches!(
        groups.select_group("alice", group.id),
        Err(ServiceError::GroupNotFound(_))
    ));
    assert!(groups.list_groups("bob").unwrap().is_empty());
}

#[test]
fn repository_reports_missing_group_on_add_member() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGroupRepository::try_new(&conn).unwrap();

    let err = repo.add_member(Uuid::new_v4(), "bob").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
}

#[test]
fn duplicate_user_email_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let users = SqliteUserRepository::try_new(&conn).unwrap();
    users
        .create_user(&User::new("u1", "One", "same@example.com"))
        .unwrap();

    let err = users
        .create_user(&User::new("u2", "Two", "SAME@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn corrupt_user_row_is_reported_on_read() {
    let conn = open_db_in_memory().unwrap();
    register(&conn, "u1", "one@example.com");
    conn.execute("UPDATE users SET email = 'not-an-email' WHERE id = 'u1';", [])
        .unwrap();

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    assert!(matches!(
        users.get_user("u1").unwrap_err(),
        RepoError::InvalidData(_)
    ));
    assert!(matches!(
        users.find_user_by_email("NOT-AN-EMAIL").unwrap_err(),
        RepoError::InvalidData(_)
    ));
}
