use nomis_core::db::open_db_in_memory;
use nomis_core::{
    Category, CategoryColor, CategoryService, GroupService, NewCategory, ServiceError,
    SqliteCategoryRepository, SqliteGroupRepository, SqliteUserRepository, TransactionKind,
    OTHER_CATEGORY_ID,
};
use rusqlite::Connection;
use uuid::Uuid;

fn category_service(
    conn: &Connection,
) -> CategoryService<SqliteCategoryRepository<'_>, SqliteGroupRepository<'_>> {
    CategoryService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteGroupRepository::try_new(conn).unwrap(),
    )
}

fn new_group(conn: &Connection, owner: &str) -> Uuid {
    GroupService::new(
        SqliteGroupRepository::try_new(conn).unwrap(),
        SqliteUserRepository::try_new(conn).unwrap(),
    )
    .create_group(owner, "Home")
    .unwrap()
    .id
}

fn draft(id: Option<&str>, name: &str, color: &str) -> NewCategory {
    NewCategory {
        id: id.map(str::to_string),
        name: name.to_string(),
        icon: "pawprint".to_string(),
        color_hex: color.to_string(),
    }
}

#[test]
fn defaults_are_listed_before_custom_categories() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    categories
        .add_category("alice", group_id, draft(Some("pets"), "Pets", "#a1b2c3"))
        .unwrap();

    let listed = categories.list_categories("alice", group_id).unwrap();
    let ids: Vec<&str> = listed.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "food",
            "transport",
            "entertainment",
            "shopping",
            "salary",
            "investment",
            "other",
            "pets"
        ]
    );
    let pets = listed.last().unwrap();
    assert_eq!(pets.color.as_str(), "#A1B2C3");
    assert_eq!(pets.group_id, Some(group_id));
}

#[test]
fn generated_id_and_default_color_when_omitted() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    let created = categories
        .add_category("alice", group_id, draft(None, "Gifts", ""))
        .unwrap();
    assert!(Uuid::parse_str(&created.id).is_ok());
    assert_eq!(created.color, CategoryColor::default());
}

#[test]
fn invalid_color_and_blank_name_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    assert!(matches!(
        categories.add_category("alice", group_id, draft(None, "Gifts", "red")),
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        categories.add_category("alice", group_id, draft(None, "  ", "#000000")),
        Err(ServiceError::Validation(_))
    ));
}

#[test]
fn default_categories_are_immutable() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    assert!(matches!(
        categories.add_category("alice", group_id, draft(Some("food"), "Food", "")),
        Err(ServiceError::DefaultCategoryImmutable(_))
    ));
    assert!(matches!(
        categories.delete_category("alice", group_id, "salary"),
        Err(ServiceError::DefaultCategoryImmutable(_))
    ));
    let mut food = Category::default_by_id("food").unwrap();
    food.name = "Groceries".to_string();
    food.group_id = Some(group_id);
    assert!(matches!(
        categories.update_category("alice", &food),
        Err(ServiceError::DefaultCategoryImmutable(_))
    ));
}

#[test]
fn update_and_delete_custom_category() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    let mut pets = categories
        .add_category("alice", group_id, draft(Some("pets"), "Pets", "#112233"))
        .unwrap();
    pets.name = "Pet care".to_string();
    categories.update_category("alice", &pets).unwrap();

    let found = categories.find_category(group_id, "pets").unwrap().unwrap();
    assert_eq!(found.name, "Pet care");

    categories.delete_category("alice", group_id, "pets").unwrap();
    assert!(categories.find_category(group_id, "pets").unwrap().is_none());
    assert!(matches!(
        categories.delete_category("alice", group_id, "pets"),
        Err(ServiceError::CategoryNotFound(_))
    ));
}

#[test]
fn unknown_categories_resolve_to_other() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    let resolved = categories.resolve_category(group_id, "vanished").unwrap();
    assert_eq!(resolved.id, OTHER_CATEGORY_ID);
    assert_eq!(
        categories.resolve_category(group_id, "food").unwrap().id,
        "food"
    );
}

#[test]
fn custom_categories_are_scoped_to_their_group() {
    let conn = open_db_in_memory().unwrap();
    let home = new_group(&conn, "alice");
    let trip = new_group(&conn, "alice");
    let categories = category_service(&conn);

    categories
        .add_category("alice", home, draft(Some("pets"), "Pets", ""))
        .unwrap();
    categories
        .add_category("alice", trip, draft(Some("pets"), "Pets abroad", ""))
        .unwrap();

    assert_eq!(
        categories.find_category(home, "pets").unwrap().unwrap().name,
        "Pets"
    );
    assert_eq!(
        categories.find_category(trip, "pets").unwrap().unwrap().name,
        "Pets abroad"
    );
}

#[test]
fn income_entries_offer_income_categories() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    let income: Vec<String> = categories
        .categories_for_kind("alice", group_id, TransactionKind::Income)
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(income, vec!["salary", "investment", "other"]);
}

#[test]
fn outsiders_cannot_manage_categories() {
    let conn = open_db_in_memory().unwrap();
    let group_id = new_group(&conn, "alice");
    let categories = category_service(&conn);

    assert!(matches!(
        categories.list_categories("mallory", group_id),
        Err(ServiceError::PermissionDenied(_))
    ));
    assert!(matches!(
        categories.add_category("mallory", group_id, draft(None, "Spy", "")),
        Err(ServiceError::PermissionDenied(_))
    ));
}
