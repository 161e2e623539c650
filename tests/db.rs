use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::Text;

mod common;

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

#[test]
fn migrations_create_all_tables() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should get connection");

    let tables: Vec<String> = sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '\\_\\_%' ESCAPE '\\' ORDER BY name",
    )
    .load::<TableName>(&mut conn)
    .expect("should list tables")
    .into_iter()
    .map(|t| t.name)
    .filter(|name| name != "sqlite_sequence")
    .collect();

    assert_eq!(tables, vec!["listings", "matches", "notifications"]);
}

#[test]
fn pair_index_rejects_reversed_duplicates() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should get connection");

    sql_query(
        "INSERT INTO listings (id, owner_id, name, item_type) VALUES (1, 1, 'kayak', 'have'), (2, 2, 'kayak', 'need')",
    )
    .execute(&mut conn)
    .expect("should insert listings");
    sql_query(
        "INSERT INTO matches (listing_a_id, listing_b_id, pair_low, pair_high, similarity_score) VALUES (1, 2, 1, 2, 90.0)",
    )
    .execute(&mut conn)
    .expect("should insert match");

    let duplicate = sql_query(
        "INSERT INTO matches (listing_a_id, listing_b_id, pair_low, pair_high, similarity_score) VALUES (2, 1, 1, 2, 90.0)",
    )
    .execute(&mut conn);

    assert!(matches!(
        duplicate,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        ))
    ));
}
