use diesel::prelude::*;
use diesel::sql_types::Integer;

mod common;

#[derive(QueryableByName)]
struct Pragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

#[test]
fn test_creates_and_removes_db_files() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();
    let conn = pool.get();
    assert!(conn.is_ok());
}

#[test]
fn every_connection_enforces_foreign_keys() {
    let test_db = common::TestDb::new();
    let pool = test_db.pool();

    for _ in 0..3 {
        let mut conn = pool.get().expect("should acquire connection");
        let pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<Pragma>(&mut conn)
            .expect("should read pragma");
        assert_eq!(pragma.foreign_keys, 1);
    }
}

#[test]
fn migrations_are_idempotent() {
    let test_db = common::TestDb::new();
    let mut conn = test_db.pool().get().expect("should acquire connection");

    pushkind_catalog::db::run_migrations(&mut conn).expect("second run should be a no-op");
}
