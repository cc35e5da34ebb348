use coffee_core::db::migrations::latest_version;
use coffee_core::db::open_db_in_memory;
use coffee_core::{
    CodecError, Coffee, CoffeeRepository, CoffeeService, CurrencyUnit, Money, MoneyCodec,
    RepoError, Sort, SqliteCoffeeRepository,
};
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

fn twd(minor: i64) -> Money {
    Money::of_minor(minor, "TWD").unwrap()
}

fn codec() -> MoneyCodec {
    MoneyCodec::single_currency(CurrencyUnit::TWD)
}

fn names(records: &[Coffee]) -> Vec<&str> {
    records.iter().map(|coffee| coffee.name.as_str()).collect()
}

#[test]
fn insert_all_assigns_ids_and_find_by_id_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();

    let saved = repo
        .insert_all(vec![
            Coffee::new("espresso", twd(10_000)),
            Coffee::new("latte", twd(15_000)),
        ])
        .unwrap();

    assert_eq!(saved.len(), 2);
    let id = saved[1].id.unwrap();
    assert_ne!(saved[0].id, saved[1].id);

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, saved[1]);
    assert_eq!(loaded.price.amount_minor(), 15_000);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn find_all_sorts_by_field_in_both_directions() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![
        Coffee::new("latte", twd(15_000)),
        Coffee::new("espresso", twd(10_000)),
        Coffee::new("mocha", twd(12_000)),
    ])
    .unwrap();

    let by_name = repo.find_all(&Sort::by("name")).unwrap();
    assert_eq!(names(&by_name), ["espresso", "latte", "mocha"]);

    let by_price_desc = repo.find_all(&Sort::by("price").descending()).unwrap();
    assert_eq!(names(&by_price_desc), ["latte", "mocha", "espresso"]);
}

#[test]
fn find_all_breaks_ties_by_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![
        Coffee::new("b-first", twd(100)),
        Coffee::new("a-second", twd(100)),
        Coffee::new("c-third", twd(100)),
    ])
    .unwrap();

    let by_price = repo.find_all(&Sort::by("price")).unwrap();
    assert_eq!(names(&by_price), ["b-first", "a-second", "c-third"]);
}

#[test]
fn unknown_sort_or_filter_field_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();

    let err = repo.find_all(&Sort::by("flavour")).unwrap_err();
    assert!(matches!(err, RepoError::UnknownField(field) if field == "flavour"));

    let err = repo.find_by_field("name; DROP TABLE coffee", "x").unwrap_err();
    assert!(matches!(err, RepoError::UnknownField(_)));
}

#[test]
fn find_by_field_matches_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![
        Coffee::new("latte", twd(15_000)),
        Coffee::new("iced latte", twd(16_000)),
        Coffee::new("Latte", twd(15_500)),
    ])
    .unwrap();

    let found = repo.find_by_field("name", "latte").unwrap();
    assert_eq!(names(&found), ["latte"]);
    assert!(repo.find_by_field("name", "flat white").unwrap().is_empty());
}

#[test]
fn find_by_field_rejects_numeric_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let saved = repo
        .insert_all(vec![Coffee::new("latte", twd(15_000))])
        .unwrap();

    for (field, value) in [
        ("price", "15000".to_string()),
        ("createTime", saved[0].create_time.to_string()),
        ("updateTime", saved[0].update_time.to_string()),
    ] {
        let err = repo.find_by_field(field, &value).unwrap_err();
        assert!(matches!(err, RepoError::NonTextField(name) if name == field));
    }

    let id = saved[0].id.unwrap().to_string();
    assert_eq!(names(&repo.find_by_field("id", &id).unwrap()), ["latte"]);
}

#[test]
fn price_sort_orders_legacy_and_integer_documents_by_amount() {
    let conn = open_db_in_memory().unwrap();
    let legacy_id = Uuid::new_v4();
    insert_raw(
        &conn,
        legacy_id,
        json!({
            "id": legacy_id.to_string(),
            "name": "cheap-legacy",
            "price": { "amount": 1.00, "currency": "TWD" },
            "createTime": 1,
            "updateTime": 1,
        }),
    );
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![
        Coffee::new("pricey-new", twd(50_000)),
        Coffee::new("tied-new", twd(100)),
    ])
    .unwrap();

    let ascending = repo.find_all(&Sort::by("price")).unwrap();
    assert_eq!(
        names(&ascending),
        ["cheap-legacy", "tied-new", "pricey-new"]
    );

    let descending = repo.find_all(&Sort::by("price").descending()).unwrap();
    assert_eq!(
        names(&descending),
        ["pricey-new", "cheap-legacy", "tied-new"]
    );
}

#[test]
fn save_upserts_existing_and_inserts_new() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let mut latte = repo
        .insert_all(vec![Coffee::new("latte", twd(15_000))])
        .unwrap()
        .remove(0);

    latte.reprice(twd(17_500));
    let updated = repo.save(&latte).unwrap();
    assert_eq!(updated.id, latte.id);
    assert_eq!(repo.count().unwrap(), 1);

    let stored = repo.find_by_id(latte.id.unwrap()).unwrap().unwrap();
    assert_eq!(stored.price.amount_minor(), 17_500);
    assert!(stored.update_time > stored.create_time);

    let inserted = repo.save(&Coffee::new("cortado", twd(13_000))).unwrap();
    assert!(inserted.id.is_some());
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn save_keeps_insertion_position_for_tie_breaks() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let mut saved = repo
        .insert_all(vec![
            Coffee::new("first", twd(100)),
            Coffee::new("second", twd(100)),
        ])
        .unwrap();

    saved[0].name = "first-renamed".to_string();
    repo.save(&saved[0]).unwrap();

    let by_price = repo.find_all(&Sort::by("price")).unwrap();
    assert_eq!(names(&by_price), ["first-renamed", "second"]);
}

#[test]
fn insert_all_with_duplicate_id_is_rejected_atomically() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let existing = repo
        .insert_all(vec![Coffee::new("espresso", twd(10_000))])
        .unwrap()
        .remove(0);
    let existing_id = existing.id.unwrap();

    let mut clash = Coffee::new("latte", twd(15_000));
    clash.id = Some(existing_id);
    let err = repo
        .insert_all(vec![Coffee::new("mocha", twd(12_000)), clash])
        .unwrap_err();

    assert!(matches!(err, RepoError::DuplicateKey(id) if id == existing_id));
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn validation_failure_blocks_insert_and_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();

    let err = repo
        .insert_all(vec![
            Coffee::new("espresso", twd(10_000)),
            Coffee::new(" ", twd(1)),
        ])
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count().unwrap(), 0);

    let mut reversed = Coffee::new("latte", twd(15_000));
    reversed.update_time = reversed.create_time - 1;
    assert!(matches!(
        repo.save(&reversed).unwrap_err(),
        RepoError::Validation(_)
    ));
}

#[test]
fn delete_by_id_and_delete_all() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let saved = repo
        .insert_all(vec![
            Coffee::new("espresso", twd(10_000)),
            Coffee::new("latte", twd(15_000)),
            Coffee::new("mocha", twd(12_000)),
        ])
        .unwrap();

    repo.delete_by_id(saved[0].id.unwrap()).unwrap();
    assert_eq!(repo.count().unwrap(), 2);

    let missing = Uuid::new_v4();
    let err = repo.delete_by_id(missing).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));

    repo.delete_all().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
    assert!(repo.find_all(&Sort::by("name")).unwrap().is_empty());
}

#[test]
fn legacy_structured_price_documents_are_readable() {
    let conn = open_db_in_memory().unwrap();
    let id = Uuid::new_v4();
    insert_raw(
        &conn,
        id,
        json!({
            "id": id.to_string(),
            "name": "espresso",
            "price": { "amount": 100.00, "currency": "TWD" },
            "createTime": 1_700_000_000_000_i64,
            "updateTime": 1_700_000_000_000_i64,
        }),
    );
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![Coffee::new("latte", twd(15_000))])
        .unwrap();

    let all = repo.find_all(&Sort::by("name")).unwrap();
    assert_eq!(names(&all), ["espresso", "latte"]);
    assert_eq!(all[0].price, twd(10_000));

    repo.save(&all[0]).unwrap();
    let rewritten: i64 = conn
        .query_row(
            "SELECT json_extract(document, '$.price') FROM coffee WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rewritten, 10_000);
}

#[test]
fn malformed_price_fails_the_whole_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    repo.insert_all(vec![Coffee::new("latte", twd(15_000))])
        .unwrap();

    let id = Uuid::new_v4();
    insert_raw(
        &conn,
        id,
        json!({
            "id": id.to_string(),
            "name": "espresso",
            "price": "one hundred",
            "createTime": 1,
            "updateTime": 1,
        }),
    );

    let err = repo.find_all(&Sort::by("name")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Codec(CodecError::MalformedMoneyField { shape: "string" })
    ));
    assert!(matches!(
        repo.find_by_id(id).unwrap_err(),
        RepoError::Codec(CodecError::MalformedMoneyField { .. })
    ));
}

#[test]
fn document_with_mismatched_row_id_is_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let row_id = Uuid::new_v4();
    insert_raw(
        &conn,
        row_id,
        json!({
            "id": Uuid::new_v4().to_string(),
            "name": "espresso",
            "price": 10_000,
            "createTime": 1,
            "updateTime": 1,
        }),
    );

    assert!(matches!(
        repo.find_by_id(row_id).unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn service_wraps_repository_calls() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCoffeeRepository::try_new(&conn, codec()).unwrap();
    let service = CoffeeService::new(repo);

    let mut menu = service
        .create_menu(vec![
            Coffee::new("latte", twd(15_000)),
            Coffee::new("espresso", twd(10_000)),
        ])
        .unwrap();
    assert_eq!(
        names(&service.menu_sorted_by_name().unwrap()),
        ["espresso", "latte"]
    );

    let before = menu[0].update_time;
    let saved = service.reprice(&mut menu[0], twd(17_500)).unwrap();
    assert!(menu[0].update_time > before);
    assert_eq!(saved, menu[0]);

    let found = service.find_by_name("latte").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].price.amount_minor(), 17_500);

    service.clear().unwrap();
    assert_eq!(service.count().unwrap(), 0);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCoffeeRepository::try_new(&conn, codec()) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_coffee_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCoffeeRepository::try_new(&conn, codec());
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("coffee"))
    ));
}

#[test]
fn repository_rejects_coffee_table_missing_document_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE coffee (seq INTEGER PRIMARY KEY, id TEXT NOT NULL);")
        .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCoffeeRepository::try_new(&conn, codec());
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "coffee",
            column: "document"
        })
    ));
}

fn insert_raw(conn: &Connection, id: Uuid, document: serde_json::Value) {
    conn.execute(
        "INSERT INTO coffee (id, document) VALUES (?1, ?2);",
        [id.to_string(), document.to_string()],
    )
    .unwrap();
}
