use coffee_core::db::open_db_in_memory;
use coffee_core::{
    run_demo, AppConfig, Coffee, CoffeeService, CurrencyUnit, SqliteCoffeeRepository,
};

fn minor_prices(records: &[Coffee]) -> Vec<(&str, i64)> {
    records
        .iter()
        .map(|coffee| (coffee.name.as_str(), coffee.price.amount_minor()))
        .collect()
}

#[test]
fn demo_walkthrough_inserts_sorts_reprices_queries_and_clears() {
    let conn = open_db_in_memory().unwrap();
    let config = AppConfig::default();
    let repo = SqliteCoffeeRepository::try_new(&conn, config.money_codec()).unwrap();
    let service = CoffeeService::new(repo);

    let report = run_demo(&service, CurrencyUnit::TWD).unwrap();

    assert_eq!(report.inserted.len(), 2);
    assert!(report.inserted.iter().all(|coffee| coffee.id.is_some()));
    assert_eq!(
        minor_prices(&report.sorted),
        [("espresso", 10_000), ("latte", 15_000)]
    );

    assert_eq!(report.repriced.name, "latte");
    assert_eq!(report.repriced.price.amount_minor(), 17_500);

    assert_eq!(report.found.len(), 1);
    let latte = &report.found[0];
    assert_eq!(latte.price.amount_minor(), 17_500);
    assert_eq!(latte.price.currency(), CurrencyUnit::TWD);
    assert!(latte.update_time > latte.create_time);
    assert_eq!(latte.id, report.repriced.id);

    assert_eq!(report.remaining, 0);
}

#[test]
fn demo_runs_in_configured_currency() {
    let conn = open_db_in_memory().unwrap();
    let config = AppConfig {
        currency: CurrencyUnit::USD,
        ..AppConfig::default()
    };
    let repo = SqliteCoffeeRepository::try_new(&conn, config.money_codec()).unwrap();
    let service = CoffeeService::new(repo);

    let report = run_demo(&service, config.currency).unwrap();
    assert!(report
        .found
        .iter()
        .all(|coffee| coffee.price.currency() == CurrencyUnit::USD));
    assert_eq!(report.repriced.price.to_string(), "USD 175.00");
}
