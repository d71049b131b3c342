use chrono::NaiveDate;
use sea_orm::Database;

use migration::MigratorTrait;
use store::{DEFAULT_CATEGORY, NewRecord, RecordKind, Store, StoreError};

async fn store_with_db() -> Store {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Store::new(db)
}

fn entry(date: &str, description: &str, amount: f64, who: &str) -> NewRecord {
    NewRecord {
        date: date.to_string(),
        description: description.to_string(),
        amount,
        who: who.to_string(),
        category: DEFAULT_CATEGORY.to_string(),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[tokio::test]
async fn insert_then_list_recent_round_trips() {
    let store = store_with_db().await;

    let id = store
        .insert(RecordKind::Income, entry("05.12.2023", "Зарплата", 50000.0, "Я"))
        .await
        .unwrap();
    assert!(id > 0);

    let records = store.list_recent(RecordKind::Income, 10).await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.id, id);
    assert_eq!(record.date, "05.12.2023");
    assert_eq!(record.description, "Зарплата");
    assert_eq!(record.who, "Я");
    assert_eq!(record.category, DEFAULT_CATEGORY);
    assert!((record.amount - 50000.0).abs() < 1e-9);
}

#[tokio::test]
async fn statistics_report_the_inserted_payer() {
    let store = store_with_db().await;
    store
        .insert(RecordKind::Income, entry("05.12.2023", "Зарплата", 50000.0, "Я"))
        .await
        .unwrap();

    let by_payer = store.sum_by_payer(RecordKind::Income, None).await.unwrap();
    assert_eq!(by_payer.len(), 1);
    assert_eq!(by_payer[0].group, "Я");
    assert!((by_payer[0].total - 50000.0).abs() < 1e-9);
    assert_eq!(by_payer[0].count, 1);
}

#[tokio::test]
async fn update_replaces_fields_and_preserves_id_and_created_at() {
    let store = store_with_db().await;
    let id = store
        .insert(RecordKind::Expense, entry("25.12.2023", "Продукты", 100.0, "Маша"))
        .await
        .unwrap();

    let before = store
        .get_by_id(RecordKind::Expense, id)
        .await
        .unwrap()
        .unwrap();

    let rows = store
        .update_by_id(
            RecordKind::Expense,
            id,
            NewRecord {
                date: "26.12.2023".to_string(),
                description: "Техника".to_string(),
                amount: 45000.0,
                who: "Я".to_string(),
                category: "Техника".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let after = store
        .get_by_id(RecordKind::Expense, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.date, "26.12.2023");
    assert_eq!(after.description, "Техника");
    assert_eq!(after.who, "Я");
    assert_eq!(after.category, "Техника");
    assert!((after.amount - 45000.0).abs() < 1e-9);
}

#[tokio::test]
async fn updating_a_missing_id_affects_zero_rows() {
    let store = store_with_db().await;
    let rows = store
        .update_by_id(
            RecordKind::Income,
            999,
            entry("01.01.2024", "Ничего", 1.0, "Я"),
        )
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn deleting_twice_reports_zero_the_second_time() {
    let store = store_with_db().await;
    let id = store
        .insert(RecordKind::Expense, entry("25.12.2023", "Продукты", 100.0, "Я"))
        .await
        .unwrap();

    assert_eq!(store.delete_by_id(RecordKind::Expense, id).await.unwrap(), 1);
    assert_eq!(store.delete_by_id(RecordKind::Expense, id).await.unwrap(), 0);
}

#[tokio::test]
async fn balance_is_income_minus_expense() {
    let store = store_with_db().await;
    store
        .insert(RecordKind::Income, entry("01.03.2024", "Зарплата", 1000.5, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Income, entry("02.03.2024", "Подработка", 2000.25, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("03.03.2024", "Продукты", 500.25, "Маша"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("04.03.2024", "Кофе", 100.0, "Я"))
        .await
        .unwrap();

    let (income_sum, income_count) = store.totals(RecordKind::Income).await.unwrap();
    let (expense_sum, expense_count) = store.totals(RecordKind::Expense).await.unwrap();

    assert_eq!(income_count, 2);
    assert_eq!(expense_count, 2);
    assert_eq!(income_sum, 3000.75);
    assert_eq!(expense_sum, 600.25);
    assert_eq!(income_sum - expense_sum, 2400.5);
}

#[tokio::test]
async fn sweep_deletes_exactly_the_previous_month() {
    let store = store_with_db().await;
    for kind in [RecordKind::Expense, RecordKind::Income] {
        store
            .insert(kind, entry("05.02.2024", "Прошлый месяц", 10.0, "Я"))
            .await
            .unwrap();
        store
            .insert(kind, entry("25.02.2024", "Прошлый месяц", 20.0, "Я"))
            .await
            .unwrap();
        store
            .insert(kind, entry("15.03.2024", "Текущий месяц", 30.0, "Я"))
            .await
            .unwrap();
        store
            .insert(kind, entry("10.01.2024", "Позапрошлый месяц", 40.0, "Я"))
            .await
            .unwrap();
    }

    let report = store.sweep_previous_month(date(2024, 3, 5)).await;
    assert_eq!(report.pattern, "%.02.2024");
    assert_eq!(report.expenses_deleted, Some(2));
    assert_eq!(report.incomes_deleted, Some(2));

    for kind in [RecordKind::Expense, RecordKind::Income] {
        let dates: Vec<String> = store
            .list_recent(kind, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.date)
            .collect();
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&"15.03.2024".to_string()));
        assert!(dates.contains(&"10.01.2024".to_string()));
    }
}

#[tokio::test]
async fn list_recent_orders_by_date_then_id_descending() {
    let store = store_with_db().await;
    let first = store
        .insert(RecordKind::Expense, entry("25.12.2023", "Старое", 1.0, "Я"))
        .await
        .unwrap();
    let second = store
        .insert(RecordKind::Expense, entry("26.12.2023", "Новое", 2.0, "Я"))
        .await
        .unwrap();
    let third = store
        .insert(RecordKind::Expense, entry("26.12.2023", "Ещё новее", 3.0, "Я"))
        .await
        .unwrap();

    let ids: Vec<i64> = store
        .list_recent(RecordKind::Expense, 10)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![third, second, first]);

    let limited = store.list_recent(RecordKind::Expense, 2).await.unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn month_filter_limits_totals() {
    let store = store_with_db().await;
    store
        .insert(RecordKind::Expense, entry("05.02.2024", "Февраль", 100.0, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("05.03.2024", "Март", 50.0, "Я"))
        .await
        .unwrap();

    let (sum, count) = store
        .totals_where_date_like(RecordKind::Expense, "%.02.2024")
        .await
        .unwrap();
    assert_eq!(sum, 100.0);
    assert_eq!(count, 1);
}

#[tokio::test]
async fn daily_totals_group_by_day_of_month() {
    let store = store_with_db().await;
    store
        .insert(RecordKind::Expense, entry("05.02.2024", "Продукты", 100.0, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("05.02.2024", "Кофе", 50.0, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("10.02.2024", "Кино", 25.0, "Я"))
        .await
        .unwrap();
    store
        .insert(RecordKind::Expense, entry("10.03.2024", "Другой месяц", 999.0, "Я"))
        .await
        .unwrap();

    let days = store
        .daily_totals(RecordKind::Expense, "%.02.2024")
        .await
        .unwrap();
    assert_eq!(days, vec![(5, 150.0), (10, 25.0)]);
}

#[tokio::test]
async fn categories_aggregate_separately() {
    let store = store_with_db().await;
    let mut groceries = entry("05.02.2024", "Продукты", 100.0, "Я");
    groceries.category = "Продукты".to_string();
    store.insert(RecordKind::Expense, groceries).await.unwrap();
    store
        .insert(RecordKind::Expense, entry("06.02.2024", "Прочее", 50.0, "Я"))
        .await
        .unwrap();

    let categories = store.sum_by_category(RecordKind::Expense).await.unwrap();
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].group, "Продукты");
    assert_eq!(categories[0].total, 100.0);
    assert_eq!(categories[1].group, DEFAULT_CATEGORY);
    assert_eq!(categories[1].total, 50.0);
}

#[tokio::test]
async fn insert_rejects_non_positive_amounts() {
    let store = store_with_db().await;
    let result = store
        .insert(RecordKind::Expense, entry("05.02.2024", "Ноль", 0.0, "Я"))
        .await;
    assert!(matches!(result, Err(StoreError::InvalidAmount(_))));

    let result = store
        .insert(RecordKind::Expense, entry("05.02.2024", "Минус", -5.0, "Я"))
        .await;
    assert!(matches!(result, Err(StoreError::InvalidAmount(_))));
}

#[tokio::test]
async fn deletes_on_both_tables_are_independent() {
    let store = store_with_db().await;
    store
        .insert(RecordKind::Income, entry("05.02.2024", "Доход", 10.0, "Я"))
        .await
        .unwrap();

    // No expense rows at all: the expense delete still reports cleanly and
    // the income delete proceeds.
    let report = store.sweep_previous_month(date(2024, 3, 5)).await;
    assert_eq!(report.expenses_deleted, Some(0));
    assert_eq!(report.incomes_deleted, Some(1));
    assert_eq!(report.deleted(), 1);
}
