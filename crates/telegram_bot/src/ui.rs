//! Keyboards, callback data and message rendering.

use store::{GroupTotal, Record, RecordKind, format_amount};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

pub(crate) const BTN_STATS: &str = "📊 Статистика";
pub(crate) const BTN_REPORT: &str = "📋 Отчёт";
pub(crate) const BTN_ADD_EXPENSE: &str = "💸 Добавить трату";
pub(crate) const BTN_ADD_INCOME: &str = "💰 Добавить доход";
pub(crate) const BTN_MY_EXPENSES: &str = "✏️ Мои траты";
pub(crate) const BTN_MY_INCOMES: &str = "🗂️ Мои доходы";
pub(crate) const BTN_BALANCE: &str = "📈 Баланс";
pub(crate) const BTN_CURRENT_MONTH: &str = "📅 Текущий месяц";
pub(crate) const BTN_PREV_MONTH: &str = "📅 Прошлый месяц";
pub(crate) const BTN_CLEANUP: &str = "🗑️ Очистить прошлый месяц";
pub(crate) const BTN_RESET: &str = "🔄 Сбросить меню";
pub(crate) const BTN_BACK: &str = "⬅️ Назад";

pub(crate) const ACCESS_DENIED: &str = "❌ Доступ запрещен!\n\n\
    Это приватный бот для учета расходов. \
    Если вы должны иметь доступ, обратитесь к администратору.";

pub(crate) const HELP: &str = "Формат ввода:\n\
    <code>Дата | На что | Сумма | Кто</code>\n\
    Опционально: категория пятым полем.\n\n\
    Пример:\n\
    <code>26.12.2023 | Продукты | 2500,75 | Маша | Продукты</code>\n\n\
    Команды: /start — сбросить состояние и показать меню.";

pub(crate) fn welcome(first_name: &str) -> String {
    format!(
        "💰 Привет, {first_name}!\n\nЭто приватный бот для учёта финансов.\n\n\
         Формат ввода:\n<code>Дата | На что | Сумма | Кто</code>\n\
         Опционально: добавить категорию\n\n\
         Пример:\n<code>25.12.2023 | Продажа ноутбука | 45000 | Я | Техника</code>\n\
         <code>26.12.2023 | Продукты | 2500,75 | Маша | Продукты</code>\n\n\
         Запись попадёт в таблицу доходов или расходов в зависимости от выбранной кнопки."
    )
}

pub(crate) fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(BTN_STATS),
            KeyboardButton::new(BTN_REPORT),
        ],
        vec![
            KeyboardButton::new(BTN_ADD_EXPENSE),
            KeyboardButton::new(BTN_ADD_INCOME),
        ],
        vec![
            KeyboardButton::new(BTN_MY_EXPENSES),
            KeyboardButton::new(BTN_MY_INCOMES),
        ],
        vec![KeyboardButton::new(BTN_BALANCE)],
        vec![
            KeyboardButton::new(BTN_CURRENT_MONTH),
            KeyboardButton::new(BTN_PREV_MONTH),
        ],
        vec![
            KeyboardButton::new(BTN_CLEANUP),
            KeyboardButton::new(BTN_RESET),
        ],
    ])
    .resize_keyboard()
}

pub(crate) fn balance_period_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new(BTN_CURRENT_MONTH),
            KeyboardButton::new(BTN_PREV_MONTH),
        ],
        vec![KeyboardButton::new(BTN_BACK)],
    ])
    .resize_keyboard()
}

/// Per-record edit/delete keyboard. Callback data follows the
/// `action_kind_id` convention, e.g. `edit_expense_12`.
pub(crate) fn record_actions(kind: RecordKind, id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("✏️ Изменить", format!("edit_{}_{id}", kind.as_str())),
            InlineKeyboardButton::callback("❌ Удалить", format!("delete_{}_{id}", kind.as_str())),
        ],
        vec![InlineKeyboardButton::callback(BTN_BACK, "back_to_list")],
    ])
}

pub(crate) fn chart_button(month: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "📈 Показать график",
        format!("chart_{month}"),
    )]])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecordAction {
    Edit,
    Delete,
}

pub(crate) fn parse_record_action(data: &str) -> Option<(RecordAction, RecordKind, i64)> {
    let (action, rest) = if let Some(rest) = data.strip_prefix("edit_") {
        (RecordAction::Edit, rest)
    } else if let Some(rest) = data.strip_prefix("delete_") {
        (RecordAction::Delete, rest)
    } else {
        return None;
    };

    let (kind, id) = rest.split_once('_')?;
    let kind = RecordKind::try_from(kind).ok()?;
    let id = id.parse().ok()?;
    Some((action, kind, id))
}

pub(crate) fn render_record_line(record: &Record) -> String {
    format!(
        "#{} {} | {} | {} | {} | {}",
        record.id,
        record.date,
        record.description,
        format_amount(record.amount),
        record.who,
        record.category,
    )
}

pub(crate) fn records_header(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Expense => "✏️ Последние траты:",
        RecordKind::Income => "🗂️ Последние доходы:",
    }
}

pub(crate) fn empty_records(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Expense => "Трат пока нет.",
        RecordKind::Income => "Доходов пока нет.",
    }
}

pub(crate) fn render_statistics(
    expenses_by_payer: &[GroupTotal],
    incomes_by_payer: &[GroupTotal],
    expense_totals: (f64, i64),
    income_totals: (f64, i64),
    expense_categories: &[GroupTotal],
) -> String {
    let mut text = String::from("📊 Статистика\n");

    text.push_str("\n💸 Траты по людям:\n");
    push_group_lines(&mut text, expenses_by_payer);
    text.push_str("\n💰 Доходы по людям:\n");
    push_group_lines(&mut text, incomes_by_payer);

    let (expense_sum, expense_count) = expense_totals;
    let (income_sum, income_count) = income_totals;
    text.push_str(&format!(
        "\nИтого трат: {} ({expense_count} зап.)\nИтого доходов: {} ({income_count} зап.)\n\
         📈 Баланс: {}\n",
        format_amount(expense_sum),
        format_amount(income_sum),
        format_amount(income_sum - expense_sum),
    ));

    if !expense_categories.is_empty() && expense_sum > 0.0 {
        text.push_str("\n🗂️ Траты по категориям:\n");
        for group in expense_categories {
            let share = group.total / expense_sum * 100.0;
            text.push_str(&format!(
                "  {} — {} ({share:.1}%)\n",
                group.group,
                format_amount(group.total),
            ));
        }
    }

    text
}

fn push_group_lines(text: &mut String, groups: &[GroupTotal]) {
    if groups.is_empty() {
        text.push_str("  (записей нет)\n");
        return;
    }
    for group in groups {
        text.push_str(&format!(
            "  {} — {} ({} зап.)\n",
            group.group,
            format_amount(group.total),
            group.count,
        ));
    }
}

pub(crate) fn render_report(records: &[(RecordKind, Record)]) -> String {
    if records.is_empty() {
        return String::from("Записей пока нет.");
    }

    let mut text = String::from("📋 Последние записи:\n");
    for (kind, record) in records {
        let marker = match kind {
            RecordKind::Expense => "💸",
            RecordKind::Income => "💰",
        };
        text.push_str(&format!("{marker} {}\n", render_record_line(record)));
    }
    text
}

pub(crate) fn render_month_balance(month: &str, income: (f64, i64), expense: (f64, i64)) -> String {
    format!(
        "📅 {month}\n💰 Доходы: {} ({} зап.)\n💸 Траты: {} ({} зап.)\n📈 Баланс: {}",
        format_amount(income.0),
        income.1,
        format_amount(expense.0),
        expense.1,
        format_amount(income.0 - expense.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_action_data_round_trips() {
        assert_eq!(
            parse_record_action("edit_expense_12"),
            Some((RecordAction::Edit, RecordKind::Expense, 12))
        );
        assert_eq!(
            parse_record_action("delete_income_3"),
            Some((RecordAction::Delete, RecordKind::Income, 3))
        );
    }

    #[test]
    fn rejects_malformed_action_data() {
        assert_eq!(parse_record_action("edit_refund_12"), None);
        assert_eq!(parse_record_action("edit_expense_abc"), None);
        assert_eq!(parse_record_action("back_to_list"), None);
    }

    #[test]
    fn statistics_show_balance_and_shares() {
        let expenses = vec![GroupTotal {
            group: "Маша".to_string(),
            total: 2500.75,
            count: 1,
        }];
        let incomes = vec![GroupTotal {
            group: "Я".to_string(),
            total: 50000.0,
            count: 1,
        }];
        let categories = vec![GroupTotal {
            group: "Продукты".to_string(),
            total: 2500.75,
            count: 1,
        }];

        let text = render_statistics(
            &expenses,
            &incomes,
            (2500.75, 1),
            (50000.0, 1),
            &categories,
        );

        assert!(text.contains("Я — 50000.00 (1 зап.)"));
        assert!(text.contains("Баланс: 47499.25"));
        assert!(text.contains("Продукты — 2500.75 (100.0%)"));
    }
}
