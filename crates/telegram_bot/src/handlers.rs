//! Update handlers: menu dispatch, wizard/edit input, callbacks.

use chrono::Datelike;
use store::{
    NewRecord, Record, RecordKind, StoreError, format_amount,
    retention::{Clock, SystemClock, previous_month},
};
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile, ParseMode},
};

use crate::{
    ConfigParameters, access, parsing,
    state::{MenuScreen, Mode},
    ui,
    wizard::{StepOutcome, Wizard},
};

const RECENT_LIMIT: u64 = 10;

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    let user_id = msg.from.as_ref().map(|user| user.id.0 as i64);
    if !access::is_allowed(cfg.allowed_ids.as_deref(), user_id, chat_id.0) {
        bot.send_message(chat_id, ui::ACCESS_DENIED).await?;
        return Ok(());
    }

    // Serialize handling per chat: a second message from the same chat
    // waits until the first one has finished its store round-trip.
    let _gate = cfg.sessions.lock_chat(chat_id).await;

    let Some(text) = msg.text() else {
        return Ok(());
    };

    if let Some(cmd) = parse_command(text) {
        match cmd {
            Command::Start => {
                cfg.sessions.clear(chat_id).await;
                cfg.sessions
                    .update(chat_id, |s| s.push_menu(MenuScreen::Main))
                    .await;

                let name = msg
                    .from
                    .as_ref()
                    .map(|user| user.first_name.as_str())
                    .unwrap_or("Пользователь");
                bot.send_message(chat_id, ui::welcome(name))
                    .parse_mode(ParseMode::Html)
                    .reply_markup(ui::main_menu())
                    .await?;
            }
            Command::Help => {
                bot.send_message(chat_id, ui::HELP)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
        }
        return Ok(());
    }

    match text {
        ui::BTN_STATS => show_statistics(&bot, chat_id, &cfg).await,
        ui::BTN_REPORT => show_report(&bot, chat_id, &cfg).await,
        ui::BTN_ADD_EXPENSE => start_wizard(&bot, chat_id, &cfg, RecordKind::Expense).await,
        ui::BTN_ADD_INCOME => start_wizard(&bot, chat_id, &cfg, RecordKind::Income).await,
        ui::BTN_MY_EXPENSES => show_records(&bot, chat_id, &cfg, RecordKind::Expense).await,
        ui::BTN_MY_INCOMES => show_records(&bot, chat_id, &cfg, RecordKind::Income).await,
        ui::BTN_BALANCE => show_balance_periods(&bot, chat_id, &cfg).await,
        ui::BTN_CURRENT_MONTH => {
            show_month_balance(&bot, chat_id, &cfg, current_month_key()).await
        }
        ui::BTN_PREV_MONTH => show_month_balance(&bot, chat_id, &cfg, previous_month_key()).await,
        ui::BTN_CLEANUP => manual_cleanup(&bot, chat_id, &cfg).await,
        ui::BTN_RESET => {
            cfg.sessions.clear(chat_id).await;
            bot.send_message(chat_id, "Меню сброшено. Используйте /start для показа кнопок.")
                .await?;
            Ok(())
        }
        ui::BTN_BACK => go_back(&bot, chat_id, &cfg).await,
        _ => handle_free_text(&bot, chat_id, &cfg, text).await,
    }
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    if !access::is_allowed(
        cfg.allowed_ids.as_deref(),
        Some(q.from.id.0 as i64),
        chat_id.0,
    ) {
        return Ok(());
    }

    let _gate = cfg.sessions.lock_chat(chat_id).await;
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };

    if data == "back_to_list" {
        let session = cfg.sessions.get(chat_id).await;
        if let Mode::Browsing { kind } = session.mode {
            render_records(&bot, chat_id, &cfg, kind).await?;
        } else {
            render_screen(&bot, chat_id, MenuScreen::Main).await?;
        }
    } else if data == "back_to_main" {
        cfg.sessions.clear(chat_id).await;
        render_screen(&bot, chat_id, MenuScreen::Main).await?;
    } else if let Some(month) = data.strip_prefix("chart_") {
        send_month_chart(&bot, chat_id, &cfg, month).await?;
    } else if let Some((action, kind, id)) = ui::parse_record_action(data) {
        match action {
            ui::RecordAction::Edit => begin_edit(&bot, chat_id, &cfg, kind, id).await?,
            ui::RecordAction::Delete => delete_record(&bot, chat_id, &cfg, kind, id).await?,
        }
    }

    Ok(())
}

/// Free text that is not a command or a menu button: wizard input, an edit
/// replacement line, or the idle pipe-delimited fast path.
async fn handle_free_text(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    text: &str,
) -> ResponseResult<()> {
    let session = cfg.sessions.get(chat_id).await;

    match session.mode {
        Mode::Collecting(wizard) => match wizard.advance(text) {
            StepOutcome::Next(wizard) => {
                let prompt = wizard.prompt();
                cfg.sessions
                    .update(chat_id, |s| s.enter_mode(Mode::Collecting(wizard)))
                    .await;
                bot.send_message(chat_id, prompt).await?;
                Ok(())
            }
            StepOutcome::Retry(wizard, hint) => {
                cfg.sessions
                    .update(chat_id, |s| s.enter_mode(Mode::Collecting(wizard)))
                    .await;
                bot.send_message(chat_id, hint).await?;
                Ok(())
            }
            StepOutcome::Done(kind, record) => {
                cfg.sessions
                    .update(chat_id, |s| s.enter_mode(Mode::Idle))
                    .await;
                insert_and_reply(bot, chat_id, cfg, kind, record).await
            }
        },
        Mode::Editing { kind, id } => match parsing::parse_entry_line(text) {
            Ok(record) => {
                match cfg.store.update_by_id(kind, id, record).await {
                    Ok(0) => {
                        cfg.sessions
                            .update(chat_id, |s| s.enter_mode(Mode::Idle))
                            .await;
                        bot.send_message(chat_id, "Запись не найдена — возможно, она уже удалена.")
                            .await?;
                    }
                    Ok(_) => {
                        cfg.sessions
                            .update(chat_id, |s| s.enter_mode(Mode::Idle))
                            .await;
                        bot.send_message(chat_id, format!("✅ Запись #{id} обновлена."))
                            .await?;
                    }
                    // Storage failure: report and keep the edit mode so the
                    // user can retry the same line.
                    Err(err) => send_store_error(bot, chat_id, &err).await?,
                }
                Ok(())
            }
            Err(err) => {
                bot.send_message(
                    chat_id,
                    format!(
                        "Не получилось разобрать строку: {err}.\n\
                         Формат: Дата | Описание | Сумма | Кто | Категория (опционально)"
                    ),
                )
                .await?;
                Ok(())
            }
        },
        Mode::Idle | Mode::Browsing { .. } => {
            if parsing::looks_like_entry_line(text) {
                match parsing::parse_entry_line(text) {
                    Ok(record) => {
                        insert_and_reply(bot, chat_id, cfg, session.entry_kind, record).await
                    }
                    Err(err) => {
                        bot.send_message(chat_id, format!("Не получилось разобрать строку: {err}."))
                            .await?;
                        Ok(())
                    }
                }
            } else {
                bot.send_message(
                    chat_id,
                    "Не понял. Используйте кнопки меню или формат:\n\
                     Дата | Описание | Сумма | Кто",
                )
                .await?;
                Ok(())
            }
        }
    }
}

async fn start_wizard(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
) -> ResponseResult<()> {
    let wizard = Wizard::new(kind);
    let prompt = wizard.prompt();
    cfg.sessions
        .update(chat_id, |s| {
            s.entry_kind = kind;
            s.enter_mode(Mode::Collecting(wizard));
        })
        .await;

    let intro = match kind {
        RecordKind::Expense => "💸 Новая трата.",
        RecordKind::Income => "💰 Новый доход.",
    };
    bot.send_message(chat_id, format!("{intro} {prompt}")).await?;
    Ok(())
}

async fn insert_and_reply(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
    record: NewRecord,
) -> ResponseResult<()> {
    let summary = format!(
        "{} | {} | {} | {}",
        record.date,
        record.description,
        format_amount(record.amount),
        record.who,
    );

    match cfg.store.insert(kind, record).await {
        Ok(id) => {
            let saved = match kind {
                RecordKind::Expense => format!("✅ Трата #{id} сохранена: {summary}"),
                RecordKind::Income => format!("✅ Доход #{id} сохранён: {summary}"),
            };
            bot.send_message(chat_id, saved).await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn show_statistics(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let stats = async {
        let expense_totals = cfg.store.totals(RecordKind::Expense).await?;
        let income_totals = cfg.store.totals(RecordKind::Income).await?;
        let expenses_by_payer = cfg.store.sum_by_payer(RecordKind::Expense, None).await?;
        let incomes_by_payer = cfg.store.sum_by_payer(RecordKind::Income, None).await?;
        let expense_categories = cfg.store.sum_by_category(RecordKind::Expense).await?;
        Ok::<_, StoreError>((
            expense_totals,
            income_totals,
            expenses_by_payer,
            incomes_by_payer,
            expense_categories,
        ))
    }
    .await;

    match stats {
        Ok((expense_totals, income_totals, expenses_by_payer, incomes_by_payer, categories)) => {
            let text = ui::render_statistics(
                &expenses_by_payer,
                &incomes_by_payer,
                expense_totals,
                income_totals,
                &categories,
            );
            bot.send_message(chat_id, text).await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn show_report(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let rows = async {
        let expenses = cfg.store.list_recent(RecordKind::Expense, RECENT_LIMIT).await?;
        let incomes = cfg.store.list_recent(RecordKind::Income, RECENT_LIMIT).await?;
        Ok::<_, StoreError>((expenses, incomes))
    }
    .await;

    match rows {
        Ok((expenses, incomes)) => {
            let mut merged: Vec<(RecordKind, Record)> = expenses
                .into_iter()
                .map(|record| (RecordKind::Expense, record))
                .chain(
                    incomes
                        .into_iter()
                        .map(|record| (RecordKind::Income, record)),
                )
                .collect();
            // Same string ordering the per-table listings use.
            merged.sort_by(|(_, a), (_, b)| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
            merged.truncate(RECENT_LIMIT as usize);

            bot.send_message(chat_id, ui::render_report(&merged)).await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn show_records(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
) -> ResponseResult<()> {
    cfg.sessions
        .update(chat_id, |s| {
            s.push_menu(MenuScreen::Main);
            s.enter_mode(Mode::Browsing { kind });
        })
        .await;
    render_records(bot, chat_id, cfg, kind).await
}

async fn render_records(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
) -> ResponseResult<()> {
    match cfg.store.list_recent(kind, RECENT_LIMIT).await {
        Ok(records) if records.is_empty() => {
            bot.send_message(chat_id, ui::empty_records(kind)).await?;
        }
        Ok(records) => {
            bot.send_message(chat_id, ui::records_header(kind)).await?;
            for record in &records {
                bot.send_message(chat_id, ui::render_record_line(record))
                    .reply_markup(ui::record_actions(kind, record.id))
                    .await?;
            }
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn show_balance_periods(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
) -> ResponseResult<()> {
    cfg.sessions
        .update(chat_id, |s| s.push_menu(MenuScreen::Main))
        .await;
    bot.send_message(chat_id, "Выберите период:")
        .reply_markup(ui::balance_period_menu())
        .await?;
    Ok(())
}

async fn show_month_balance(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    month: String,
) -> ResponseResult<()> {
    cfg.sessions
        .update(chat_id, |s| s.push_menu(MenuScreen::BalancePeriod))
        .await;

    let pattern = format!("%.{month}");
    let totals = async {
        let income = cfg
            .store
            .totals_where_date_like(RecordKind::Income, &pattern)
            .await?;
        let expense = cfg
            .store
            .totals_where_date_like(RecordKind::Expense, &pattern)
            .await?;
        Ok::<_, StoreError>((income, expense))
    }
    .await;

    match totals {
        Ok((income, expense)) => {
            bot.send_message(chat_id, ui::render_month_balance(&month, income, expense))
                .reply_markup(ui::chart_button(&month))
                .await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn send_month_chart(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    month: &str,
) -> ResponseResult<()> {
    let pattern = format!("%.{month}");
    let series = async {
        let incomes = cfg.store.daily_totals(RecordKind::Income, &pattern).await?;
        let expenses = cfg.store.daily_totals(RecordKind::Expense, &pattern).await?;
        Ok::<_, StoreError>((incomes, expenses))
    }
    .await;

    let (incomes, expenses) = match series {
        Ok(series) => series,
        Err(err) => {
            send_store_error(bot, chat_id, &err).await?;
            return Ok(());
        }
    };

    match cfg.charts.month_chart_png(month, &incomes, &expenses).await {
        Ok(png) => {
            bot.send_photo(chat_id, InputFile::memory(png)).await?;
        }
        Err(err) => {
            tracing::warn!("chart service failed: {err}");
            bot.send_message(chat_id, "Не удалось получить график, попробуйте позже.")
                .await?;
        }
    }
    Ok(())
}

async fn manual_cleanup(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let report = cfg.store.sweep_previous_month(SystemClock.today()).await;
    let text = match (report.expenses_deleted, report.incomes_deleted) {
        (Some(expenses), Some(incomes)) => format!(
            "🗑️ Удалены записи за прошлый месяц ({}): трат — {expenses}, доходов — {incomes}.",
            report.pattern.trim_start_matches("%."),
        ),
        _ => "Ошибка при очистке прошлого месяца, подробности в логах.".to_string(),
    };
    bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn begin_edit(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
    id: i64,
) -> ResponseResult<()> {
    match cfg.store.get_by_id(kind, id).await {
        Ok(Some(record)) => {
            cfg.sessions
                .update(chat_id, |s| s.enter_mode(Mode::Editing { kind, id }))
                .await;
            bot.send_message(
                chat_id,
                format!(
                    "Редактирование записи:\n{}\n\nОтправьте новые данные в формате:\n\
                     Дата | Описание | Сумма | Кто | Категория (опционально)",
                    ui::render_record_line(&record),
                ),
            )
            .await?;
        }
        Ok(None) => {
            bot.send_message(chat_id, "Запись не найдена — возможно, она уже удалена.")
                .await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn delete_record(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: RecordKind,
    id: i64,
) -> ResponseResult<()> {
    match cfg.store.delete_by_id(kind, id).await {
        Ok(0) => {
            bot.send_message(chat_id, "Запись не найдена — возможно, она уже удалена.")
                .await?;
        }
        Ok(_) => {
            bot.send_message(chat_id, format!("🗑️ Запись #{id} удалена."))
                .await?;
        }
        Err(err) => send_store_error(bot, chat_id, &err).await?,
    }
    Ok(())
}

async fn go_back(bot: &Bot, chat_id: ChatId, cfg: &ConfigParameters) -> ResponseResult<()> {
    let mut popped = None;
    cfg.sessions
        .update(chat_id, |s| {
            popped = s.pop_menu();
            s.enter_mode(Mode::Idle);
        })
        .await;
    render_screen(bot, chat_id, popped.unwrap_or(MenuScreen::Main)).await
}

async fn render_screen(bot: &Bot, chat_id: ChatId, screen: MenuScreen) -> ResponseResult<()> {
    match screen {
        MenuScreen::Main => {
            bot.send_message(chat_id, "Выберите действие:")
                .reply_markup(ui::main_menu())
                .await?;
        }
        MenuScreen::BalancePeriod => {
            bot.send_message(chat_id, "Выберите период:")
                .reply_markup(ui::balance_period_menu())
                .await?;
        }
    }
    Ok(())
}

async fn send_store_error(bot: &Bot, chat_id: ChatId, err: &StoreError) -> ResponseResult<()> {
    tracing::error!(chat_id = chat_id.0, "store operation failed: {err}");
    bot.send_message(chat_id, format!("Ошибка при работе с базой: {err}"))
        .await?;
    Ok(())
}

fn parse_command(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    match trimmed.split_whitespace().next().unwrap_or("") {
        "/start" => Some(Command::Start),
        "/help" => Some(Command::Help),
        _ => None,
    }
}

#[derive(Debug, Clone)]
enum Command {
    Start,
    Help,
}

fn current_month_key() -> String {
    let today = SystemClock.today();
    format!("{:02}.{}", today.month(), today.year())
}

fn previous_month_key() -> String {
    let (month, year) = previous_month(SystemClock.today());
    format!("{month:02}.{year}")
}
