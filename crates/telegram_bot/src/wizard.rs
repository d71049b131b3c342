//! Multi-step entry wizard.
//!
//! The wizard is a pure transition function over an explicit state enum;
//! handlers feed it text and perform the returned effect. Collected fields
//! travel inside the step variant, so a half-filled draft can never leak
//! into another mode.

use store::{DEFAULT_CATEGORY, NewRecord, RecordKind, parse_positive_amount};

use crate::parsing;

const HINT_DATE: &str =
    "Дата должна быть в формате ДД.ММ.ГГГГ, например 25.12.2023. Попробуйте ещё раз:";
const HINT_DESCRIPTION: &str = "Описание не может быть пустым. Попробуйте ещё раз:";
const HINT_AMOUNT: &str =
    "Сумма должна быть положительным числом, например 2500,75. Попробуйте ещё раз:";
const HINT_PAYER: &str = "Укажите, кто платил. Попробуйте ещё раз:";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Wizard {
    pub kind: RecordKind,
    pub step: Step,
}

/// Each state carries exactly the fields collected so far.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Step {
    Date,
    Description {
        date: String,
    },
    Amount {
        date: String,
        description: String,
    },
    Payer {
        date: String,
        description: String,
        amount: f64,
    },
}

/// Effect of feeding one message to the wizard.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum StepOutcome {
    /// Advanced; keep the wizard and send its next prompt.
    Next(Wizard),
    /// Input rejected; same step, send the correction hint.
    Retry(Wizard, &'static str),
    /// All fields collected; insert and go back to idle.
    Done(RecordKind, NewRecord),
}

impl Wizard {
    pub(crate) fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            step: Step::Date,
        }
    }

    /// Prompt for the field the wizard is waiting for.
    pub(crate) fn prompt(&self) -> &'static str {
        match self.step {
            Step::Date => "Введите дату в формате ДД.ММ.ГГГГ, например 25.12.2023:",
            Step::Description { .. } => "Введите описание:",
            Step::Amount { .. } => "Введите сумму, например 2500,75:",
            Step::Payer { .. } => "Кто платил?",
        }
    }

    pub(crate) fn advance(self, input: &str) -> StepOutcome {
        let Wizard { kind, step } = self;
        let text = input.trim();

        match step {
            Step::Date => {
                if parsing::looks_like_date(text) {
                    StepOutcome::Next(Wizard {
                        kind,
                        step: Step::Description {
                            date: text.to_string(),
                        },
                    })
                } else {
                    StepOutcome::Retry(Wizard::new(kind), HINT_DATE)
                }
            }
            Step::Description { date } => {
                if text.is_empty() {
                    StepOutcome::Retry(
                        Wizard {
                            kind,
                            step: Step::Description { date },
                        },
                        HINT_DESCRIPTION,
                    )
                } else {
                    StepOutcome::Next(Wizard {
                        kind,
                        step: Step::Amount {
                            date,
                            description: text.to_string(),
                        },
                    })
                }
            }
            Step::Amount { date, description } => match parse_positive_amount(text) {
                Ok(amount) => StepOutcome::Next(Wizard {
                    kind,
                    step: Step::Payer {
                        date,
                        description,
                        amount,
                    },
                }),
                Err(_) => StepOutcome::Retry(
                    Wizard {
                        kind,
                        step: Step::Amount { date, description },
                    },
                    HINT_AMOUNT,
                ),
            },
            Step::Payer {
                date,
                description,
                amount,
            } => {
                if text.is_empty() {
                    StepOutcome::Retry(
                        Wizard {
                            kind,
                            step: Step::Payer {
                                date,
                                description,
                                amount,
                            },
                        },
                        HINT_PAYER,
                    )
                } else {
                    StepOutcome::Done(
                        kind,
                        NewRecord {
                            date,
                            description,
                            amount,
                            who: text.to_string(),
                            category: DEFAULT_CATEGORY.to_string(),
                        },
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(outcome: StepOutcome) -> Wizard {
        match outcome {
            StepOutcome::Next(wizard) => wizard,
            other => panic!("expected Next, got {other:?}"),
        }
    }

    #[test]
    fn collects_all_four_fields() {
        let wizard = Wizard::new(RecordKind::Income);
        let wizard = next(wizard.advance("05.12.2023"));
        let wizard = next(wizard.advance("Зарплата"));
        let wizard = next(wizard.advance("50000"));

        match wizard.advance("Я") {
            StepOutcome::Done(kind, record) => {
                assert_eq!(kind, RecordKind::Income);
                assert_eq!(record.date, "05.12.2023");
                assert_eq!(record.description, "Зарплата");
                assert_eq!(record.amount, 50000.0);
                assert_eq!(record.who, "Я");
                assert_eq!(record.category, DEFAULT_CATEGORY);
            }
            other => panic!("expected Done, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_keeps_the_step() {
        let wizard = Wizard::new(RecordKind::Expense);
        match wizard.advance("вчера") {
            StepOutcome::Retry(wizard, hint) => {
                assert_eq!(wizard.step, Step::Date);
                assert_eq!(hint, HINT_DATE);
            }
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn bad_amount_keeps_collected_fields() {
        let wizard = Wizard::new(RecordKind::Expense);
        let wizard = next(wizard.advance("25.12.2023"));
        let wizard = next(wizard.advance("Продукты"));

        match wizard.advance("минус сто") {
            StepOutcome::Retry(wizard, hint) => {
                assert_eq!(hint, HINT_AMOUNT);
                assert_eq!(
                    wizard.step,
                    Step::Amount {
                        date: "25.12.2023".to_string(),
                        description: "Продукты".to_string(),
                    }
                );
            }
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn comma_amount_is_accepted() {
        let wizard = Wizard::new(RecordKind::Expense);
        let wizard = next(wizard.advance("26.12.2023"));
        let wizard = next(wizard.advance("Продукты"));
        let wizard = next(wizard.advance("2500,75"));

        match wizard.step {
            Step::Payer { amount, .. } => assert_eq!(amount, 2500.75),
            other => panic!("expected Payer step, got {other:?}"),
        }
    }

    #[test]
    fn empty_payer_retries() {
        let wizard = Wizard::new(RecordKind::Expense);
        let wizard = next(wizard.advance("26.12.2023"));
        let wizard = next(wizard.advance("Продукты"));
        let wizard = next(wizard.advance("100"));

        assert!(matches!(
            wizard.advance("   "),
            StepOutcome::Retry(_, HINT_PAYER)
        ));
    }
}
