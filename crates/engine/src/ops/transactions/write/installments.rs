use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::TransactionTrait;
use tracing::info;
use uuid::Uuid;

use crate::{
    Account, EngineError, Installment, InstallmentPurchaseCmd, MoneyCents, Principal,
    ResultEngine, Transaction, TransactionKind, TransactionLinks, YearMonth, card_cycle,
    card_due_date,
    util::{normalize_description, normalize_optional_text},
};

use super::super::super::{Engine, with_tx};

const MAX_INSTALLMENTS: u32 = 480;

/// Date of every installment, first one included.
///
/// On a credit card installment `k` is due with the statement `k - 1`
/// cycles after the purchase's cycle. Elsewhere it falls `k - 1` months
/// after the purchase date, clamped to the month length.
pub(crate) fn installment_dates(
    account: &Account,
    purchase: NaiveDate,
    count: u32,
) -> ResultEngine<Vec<NaiveDate>> {
    if account.is_credit_card() {
        let (closing_day, due_day) = account.card_cycle_days()?;
        let first_cycle = card_cycle(purchase, closing_day);
        Ok((0..count)
            .map(|k| card_due_date(first_cycle.offset(k as i32), closing_day, due_day))
            .collect())
    } else {
        let first_month = YearMonth::of(purchase);
        Ok((0..count)
            .map(|k| first_month.offset(k as i32).clamp_day(purchase.day()))
            .collect())
    }
}

impl Engine {
    /// Splits an expense into installments.
    ///
    /// Row 1 is the parent; rows 2..n point at it. On a credit card every
    /// row debits the card at creation (the whole purchase is committed
    /// credit); on other accounts only the parent moves money.
    pub async fn create_installment_purchase(
        &self,
        principal: &Principal,
        cmd: InstallmentPurchaseCmd,
    ) -> ResultEngine<Vec<Transaction>> {
        MoneyCents::positive(cmd.installment_amount, "installment_amount")?;
        if cmd.installments < 2 {
            return Err(EngineError::Validation(
                "an installment purchase needs at least 2 installments".to_string(),
            ));
        }
        if cmd.installments > MAX_INSTALLMENTS {
            return Err(EngineError::Validation(format!(
                "an installment purchase has at most {MAX_INSTALLMENTS} installments"
            )));
        }
        let description = normalize_description(&cmd.description)?;
        let links = TransactionLinks {
            category_id: cmd.category_id,
            ..TransactionLinks::default()
        };

        with_tx!(self, |db_tx| {
            self.require_budget_write(&db_tx, principal, cmd.budget_id)
                .await?;
            let account = Account::try_from(
                self.require_open_account(&db_tx, cmd.budget_id, cmd.account_id)
                    .await?,
            )?;
            self.require_links(&db_tx, cmd.budget_id, &links).await?;

            let dates = installment_dates(&account, cmd.date, cmd.installments)?;
            let parent_id = Uuid::new_v4();
            let now = Utc::now();
            let rows: Vec<Transaction> = dates
                .into_iter()
                .enumerate()
                .map(|(index, date)| {
                    let number = index as u32 + 1;
                    Transaction {
                        id: if number == 1 { parent_id } else { Uuid::new_v4() },
                        budget_id: cmd.budget_id,
                        account_id: cmd.account_id,
                        destination_account_id: None,
                        kind: TransactionKind::Expense,
                        status: cmd.status,
                        amount: cmd.installment_amount,
                        date,
                        description: description.clone(),
                        notes: normalize_optional_text(cmd.notes.as_deref()),
                        links: links.clone(),
                        installment: Some(Installment {
                            number,
                            total: cmd.installments,
                            parent_transaction_id: (number > 1).then_some(parent_id),
                        }),
                        created_by: principal.user_id.clone(),
                        created_at: now,
                        updated_at: now,
                    }
                })
                .collect();

            self.insert_transactions(&db_tx, cmd.budget_id, &rows).await?;
            info!(
                budget_id = %cmd.budget_id,
                %parent_id,
                installments = cmd.installments,
                credit_card = account.is_credit_card(),
                "installment purchase created"
            );
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccountKind;

    fn account(kind: AccountKind, closing: Option<u32>, due: Option<u32>) -> Account {
        Account {
            id: Uuid::new_v4(),
            budget_id: Uuid::new_v4(),
            name: "acc".to_string(),
            kind,
            balance: 0,
            cleared_balance: 0,
            credit_limit: None,
            closing_day: closing,
            due_day: due,
            archived: false,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn card_installments_follow_statement_due_dates() {
        let card = account(AccountKind::CreditCard, Some(25), Some(5));
        // Bought after closing: first statement closes in November, due in December.
        let dates = installment_dates(&card, date(2026, 10, 28), 3).unwrap();
        assert_eq!(dates, vec![date(2026, 12, 5), date(2027, 1, 5), date(2027, 2, 5)]);
    }

    #[test]
    fn account_installments_step_monthly_and_clamp() {
        let checking = account(AccountKind::Checking, None, None);
        let dates = installment_dates(&checking, date(2026, 1, 31), 3).unwrap();
        assert_eq!(dates, vec![date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)]);
    }

    #[test]
    fn card_without_cycle_is_inconsistent() {
        let card = account(AccountKind::CreditCard, None, None);
        assert!(installment_dates(&card, date(2026, 10, 1), 2).is_err());
    }
}
