use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    EngineError, Principal, ResultEngine, Transaction, TransactionKind, TransactionStatus,
    transactions,
};

use super::super::{Engine, with_tx};

const MAX_PAGE_SIZE: u64 = 200;

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Matches the source or the destination account.
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
}

/// One page of transactions, newest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub items: Vec<Transaction>,
    /// Opaque cursor of the next page, `None` on the last one.
    pub next_cursor: Option<String>,
}

fn validate_list_filter(filter: &TransactionListFilter, limit: u64) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(EngineError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::Date.lte(to));
        }
        if let Some(account_id) = filter.account_id {
            let account_id = account_id.to_string();
            self = self.filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(account_id.as_str()))
                    .add(transactions::Column::DestinationAccountId.eq(account_id.as_str())),
            );
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = filter.status {
            self = self.filter(transactions::Column::Status.eq(status.as_str()));
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    date: NaiveDate,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Lists the transactions of a budget with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(date DESC, transaction_id DESC)`.
    pub async fn list_transactions(
        &self,
        principal: &Principal,
        budget_id: Uuid,
        filter: &TransactionListFilter,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<TransactionPage> {
        validate_list_filter(filter, limit)?;
        let cursor = cursor.map(TransactionsCursor::decode).transpose()?;
        with_tx!(self, |db_tx| {
            self.require_budget_read(&db_tx, principal, budget_id).await?;

            let mut query = transactions::Entity::find()
                .filter(transactions::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_desc(transactions::Column::Date)
                .order_by_desc(transactions::Column::Id)
                .limit(limit.saturating_add(1));

            if let Some(cursor) = &cursor {
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::Date.lt(cursor.date))
                        .add(
                            Condition::all()
                                .add(transactions::Column::Date.eq(cursor.date))
                                .add(transactions::Column::Id.lt(cursor.transaction_id.as_str())),
                        ),
                );
            }
            query = query.apply_tx_filters(filter);

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut items: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
            for tx_model in rows.into_iter().take(limit as usize) {
                items.push(Transaction::try_from(tx_model)?);
            }

            let next_cursor = if has_more {
                items
                    .last()
                    .map(|tx| TransactionsCursor {
                        date: tx.date,
                        transaction_id: tx.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok(TransactionPage { items, next_cursor })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_roundtrip_and_garbage() {
        let cursor = TransactionsCursor {
            date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
            transaction_id: "abc".to_string(),
        };
        let decoded = TransactionsCursor::decode(&cursor.encode().unwrap()).unwrap();
        assert_eq!(decoded.date, cursor.date);
        assert_eq!(decoded.transaction_id, "abc");
        assert_eq!(
            TransactionsCursor::decode("not a cursor!").unwrap_err().kind(),
            "validation"
        );
    }

    #[test]
    fn limit_bounds() {
        let filter = TransactionListFilter::default();
        assert!(validate_list_filter(&filter, 0).is_err());
        assert!(validate_list_filter(&filter, MAX_PAGE_SIZE + 1).is_err());
        assert!(validate_list_filter(&filter, 50).is_ok());
    }
}
