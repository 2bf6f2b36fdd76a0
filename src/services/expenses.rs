use super::{require_id, require_text};
use crate::backend::{Query, SupabaseClient};
use crate::constants::EXPENSES_TABLE;
use crate::error::{AppError, AppResult};
use crate::models::Expense;
use std::collections::BTreeMap;

pub struct ExpenseService;

impl ExpenseService {
    /// Newest first.
    pub async fn list_expenses(client: &SupabaseClient, user_id: &str) -> AppResult<Vec<Expense>> {
        client
            .select(
                EXPENSES_TABLE,
                &Query::new().eq("user_id", user_id).order("expense_date", false),
            )
            .await
    }

    pub async fn list_group_expenses(
        client: &SupabaseClient,
        group_id: &str,
    ) -> AppResult<Vec<Expense>> {
        client
            .select(
                EXPENSES_TABLE,
                &Query::new().eq("group_id", group_id).order("expense_date", false),
            )
            .await
    }

    pub async fn create_expense(client: &SupabaseClient, expense: &Expense) -> AppResult<Expense> {
        require_id(expense.user_id.as_deref(), "Expense owner")?;
        require_text(expense.title.as_deref(), "Expense title")?;
        match expense.amount {
            Some(amount) if amount.is_finite() && amount > 0.0 => {}
            _ => {
                return Err(AppError::InvalidInput(
                    "Expense amount must be a positive number".to_string(),
                ))
            }
        }

        let row = Expense {
            id: None,
            created_at: None,
            ..expense.clone()
        };
        client.insert(EXPENSES_TABLE, &row).await
    }

    pub async fn delete_expense(client: &SupabaseClient, expense_id: &str) -> AppResult<()> {
        client
            .delete(EXPENSES_TABLE, &Query::new().eq("id", expense_id))
            .await
    }

    pub fn total_amount(expenses: &[Expense]) -> f64 {
        expenses.iter().filter_map(|e| e.amount).sum()
    }

    /// Sum per category; rows without a category land under "Other".
    pub fn totals_by_category(expenses: &[Expense]) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for expense in expenses {
            let category = expense
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "Other".to_string());
            *totals.entry(category).or_insert(0.0) += expense.amount.unwrap_or(0.0);
        }
        totals
    }
}
