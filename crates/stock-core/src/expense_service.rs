use rust_decimal::Decimal;
use stock_domain::{DateWindow, Expense, ShopBook};
use tracing::info;
use uuid::Uuid;

use crate::{CoreError, CoreResult};

pub struct ExpenseService;

impl ExpenseService {
    pub fn add(book: &mut ShopBook, mut expense: Expense) -> CoreResult<Uuid> {
        Self::validate(&mut expense)?;
        let id = expense.id;
        info!(
            category = %expense.category,
            amount = %expense.amount,
            date = %expense.date,
            "expense recorded"
        );
        book.expenses.push(expense);
        book.touch();
        Ok(id)
    }

    /// Replaces the expense with id `id`, keeping that id. Returns the
    /// previous version.
    pub fn update(book: &mut ShopBook, id: Uuid, mut expense: Expense) -> CoreResult<Expense> {
        Self::validate(&mut expense)?;
        let existing = book
            .expenses
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| CoreError::Validation(format!("Expense {id} not found")))?;
        expense.id = id;
        let previous = std::mem::replace(existing, expense);
        info!(%id, category = %existing.category, amount = %existing.amount, "expense updated");
        book.touch();
        Ok(previous)
    }

    pub fn remove(book: &mut ShopBook, id: Uuid) -> CoreResult<Expense> {
        let index = book
            .expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| CoreError::Validation(format!("Expense {id} not found")))?;
        let removed = book.expenses.remove(index);
        book.touch();
        Ok(removed)
    }

    /// Expenses dated inside `window`, oldest first. `None` lists everything.
    pub fn list_in<'a>(book: &'a ShopBook, window: Option<&DateWindow>) -> Vec<&'a Expense> {
        let mut expenses: Vec<&'a Expense> = book
            .expenses
            .iter()
            .filter(|expense| window.map_or(true, |window| window.contains(expense.date)))
            .collect();
        expenses.sort_by_key(|expense| expense.date);
        expenses
    }

    pub fn total_in(book: &ShopBook, window: Option<&DateWindow>) -> Decimal {
        Self::list_in(book, window)
            .into_iter()
            .map(|expense| expense.amount)
            .sum()
    }

    fn validate(expense: &mut Expense) -> CoreResult<()> {
        expense.category = expense.category.trim().to_string();
        if expense.category.is_empty() {
            return Err(CoreError::Validation("Expense category is required".into()));
        }
        if expense.amount <= Decimal::ZERO {
            return Err(CoreError::Validation(
                "Expense amount must be positive".into(),
            ));
        }
        Ok(())
    }
}
