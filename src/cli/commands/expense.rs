use stock_core::ExpenseService;
use stock_domain::{Expense, RangePreset};
use uuid::Uuid;

use crate::cli::core::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const USAGE: &str = "expense [list [7days|1month|3months|6months|1year|all]\
                     |add <category> <amount> [date] [description]\
                     |edit <n|id> field=value...|remove <n|id>]  \
                     fields: category amount date description";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "expense",
        "Record and review shop expenses",
        USAGE,
        cmd_expense,
    )]
}

fn cmd_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => list_expenses(context, RangePreset::All),
        ["list", preset] => {
            let preset = preset.parse::<RangePreset>().map_err(|_| {
                CommandError::InvalidArguments(format!("unknown range `{preset}`"))
            })?;
            list_expenses(context, preset)
        }
        ["add", category, amount, rest @ ..] => add_expense(context, category, amount, rest),
        ["edit", target, options @ ..] if !options.is_empty() => {
            edit_expense(context, target, options)
        }
        ["remove", target] => remove_expense(context, target),
        _ => Err(CommandError::usage(USAGE)),
    }
}

fn list_expenses(context: &ShellContext, preset: RangePreset) -> CommandResult {
    let window = preset.window(context.today());
    let all = ExpenseService::list_in(&context.book, None);
    let mut table = Table::new(vec![
        TableColumn::right("No."),
        TableColumn::left("Date"),
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
        TableColumn::left("Description"),
    ]);
    for (index, expense) in all.iter().enumerate() {
        if window.map_or(true, |window| window.contains(expense.date)) {
            table.add_row(vec![
                (index + 1).to_string(),
                expense.date.to_string(),
                expense.category.clone(),
                format!("{:.2}", expense.amount),
                expense.description.clone(),
            ]);
        }
    }
    if table.is_empty() {
        output::info("No expenses in range.");
        return Ok(());
    }
    let total = ExpenseService::total_in(&context.book, window.as_ref());
    table.set_footer(vec![
        String::new(),
        String::new(),
        "Total".into(),
        format!("{total:.2}"),
        String::new(),
    ]);
    output::section(format!("Expenses ({})", preset.label()));
    table.print();
    Ok(())
}

fn add_expense(
    context: &mut ShellContext,
    category: &str,
    amount: &str,
    rest: &[&str],
) -> CommandResult {
    let amount = parse_amount(amount, "amount")?;
    let (date, description) = match rest.split_first() {
        Some((first, tail)) => match context.parse_date(first) {
            Ok(date) => (date, tail.join(" ")),
            Err(_) => (context.day.ledger.date, rest.join(" ")),
        },
        None => (context.day.ledger.date, String::new()),
    };
    let mut expense = Expense::new(category, amount, date);
    expense.description = description;
    expense.store = Some(context.book.name.clone());

    let mut book = context.book.clone();
    ExpenseService::add(&mut book, expense)?;
    context.commit_book(book)?;
    output::success(format!(
        "Recorded {} for {} on {date}.",
        context.money(amount),
        category.trim()
    ));
    Ok(())
}

/// Finds an expense by its number in the full listing or by id.
fn find_expense(context: &ShellContext, target: &str) -> Result<Uuid, CommandError> {
    match target.parse::<usize>() {
        Ok(position) => ExpenseService::list_in(&context.book, None)
            .get(position.wrapping_sub(1))
            .map(|expense| expense.id)
            .ok_or_else(|| CommandError::Message(format!("No expense number {position}."))),
        Err(_) => Uuid::parse_str(target).map_err(|_| {
            CommandError::InvalidArguments(format!("`{target}` is neither a number nor an id"))
        }),
    }
}

fn edit_expense(context: &mut ShellContext, target: &str, options: &[&str]) -> CommandResult {
    let id = find_expense(context, target)?;
    let mut expense = context
        .book
        .expenses
        .iter()
        .find(|expense| expense.id == id)
        .cloned()
        .ok_or_else(|| CommandError::Message(format!("No expense `{target}`.")))?;
    for option in options {
        let (key, value) = option.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected key=value, got `{option}`"))
        })?;
        match key.trim().to_ascii_lowercase().as_str() {
            "category" => expense.category = value.to_string(),
            "amount" => expense.amount = parse_amount(value, "amount")?,
            "date" => expense.date = context.parse_date(value)?,
            "description" => expense.description = value.trim().to_string(),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown expense field `{other}`"
                )))
            }
        }
    }

    let mut book = context.book.clone();
    ExpenseService::update(&mut book, id, expense)?;
    context.commit_book(book)?;
    output::success(format!("Updated expense {target}."));
    Ok(())
}

fn remove_expense(context: &mut ShellContext, target: &str) -> CommandResult {
    let id = find_expense(context, target)?;
    let mut book = context.book.clone();
    let removed = ExpenseService::remove(&mut book, id)?;
    context.commit_book(book)?;
    output::success(format!(
        "Removed {} expense of {:.2} from {}.",
        removed.category, removed.amount, removed.date
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use stock_core::ShopStorage;

    use crate::cli::core::test_support::{context_on, run};

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn add_defaults_to_open_sheet_date() {
        let (_dir, mut context) = context_on(june(5));
        run(&mut context, "day 2024-06-03").unwrap();
        run(&mut context, "expense add Rent 1500 monthly rent").unwrap();
        run(&mut context, "expense add Power 300.5 2024-06-01").unwrap();

        let expenses = &context.book.expenses;
        assert_eq!(expenses[0].date, june(3));
        assert_eq!(expenses[0].description, "monthly rent");
        assert_eq!(expenses[1].date, june(1));
        assert_eq!(expenses[1].amount, dec!(300.5));
    }

    #[test]
    fn remove_by_listed_position() {
        let (_dir, mut context) = context_on(june(5));
        run(&mut context, "expense add Rent 1500 2024-06-04").unwrap();
        run(&mut context, "expense add Power 300 2024-06-02").unwrap();
        // Listed oldest first, so 1 is Power.
        run(&mut context, "expense remove 1").unwrap();
        assert_eq!(context.book.expenses.len(), 1);
        assert_eq!(context.book.expenses[0].category, "Rent");
        assert!(run(&mut context, "expense remove 9").is_err());
    }

    #[test]
    fn edit_by_position_or_id() {
        let (_dir, mut context) = context_on(june(5));
        run(&mut context, "expense add Rent 1500 2024-06-04").unwrap();
        run(&mut context, "expense add Power 300 2024-06-02").unwrap();

        run(&mut context, r#"expense edit 1 amount=320 "description=June bill""#).unwrap();
        let power = &context.book.expenses[1];
        assert_eq!(power.amount, dec!(320));
        assert_eq!(power.description, "June bill");

        let id = context.book.expenses[0].id;
        run(&mut context, &format!("expense edit {id} date=2024-06-01 category=Lease")).unwrap();
        let lease = &context.book.expenses[0];
        assert_eq!(lease.date, june(1));
        assert_eq!(lease.category, "Lease");
        assert_eq!(lease.amount, dec!(1500));

        assert!(run(&mut context, "expense edit 2 amount=0").is_err());
        assert!(run(&mut context, "expense edit 2 colour=red").is_err());
        assert!(run(&mut context, "expense edit 7 amount=5").is_err());
        assert_eq!(context.book.expenses.len(), 2);
        let stored = context.storage.load_book().unwrap().unwrap();
        assert_eq!(stored.expenses[0].category, "Lease");
    }

    #[test]
    fn invalid_amounts_are_rejected() {
        let (_dir, mut context) = context_on(june(5));
        assert!(run(&mut context, "expense add Rent lots").is_err());
        assert!(run(&mut context, "expense add Rent -5").is_err());
        assert!(context.book.expenses.is_empty());
    }
}
