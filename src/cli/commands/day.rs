use rust_decimal::Decimal;
use stock_core::{LedgerEngine, LedgerOrigin, PriceService};
use stock_domain::{same_name, StockField, StockFieldError, StockKey};

use crate::cli::core::{qty, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "day",
            "Open the stock sheet for another date",
            "day [YYYY-MM-DD|today|yesterday|+N|-N]",
            cmd_day,
        ),
        CommandEntry::new(
            "show",
            "Show the open stock sheet",
            "show [brand]",
            cmd_show,
        ),
        CommandEntry::new(
            "set",
            "Edit opening, purchase or closing for one entry",
            "set <brand> <size> <opening|purchase|closing> <value>",
            cmd_set,
        ),
        CommandEntry::new("save", "Save the open stock sheet", "save", cmd_save),
    ]
}

/// Resolves a brand/size pair against the current catalog.
pub(crate) fn resolve_key(
    context: &ShellContext,
    brand: &str,
    size: &str,
) -> Result<StockKey, CommandError> {
    context
        .catalog()
        .find(brand, size)
        .cloned()
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`{brand} {size}` is not in the catalog; see `brand list` and `size list`"
            ))
        })
}

fn cmd_day(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        let day = &context.day;
        output::info(format!(
            "Open sheet: {} ({} entries, {}{})",
            day.ledger.date,
            day.ledger.len(),
            origin_label(day.origin),
            if day.dirty { ", unsaved changes" } else { "" }
        ));
        return Ok(());
    };
    let date = context.parse_date(raw)?;
    context.open_day(date)
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = (!args.is_empty()).then(|| args.join(" "));
    let ledger = &context.day.ledger;

    let mut table = Table::new(vec![
        TableColumn::left("Brand"),
        TableColumn::left("Size"),
        TableColumn::right("Opening"),
        TableColumn::right("Purchase"),
        TableColumn::right("Closing"),
        TableColumn::right("Sales"),
    ]);
    let mut shown = Vec::new();
    for record in &ledger.records {
        if let Some(brand) = &filter {
            if !same_name(&record.brand, brand) {
                continue;
            }
        }
        table.add_row(vec![
            record.brand.clone(),
            record.size.clone(),
            qty(record.opening_balance),
            qty(record.purchase),
            qty(record.closing_stock),
            qty(record.sales),
        ]);
        shown.push(record);
    }

    output::section(format!(
        "Stock sheet {}{}",
        ledger.date,
        if context.day.dirty { " (unsaved)" } else { "" }
    ));
    if table.is_empty() {
        output::warning(match &filter {
            Some(brand) => format!("No entries for brand `{brand}`."),
            None => "The catalog is empty; add brands and sizes first.".to_string(),
        });
        return Ok(());
    }

    let opening: Decimal = shown.iter().map(|record| record.opening_balance).sum();
    let purchase: Decimal = shown.iter().map(|record| record.purchase).sum();
    let closing: Decimal = shown.iter().map(|record| record.closing_stock).sum();
    let sales: Decimal = shown.iter().map(|record| record.sales).sum();
    table.set_footer(vec![
        "Total".to_string(),
        String::new(),
        qty(opening),
        qty(purchase),
        qty(closing),
        qty(sales),
    ]);
    table.print();

    if filter.is_none() {
        let value = PriceService::sales_value(&context.book, ledger);
        output::info(format!("Sales value: {}", context.money(value)));
    }
    if context.day.origin == LedgerOrigin::Fallback {
        output::warning("Storage was unavailable; this sheet is a blank stand-in.");
    }
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [brand, size, field, value] = args else {
        return Err(CommandError::usage(
            "set <brand> <size> <opening|purchase|closing> <value>",
        ));
    };
    let field: StockField = field
        .parse()
        .map_err(|err: StockFieldError| CommandError::InvalidArguments(err.to_string()))?;
    let date = context.day.ledger.date;
    if field == StockField::OpeningBalance
        && context.config.restrict_opening_edits
        && !LedgerEngine::opening_balance_editable(date)
    {
        return Err(CommandError::Message(format!(
            "Opening balances can only be entered on the first day of a month; \
             {date} carries them from the previous close."
        )));
    }

    let key = resolve_key(context, brand, size)?;
    let record = LedgerEngine::update_field(&mut context.day.ledger, &key, field, *value)?;
    output::success(format!(
        "{key}: {field} = {}, sales = {}",
        qty(record.get(field)),
        qty(record.sales)
    ));
    context.day.dirty = true;
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.day.origin == LedgerOrigin::Fallback {
        return Err(CommandError::Message(format!(
            "This sheet was not loaded from storage; reopen it with `day {}` before saving.",
            context.day.ledger.date
        )));
    }
    context.save_day()?;
    output::success(format!(
        "Saved {} entries for {}.",
        context.day.ledger.len(),
        context.day.ledger.date
    ));
    Ok(())
}

fn origin_label(origin: LedgerOrigin) -> &'static str {
    match origin {
        LedgerOrigin::Saved => "saved",
        LedgerOrigin::CarriedForward => "carried forward",
        LedgerOrigin::Partial => "partially saved",
        LedgerOrigin::Blank => "new",
        LedgerOrigin::Fallback => "storage unavailable",
    }
}
