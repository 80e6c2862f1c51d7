use stock_core::SummaryService;
use stock_domain::{DateWindow, RangePreset};

use crate::cli::core::{qty, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const USAGE: &str = "report [7days|1month|3months|6months|1year|all] | report <start> <end>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        "Sales, purchases, expenses and profit over a period",
        USAGE,
        cmd_report,
    )]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (label, window) = match args {
        [] => (
            RangePreset::LastMonth.label().to_string(),
            RangePreset::LastMonth.window(context.today()),
        ),
        [preset] => {
            let preset = preset.parse::<RangePreset>().map_err(|_| {
                CommandError::InvalidArguments(format!("unknown range `{preset}`"))
            })?;
            (preset.label().to_string(), preset.window(context.today()))
        }
        [start, end] => {
            let window = DateWindow::new(context.parse_date(start)?, context.parse_date(end)?)
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            (window.to_string(), Some(window))
        }
        _ => return Err(CommandError::usage(USAGE)),
    };

    let report = SummaryService::period_report(&context.storage, &context.book, window)?;

    output::section(format!("Report: {label}"));
    if let Some(window) = report.window {
        output::info(format!("  Period        : {window}"));
    }
    output::info(format!("  Days recorded : {}", report.days_recorded));
    output::info(format!("  Bottles sold  : {}", qty(report.sales_quantity)));
    output::info(format!("  Sales value   : {}", context.money(report.sales_value)));
    output::info(format!("  Purchases     : {}", context.money(report.purchases)));
    output::info(format!("  Expenses      : {}", context.money(report.expenses)));
    output::info(format!("  Profit        : {}", context.money(report.profit())));

    let in_stock: Vec<_> = report
        .current_stock
        .iter()
        .filter(|entry| !entry.closing_stock.is_zero())
        .collect();
    if in_stock.is_empty() {
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Brand"),
        TableColumn::left("Size"),
        TableColumn::right("In stock"),
        TableColumn::left("As of"),
    ]);
    for entry in in_stock {
        table.add_row(vec![
            entry.key.brand.clone(),
            entry.key.size.clone(),
            qty(entry.closing_stock),
            entry.as_of.to_string(),
        ]);
    }
    output::section("Current stock");
    table.print();
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::cli::core::test_support::{context_on, run};
    use crate::cli::core::CommandError;

    #[test]
    fn reports_accept_presets_and_ranges() {
        let (_dir, mut context) = context_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        run(&mut context, "set IB 720ML opening 10").unwrap();
        run(&mut context, "save").unwrap();
        run(&mut context, "report").unwrap();
        run(&mut context, "report all").unwrap();
        run(&mut context, "report 2024-05-01 2024-06-01").unwrap();
    }

    #[test]
    fn reversed_range_is_rejected() {
        let (_dir, mut context) = context_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let err = run(&mut context, "report 2024-06-02 2024-06-01").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
        assert!(run(&mut context, "report fortnight").is_err());
    }
}
