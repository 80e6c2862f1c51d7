use rust_decimal::Decimal;
use stock_core::{
    LedgerEngine, LedgerOrigin, OrderLine, PurchaseService, ShopStorage, VendorService,
};
use stock_domain::{OrderStatus, PurchaseOrder, Vendor};
use tracing::warn;

use crate::cli::core::{parse_amount, qty, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

const VENDOR_USAGE: &str = "vendor [list|add <name> [field=value]...|edit <name> field=value...\
                            |remove <name>]  fields: name phone email contact address gst pan \
                            terms credit";
const ORDER_USAGE: &str = "order [list [pending|received|cancelled]\
                           |new <vendor> <expected-date> <brand:size:qty:rate>...\
                           |show <number>|receive <number>|cancel <number>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("vendor", "Manage suppliers", VENDOR_USAGE, cmd_vendor),
        CommandEntry::new(
            "order",
            "Place, receive and cancel purchase orders",
            ORDER_USAGE,
            cmd_order,
        ),
    ]
}

fn cmd_vendor(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => {
            let vendors = VendorService::list(&context.book);
            if vendors.is_empty() {
                output::info("No vendors yet. Add one with `vendor add <name>`.");
                return Ok(());
            }
            let mut table = Table::new(vec![
                TableColumn::left("Vendor"),
                TableColumn::left("Contact"),
                TableColumn::left("Phone"),
                TableColumn::left("Terms"),
            ]);
            for vendor in vendors {
                table.add_row(vec![
                    vendor.name.clone(),
                    vendor.contact_person.clone().unwrap_or_default(),
                    vendor.phone.clone().unwrap_or_default(),
                    vendor.payment_terms.clone().unwrap_or_default(),
                ]);
            }
            output::section("Vendors");
            table.print();
            Ok(())
        }
        ["add", name, options @ ..] => {
            let mut vendor = Vendor::new(*name);
            apply_vendor_options(&mut vendor, options)?;
            let mut book = context.book.clone();
            let display = vendor.name.trim().to_string();
            VendorService::add(&mut book, vendor)?;
            context.commit_book(book)?;
            output::success(format!("Added vendor `{display}`."));
            Ok(())
        }
        ["edit", name, options @ ..] if !options.is_empty() => {
            let mut vendor = context
                .book
                .vendor(name)
                .cloned()
                .ok_or_else(|| CommandError::Message(format!("No vendor `{name}`.")))?;
            apply_vendor_options(&mut vendor, options)?;
            let mut book = context.book.clone();
            let previous = VendorService::update(&mut book, name, vendor)?;
            context.commit_book(book)?;
            output::success(format!("Updated vendor `{}`.", previous.name));
            Ok(())
        }
        ["remove", name] => {
            let mut book = context.book.clone();
            let removed = VendorService::remove(&mut book, name)?;
            context.commit_book(book)?;
            output::success(format!("Removed vendor `{}`.", removed.name));
            Ok(())
        }
        _ => Err(CommandError::usage(VENDOR_USAGE)),
    }
}

/// Applies `field=value` pairs to `vendor`. An empty value clears the field.
fn apply_vendor_options(vendor: &mut Vendor, options: &[&str]) -> CommandResult {
    for option in options {
        let (key, value) = option.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected key=value, got `{option}`"))
        })?;
        let value = Some(value.trim().to_string()).filter(|value| !value.is_empty());
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => vendor.name = value.unwrap_or_default(),
            "phone" => vendor.phone = value,
            "email" => vendor.email = value,
            "contact" => vendor.contact_person = value,
            "address" => vendor.address = value,
            "gst" => vendor.gst_number = value,
            "pan" => vendor.pan_number = value,
            "terms" => vendor.payment_terms = value,
            "credit" => {
                vendor.credit_limit = match value {
                    Some(raw) => parse_amount(&raw, "credit")?,
                    None => Decimal::ZERO,
                }
            }
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown vendor field `{other}`"
                )))
            }
        }
    }
    Ok(())
}

fn cmd_order(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => list_orders(context, None),
        ["list", status] => list_orders(context, Some(parse_status(status)?)),
        ["new", vendor, expected, lines @ ..] if !lines.is_empty() => {
            create_order(context, vendor, expected, lines)
        }
        ["show", number] => show_order(context, number),
        ["receive", number] => receive_order(context, number),
        ["cancel", number] => {
            let mut book = context.book.clone();
            PurchaseService::cancel_order(&mut book, number)?;
            context.commit_book(book)?;
            output::success(format!("Cancelled order {}.", number.to_ascii_uppercase()));
            Ok(())
        }
        _ => Err(CommandError::usage(ORDER_USAGE)),
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus, CommandError> {
    match raw.to_ascii_lowercase().as_str() {
        "pending" => Ok(OrderStatus::Pending),
        "received" => Ok(OrderStatus::Received),
        "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
        _ => Err(CommandError::InvalidArguments(format!(
            "unknown order status `{raw}`"
        ))),
    }
}

fn list_orders(context: &ShellContext, status: Option<OrderStatus>) -> CommandResult {
    let orders = PurchaseService::list(&context.book, status);
    if orders.is_empty() {
        output::info("No purchase orders.");
        return Ok(());
    }
    let mut table = Table::new(vec![
        TableColumn::left("Order"),
        TableColumn::left("Vendor"),
        TableColumn::left("Ordered"),
        TableColumn::left("Expected"),
        TableColumn::right("Qty"),
        TableColumn::right("Total"),
        TableColumn::left("Status"),
    ]);
    for order in orders {
        table.add_row(vec![
            order.order_number.clone(),
            order.vendor.clone(),
            order.order_date.to_string(),
            order.expected_delivery.to_string(),
            qty(order.total_quantity()),
            format!("{:.2}", order.total_amount),
            order.status.to_string(),
        ]);
    }
    output::section("Purchase orders");
    table.print();
    Ok(())
}

/// Reads `brand:size:qty:rate`. The brand may itself contain colons.
fn parse_line(raw: &str) -> Result<OrderLine, CommandError> {
    let mut parts = raw.rsplitn(4, ':');
    let (Some(rate), Some(quantity), Some(size), Some(brand)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(CommandError::InvalidArguments(format!(
            "order item `{raw}` should look like brand:size:qty:rate"
        )));
    };
    Ok(OrderLine::new(
        brand,
        size,
        parse_amount(quantity, "quantity")?,
        parse_amount(rate, "rate")?,
    ))
}

/// Places an order dated by the open sheet.
fn create_order(
    context: &mut ShellContext,
    vendor: &str,
    expected: &str,
    lines: &[&str],
) -> CommandResult {
    let expected = context.parse_date(expected)?;
    let lines = lines
        .iter()
        .map(|raw| parse_line(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let mut book = context.book.clone();
    let ordered_on = context.day.ledger.date;
    let order = PurchaseService::create_order(&mut book, vendor, ordered_on, expected, lines)?;
    context.commit_book(book)?;
    output::success(format!(
        "Created {} for {} ({} items, {}).",
        order.order_number,
        order.vendor,
        order.items.len(),
        context.money(order.total_amount)
    ));
    Ok(())
}

fn find_order<'a>(
    context: &'a ShellContext,
    number: &str,
) -> Result<&'a PurchaseOrder, CommandError> {
    context
        .book
        .order(number)
        .ok_or_else(|| CommandError::Message(format!("No purchase order `{number}`.")))
}

fn show_order(context: &ShellContext, number: &str) -> CommandResult {
    let order = find_order(context, number)?;
    output::section(format!("{} ({})", order.order_number, order.status));
    output::info(format!("  Vendor   : {}", order.vendor));
    output::info(format!("  Ordered  : {}", order.order_date));
    output::info(format!("  Expected : {}", order.expected_delivery));
    if let Some(received) = order.received_on {
        output::info(format!("  Received : {received}"));
    }
    let mut table = Table::new(vec![
        TableColumn::left("Brand"),
        TableColumn::left("Size"),
        TableColumn::right("Qty"),
        TableColumn::right("Rate"),
        TableColumn::right("Amount"),
    ]);
    for item in &order.items {
        table.add_row(vec![
            item.brand.clone(),
            item.size.clone(),
            qty(item.quantity),
            format!("{:.2}", item.rate),
            format!("{:.2}", item.amount),
        ]);
    }
    table.set_footer(vec![
        "Total".into(),
        String::new(),
        qty(order.total_quantity()),
        String::new(),
        format!("{:.2}", order.total_amount),
    ]);
    table.print();
    Ok(())
}

/// Adds the order to the open sheet's purchase column and saves the book
/// before the sheet. If the sheet cannot be written the previous book is put
/// back, so the order stays pending and can be received again. Nothing changes
/// in memory unless both writes succeed.
fn receive_order(context: &mut ShellContext, number: &str) -> CommandResult {
    if context.day.origin == LedgerOrigin::Fallback {
        return Err(CommandError::Message(
            "Storage was unavailable when this sheet opened; reopen the day before receiving."
                .into(),
        ));
    }
    let had_edits = context.day.dirty;
    let mut book = context.book.clone();
    let mut ledger = context.day.ledger.clone();
    let receipt = PurchaseService::receive_order(&mut book, &mut ledger, number)?;

    context.storage.save_book(&book)?;
    if let Err(err) = LedgerEngine::save_loaded(&context.storage, &ledger, context.day.origin) {
        if let Err(rollback) = context.storage.save_book(&context.book) {
            warn!(order = %number, error = %rollback, "could not restore the shop book");
        }
        return Err(err.into());
    }
    context.book = book;
    context.day.ledger = ledger;
    context.day.origin = LedgerOrigin::Saved;
    context.day.dirty = false;

    output::success(format!(
        "Received {} into {}: {} entries updated.",
        number.to_ascii_uppercase(),
        context.day.ledger.date,
        receipt.applied.len()
    ));
    for key in &receipt.skipped {
        output::warning(format!("{key} is not on the sheet and was skipped."));
    }
    if had_edits {
        output::hint("Earlier edits to the sheet were saved along with the receipt.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stock_domain::{OrderStatus, StockKey};

    use stock_core::ShopStorage;

    use crate::cli::core::test_support::{context_on, run};

    use super::parse_line;

    fn setup() -> (tempfile::TempDir, crate::cli::core::ShellContext) {
        let (dir, mut context) = context_on(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        run(&mut context, "vendor add Acme phone=98450").unwrap();
        (dir, context)
    }

    #[test]
    fn order_lines_allow_spaces_and_colons_in_brand() {
        let line = parse_line("Royal Stag:720ML:12:450").unwrap();
        assert_eq!(line.brand, "Royal Stag");
        assert_eq!(line.quantity, dec!(12));
        let line = parse_line("A:B:720ML:1:2").unwrap();
        assert_eq!(line.brand, "A:B");
        assert!(parse_line("IB:720ML:3").is_err());
    }

    #[test]
    fn receiving_adds_to_purchase_and_saves() {
        let (_dir, mut context) = setup();
        run(
            &mut context,
            r#"order new acme 2024-06-03 "Royal Stag:720ML:12:450" IB:90ML:6:100"#,
        )
        .unwrap();
        assert_eq!(context.book.purchase_orders[0].order_number, "PO000001");
        assert_eq!(context.book.purchase_orders[0].total_amount, dec!(6000));

        run(&mut context, "set IB 90ML purchase 2").unwrap();
        run(&mut context, "order receive po000001").unwrap();

        let record = context
            .day
            .ledger
            .record(&StockKey::new("IB", "90ML"))
            .unwrap();
        assert_eq!(record.purchase, dec!(8));
        assert!(!context.day.dirty);
        let order = &context.book.purchase_orders[0];
        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.received_on, NaiveDate::from_ymd_opt(2024, 6, 1));

        assert!(run(&mut context, "order receive PO000001").is_err());
    }

    #[test]
    fn failed_sheet_write_leaves_order_pending() {
        let (_dir, mut context) = setup();
        run(&mut context, "order new Acme 2024-06-03 IB:90ML:6:100").unwrap();
        let days_root = context.storage.paths().days_root.clone();
        std::fs::remove_dir_all(&days_root).unwrap();
        std::fs::write(&days_root, "not a directory").unwrap();

        assert!(run(&mut context, "order receive PO000001").is_err());
        assert_eq!(context.book.purchase_orders[0].status, OrderStatus::Pending);
        let stored = context.storage.load_book().unwrap().unwrap();
        assert_eq!(stored.purchase_orders[0].status, OrderStatus::Pending);
        let record = context.day.ledger.record(&StockKey::new("IB", "90ML")).unwrap();
        assert_eq!(record.purchase, dec!(0));

        std::fs::remove_file(&days_root).unwrap();
        std::fs::create_dir_all(&days_root).unwrap();
        run(&mut context, "order receive PO000001").unwrap();
        let stored = context.storage.load_book().unwrap().unwrap();
        assert_eq!(stored.purchase_orders[0].status, OrderStatus::Received);
    }

    #[test]
    fn vendor_edit_updates_details_and_name() {
        let (_dir, mut context) = setup();
        run(&mut context, "vendor edit acme email=orders@acme.in phone=").unwrap();
        let vendor = &context.book.vendors[0];
        assert_eq!(vendor.email.as_deref(), Some("orders@acme.in"));
        assert_eq!(vendor.phone, None);

        run(&mut context, "vendor add Bharat").unwrap();
        assert!(run(&mut context, "vendor edit Acme name=bharat").is_err());
        assert!(run(&mut context, "vendor edit Acme credit=abc").is_err());
        run(&mut context, r#"vendor edit Acme "name=Acme Liquors" credit=50000"#).unwrap();
        let vendor = &context.book.vendors[0];
        assert_eq!(vendor.name, "Acme Liquors");
        assert_eq!(vendor.credit_limit, dec!(50000));
        let stored = context.storage.load_book().unwrap().unwrap();
        assert_eq!(stored.vendors[0].name, "Acme Liquors");
        assert!(run(&mut context, "vendor edit Nobody phone=1").is_err());
    }

    #[test]
    fn unknown_vendor_is_rejected() {
        let (_dir, mut context) = setup();
        assert!(run(&mut context, "order new Nobody 2024-06-03 IB:90ML:1:1").is_err());
        assert!(context.book.purchase_orders.is_empty());
    }

    #[test]
    fn cancelled_order_cannot_be_received() {
        let (_dir, mut context) = setup();
        run(&mut context, "order new Acme +2 IB:90ML:1:1").unwrap();
        run(&mut context, "order cancel PO000001").unwrap();
        assert!(run(&mut context, "order receive PO000001").is_err());
    }
}
