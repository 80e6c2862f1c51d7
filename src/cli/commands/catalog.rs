use stock_core::{CatalogService, PriceService};

use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::cli::table::{Table, TableColumn};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "brand",
            "List and edit brands",
            "brand [list|add <name>|rename <from> <to>|remove <name>]",
            cmd_brand,
        ),
        CommandEntry::new(
            "size",
            "List and edit bottle sizes",
            "size [list|add <size>|remove <size>|set <size,...>]",
            cmd_size,
        ),
        CommandEntry::new(
            "price",
            "List and edit selling prices",
            "price [list|set <brand> <size> <price>|reset]",
            cmd_price,
        ),
    ]
}

fn cmd_brand(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut book = context.book.clone();
    match args {
        [] | ["list"] => {
            output::section(format!("Brands ({})", context.book.brands.len()));
            for (index, brand) in context.book.brands.iter().enumerate() {
                output::info(format!("  {:>2}. {}", index + 1, brand.name));
            }
            return Ok(());
        }
        ["add", name] => {
            let brand = CatalogService::add_brand(&mut book, name)?;
            output::success(format!("Added brand `{}`.", brand.name));
        }
        ["rename", from, to] => {
            CatalogService::rename_brand(&mut book, from, to)?;
            output::success(format!("Renamed `{from}` to `{to}`."));
            output::hint("Stock saved under the old name stays with the old name.");
        }
        ["remove", name] => {
            let removed = CatalogService::remove_brand(&mut book, name)?;
            output::success(format!("Removed brand `{}`.", removed.name));
        }
        _ => {
            return Err(CommandError::usage(
                "brand [list|add <name>|rename <from> <to>|remove <name>]",
            ))
        }
    }
    context.commit_book(book)?;
    context.realign_day()
}

fn cmd_size(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let mut book = context.book.clone();
    match args {
        [] | ["list"] => {
            output::section("Sizes");
            output::info(format!("  {}", context.book.sizes.join(", ")));
            return Ok(());
        }
        ["add", size] => {
            CatalogService::add_size(&mut book, size)?;
            output::success(format!("Added size `{}`.", size.trim()));
        }
        ["remove", size] => {
            let removed = CatalogService::remove_size(&mut book, size)?;
            output::success(format!("Removed size `{removed}`."));
        }
        ["set", sizes @ ..] if !sizes.is_empty() => {
            let sizes: Vec<&str> = sizes
                .iter()
                .flat_map(|chunk| chunk.split(','))
                .collect();
            CatalogService::set_sizes(&mut book, sizes)?;
            output::success(format!("Sizes are now {}.", book.sizes.join(", ")));
        }
        _ => {
            return Err(CommandError::usage(
                "size [list|add <size>|remove <size>|set <size,...>]",
            ))
        }
    }
    context.commit_book(book)?;
    context.realign_day()
}

fn cmd_price(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] | ["list"] => {
            let mut table = Table::new(vec![
                TableColumn::left("Brand"),
                TableColumn::left("Size"),
                TableColumn::right("Price"),
            ]);
            for entry in PriceService::list(&context.book) {
                table.add_row(vec![
                    entry.brand,
                    entry.size,
                    format!("{:.2}", entry.price),
                ]);
            }
            output::section(format!("Prices ({})", context.config.currency));
            table.print();
            Ok(())
        }
        ["set", brand, size, price] => {
            let mut book = context.book.clone();
            let (key, price) = PriceService::set(&mut book, brand, size, *price)?;
            context.commit_book(book)?;
            output::success(format!("{key} now sells at {}.", context.money(price)));
            Ok(())
        }
        ["reset"] => {
            let mut book = context.book.clone();
            PriceService::reset(&mut book);
            context.commit_book(book)?;
            output::success("All prices reset to zero.");
            Ok(())
        }
        _ => Err(CommandError::usage(
            "price [list|set <brand> <size> <price>|reset]",
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use stock_core::ShopStorage;
    use stock_domain::StockKey;

    use crate::cli::core::test_support::{context_on, run};

    fn first_of_june() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn new_brand_appears_on_clean_sheet() {
        let (_dir, mut context) = context_on(first_of_june());
        run(&mut context, r#"brand add "Old Monk""#).unwrap();
        assert_eq!(context.day.ledger.len(), 52);
        assert!(context
            .day
            .ledger
            .record(&StockKey::new("Old Monk", "90ML"))
            .is_some());
        let stored = context.storage.load_book().unwrap().unwrap();
        assert!(stored.brand("old monk").is_some());
    }

    #[test]
    fn edited_sheet_keeps_values_when_catalog_grows() {
        let (_dir, mut context) = context_on(first_of_june());
        run(&mut context, "set IB 720ML opening 6").unwrap();
        run(&mut context, "size add 1L").unwrap();
        assert_eq!(context.day.ledger.len(), 60);
        assert!(context.day.dirty);
        let record = context.day.ledger.record(&StockKey::new("IB", "720ML")).unwrap();
        assert_eq!(record.opening_balance, dec!(6));
    }

    #[test]
    fn size_set_replaces_the_list() {
        let (_dir, mut context) = context_on(first_of_june());
        run(&mut context, "size set 750ML,375ML 750ml").unwrap();
        assert_eq!(context.book.sizes, vec!["750ML", "375ML"]);
        assert_eq!(context.day.ledger.len(), 24);
    }

    #[test]
    fn duplicate_brand_leaves_book_untouched() {
        let (_dir, mut context) = context_on(first_of_june());
        let before = context.book.clone();
        assert!(run(&mut context, "brand add ib").is_err());
        assert_eq!(context.book, before);
    }

    #[test]
    fn price_set_uses_catalog_spelling() {
        let (_dir, mut context) = context_on(first_of_june());
        run(&mut context, "price set ib 720ml 450.5").unwrap();
        assert_eq!(
            context.book.prices.price_of(&StockKey::new("IB", "720ML")),
            dec!(450.5)
        );
    }
}
