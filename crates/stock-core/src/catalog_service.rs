use stock_domain::{same_name, Brand, Catalog, ShopBook};
use tracing::info;

use crate::{CoreError, CoreResult};

pub struct CatalogService;

impl CatalogService {
    pub fn catalog(book: &ShopBook) -> Catalog {
        book.catalog()
    }

    pub fn add_brand(book: &mut ShopBook, name: &str) -> CoreResult<Brand> {
        let name = Self::clean_name(name, "Brand")?;
        Self::ensure_unique_brand(book, &name, None)?;
        let brand = Brand::new(name);
        book.brands.push(brand.clone());
        book.touch();
        info!(brand = %brand.name, "brand added");
        Ok(brand)
    }

    /// Renames a brand and moves its prices along. Stock records saved under
    /// the old name are left as they are.
    pub fn rename_brand(book: &mut ShopBook, from: &str, to: &str) -> CoreResult<()> {
        let to = Self::clean_name(to, "Brand")?;
        let index = Self::brand_index(book, from)?;
        let current = book.brands[index].name.clone();
        Self::ensure_unique_brand(book, &to, Some(index))?;
        book.brands[index].name = to.clone();
        book.prices.rename_brand(&current, &to);
        book.touch();
        info!(from = %current, to = %to, "brand renamed");
        Ok(())
    }

    pub fn remove_brand(book: &mut ShopBook, name: &str) -> CoreResult<Brand> {
        let index = Self::brand_index(book, name)?;
        let removed = book.brands.remove(index);
        book.prices.remove_brand(&removed.name);
        book.touch();
        info!(brand = %removed.name, "brand removed");
        Ok(removed)
    }

    pub fn add_size(book: &mut ShopBook, size: &str) -> CoreResult<()> {
        let size = Self::clean_name(size, "Size")?;
        if book.sizes.iter().any(|existing| same_name(existing, &size)) {
            return Err(CoreError::Validation(format!(
                "Size `{}` already exists",
                size
            )));
        }
        book.sizes.push(size);
        book.touch();
        Ok(())
    }

    pub fn remove_size(book: &mut ShopBook, size: &str) -> CoreResult<String> {
        let index = book
            .sizes
            .iter()
            .position(|existing| same_name(existing, size))
            .ok_or_else(|| CoreError::Validation(format!("Size `{}` not found", size.trim())))?;
        let removed = book.sizes.remove(index);
        book.touch();
        Ok(removed)
    }

    /// Replaces the size list. Duplicates and blanks are dropped.
    pub fn set_sizes<I, S>(book: &mut ShopBook, sizes: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for size in sizes {
            let size = size.as_ref().trim();
            if size.is_empty() || cleaned.iter().any(|existing| same_name(existing, size)) {
                continue;
            }
            cleaned.push(size.to_string());
        }
        if cleaned.is_empty() {
            return Err(CoreError::Validation(
                "At least one size is required".into(),
            ));
        }
        book.sizes = cleaned;
        book.touch();
        Ok(())
    }

    fn clean_name(candidate: &str, what: &str) -> CoreResult<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(format!("{what} name is required")));
        }
        Ok(trimmed.to_string())
    }

    fn brand_index(book: &ShopBook, name: &str) -> CoreResult<usize> {
        book.brands
            .iter()
            .position(|brand| same_name(&brand.name, name))
            .ok_or_else(|| CoreError::BrandNotFound(name.trim().to_string()))
    }

    fn ensure_unique_brand(book: &ShopBook, name: &str, exclude: Option<usize>) -> CoreResult<()> {
        let duplicate = book
            .brands
            .iter()
            .enumerate()
            .any(|(index, brand)| same_name(&brand.name, name) && exclude != Some(index));
        if duplicate {
            Err(CoreError::Validation(format!(
                "Brand `{}` already exists",
                name
            )))
        } else {
            Ok(())
        }
    }
}
