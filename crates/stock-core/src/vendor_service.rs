use stock_domain::{same_name, ShopBook, Vendor};
use tracing::info;

use crate::{CoreError, CoreResult};

pub struct VendorService;

impl VendorService {
    pub fn add(book: &mut ShopBook, mut vendor: Vendor) -> CoreResult<()> {
        Self::validate(book, &mut vendor, None)?;
        info!(vendor = %vendor.name, "vendor added");
        book.vendors.push(vendor);
        book.touch();
        Ok(())
    }

    /// Replaces the details of the vendor called `name`, keeping its id. A
    /// new name must not clash with another vendor. Orders keep the name they
    /// were placed under. Returns the previous details.
    pub fn update(book: &mut ShopBook, name: &str, mut vendor: Vendor) -> CoreResult<Vendor> {
        let index = Self::index_of(book, name)?;
        Self::validate(book, &mut vendor, Some(index))?;
        vendor.id = book.vendors[index].id;
        let previous = std::mem::replace(&mut book.vendors[index], vendor);
        info!(from = %previous.name, to = %book.vendors[index].name, "vendor updated");
        book.touch();
        Ok(previous)
    }

    /// Removes a vendor. Orders already placed keep the vendor's name.
    pub fn remove(book: &mut ShopBook, name: &str) -> CoreResult<Vendor> {
        let index = Self::index_of(book, name)?;
        let removed = book.vendors.remove(index);
        book.touch();
        Ok(removed)
    }

    pub fn list(book: &ShopBook) -> Vec<&Vendor> {
        book.vendors.iter().collect()
    }

    fn index_of(book: &ShopBook, name: &str) -> CoreResult<usize> {
        book.vendors
            .iter()
            .position(|vendor| same_name(&vendor.name, name))
            .ok_or_else(|| CoreError::VendorNotFound(name.trim().to_string()))
    }

    /// Trims the name and checks it is set and unique, ignoring the vendor at
    /// `skip`.
    fn validate(book: &ShopBook, vendor: &mut Vendor, skip: Option<usize>) -> CoreResult<()> {
        vendor.name = vendor.name.trim().to_string();
        if vendor.name.is_empty() {
            return Err(CoreError::Validation("Vendor name is required".into()));
        }
        let clash = book.vendors.iter().enumerate().any(|(index, existing)| {
            Some(index) != skip && same_name(&existing.name, &vendor.name)
        });
        if clash {
            return Err(CoreError::Validation(format!(
                "Vendor `{}` already exists",
                vendor.name
            )));
        }
        Ok(())
    }
}
