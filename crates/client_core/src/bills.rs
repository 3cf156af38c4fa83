//! Listing controller for the employee's own bills.

use std::sync::Arc;

use shared::domain::Bill;
use tracing::{debug, info, warn};

use crate::{
    error::StoreError,
    format::{format_date, format_status},
    store::BillStore,
    ui::{open_receipt_preview, Navigator, PreviewContent, PreviewSurface, Route},
};

const RECEIPT_WIDTH_RATIO: f64 = 0.5;

/// A bill with its date and status prepared for display. `bill` keeps the
/// canonical stored values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBill {
    pub bill: Bill,
    pub date: String,
    pub status: &'static str,
}

impl DisplayBill {
    pub fn from_bill(bill: Bill) -> Self {
        let date = match format_date(&bill.date) {
            Ok(formatted) => formatted,
            Err(err) => {
                warn!(
                    bill_id = ?bill.id,
                    date = %bill.date,
                    error = %err,
                    "bill date not formatted; showing raw value"
                );
                bill.date.clone()
            }
        };
        let status = format_status(bill.status);
        Self { bill, date, status }
    }
}

/// What a bills page shows once its listing call settles.
#[derive(Debug)]
pub enum BillsPage<T> {
    Loaded(Vec<T>),
    Error(String),
}

impl<T> BillsPage<T> {
    pub fn from_listing(result: Result<Option<Vec<T>>, StoreError>) -> Self {
        match result {
            Ok(rows) => BillsPage::Loaded(rows.unwrap_or_default()),
            Err(err) => BillsPage::Error(err.to_string()),
        }
    }

    pub fn error_banner(&self) -> Option<&str> {
        match self {
            BillsPage::Error(message) => Some(message),
            BillsPage::Loaded(_) => None,
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            BillsPage::Loaded(rows) => rows,
            BillsPage::Error(_) => &[],
        }
    }
}

pub struct BillsController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    preview: Arc<dyn PreviewSurface>,
}

impl BillsController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        preview: Arc<dyn PreviewSurface>,
    ) -> Self {
        Self {
            store,
            navigator,
            preview,
        }
    }

    pub fn handle_click_new_bill(&self) {
        self.navigator.on_navigate(Route::NewBill);
    }

    pub fn handle_click_icon_eye(&self, receipt_url: Option<&str>) -> Option<PreviewContent> {
        open_receipt_preview(self.preview.as_ref(), receipt_url, RECEIPT_WIDTH_RATIO)
    }

    /// Lists the signed-in employee's bills, latest first. `Ok(None)` when no
    /// store is configured; listing failures are returned to the page.
    pub async fn get_bills(&self) -> Result<Option<Vec<DisplayBill>>, StoreError> {
        let Some(store) = &self.store else {
            debug!("no bill store configured; nothing to list");
            return Ok(None);
        };

        let mut bills = store.list().await?;
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        info!(count = bills.len(), "bills listed");
        Ok(Some(bills.into_iter().map(DisplayBill::from_bill).collect()))
    }

    pub async fn load_page(&self) -> BillsPage<DisplayBill> {
        BillsPage::from_listing(self.get_bills().await)
    }
}

#[cfg(test)]
#[path = "tests/bills_tests.rs"]
mod tests;
