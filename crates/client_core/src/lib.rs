//! Expense-report client core: the repository client, session lookup, and
//! the submission, listing, and review controllers.

pub mod bills;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod new_bill;
pub mod session;
pub mod store;
pub mod ui;

pub use bills::{BillsController, BillsPage, DisplayBill};
pub use dashboard::{DashboardController, ReviewFilter, StatusGroup};
pub use error::{ReviewError, SessionError, StoreError, SubmitError};
pub use new_bill::{BillForm, NewBillController};
pub use session::{current_user, MemorySessionStore, SessionStore};
pub use store::{BillStore, HttpBillStore, Persistence, UploadPayload};
pub use ui::{CardBinder, NavigationPolicy, Navigator, PreviewContent, PreviewSurface, Route};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
