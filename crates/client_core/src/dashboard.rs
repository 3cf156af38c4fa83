//! Review controller: status groups for the administrator, bill detail, and
//! the accept/refuse transition.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use shared::domain::{Bill, BillId, BillStatus, ReviewDecision};
use tracing::{debug, error, info, warn};

use crate::{
    bills::BillsPage,
    error::{ReviewError, StoreError},
    format::display_date,
    store::{BillStore, Persistence},
    ui::{
        open_receipt_preview, CardBinder, NavigationPolicy, Navigator, PreviewContent,
        PreviewSurface, Route,
    },
};

const RECEIPT_WIDTH_RATIO: f64 = 0.8;

/// The three collapsible sections of the dashboard, indexed 1 to 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusGroup {
    Pending = 1,
    Accepted = 2,
    Refused = 3,
}

impl StatusGroup {
    pub const ALL: [StatusGroup; 3] = [
        StatusGroup::Pending,
        StatusGroup::Accepted,
        StatusGroup::Refused,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(StatusGroup::Pending),
            2 => Some(StatusGroup::Accepted),
            3 => Some(StatusGroup::Refused),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn status(self) -> BillStatus {
        match self {
            StatusGroup::Pending => BillStatus::Pending,
            StatusGroup::Accepted => BillStatus::Accepted,
            StatusGroup::Refused => BillStatus::Refused,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arrow {
    #[default]
    Collapsed,
    Open,
}

impl Arrow {
    pub fn rotation_degrees(self) -> u16 {
        match self {
            Arrow::Collapsed => 90,
            Arrow::Open => 0,
        }
    }
}

/// Summary of a bill as shown in a group's card list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillCard {
    pub bill_id: BillId,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub amount: i64,
    pub date: String,
    pub expense_type: String,
}

impl BillCard {
    /// `None` for records the store has not assigned an id to.
    pub fn from_bill(bill: &Bill) -> Option<Self> {
        let bill_id = bill.id.clone()?;
        let local = bill.email.split('@').next().unwrap_or_default();
        let (first_name, last_name) = match local.split_once('.') {
            Some((first, rest)) => (
                first.to_string(),
                rest.split('.').next().unwrap_or_default().to_string(),
            ),
            None => (String::new(), local.to_string()),
        };
        Some(Self {
            bill_id,
            first_name,
            last_name,
            name: bill.name.clone(),
            amount: bill.amount,
            date: display_date(&bill.date),
            expense_type: bill.expense_type.clone(),
        })
    }
}

/// Which bills an administrator reviews: everything except their own and
/// the configured test accounts.
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    excluded: HashSet<String>,
}

impl ReviewFilter {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn excluding<I, S>(admin_email: &str, test_accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut excluded: HashSet<String> = test_accounts.into_iter().map(Into::into).collect();
        excluded.insert(admin_email.to_string());
        Self { excluded }
    }

    pub fn admits(&self, bill: &Bill) -> bool {
        !self.excluded.contains(&bill.email)
    }
}

pub fn filtered_bills<'a>(
    bills: &'a [Bill],
    status: BillStatus,
    filter: &ReviewFilter,
) -> Vec<&'a Bill> {
    bills
        .iter()
        .filter(|bill| bill.status == status && filter.admits(bill))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct GroupState {
    expanded: bool,
    cards: Vec<BillCard>,
}

impl GroupState {
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn arrow(&self) -> Arrow {
        if self.expanded {
            Arrow::Open
        } else {
            Arrow::Collapsed
        }
    }

    /// Cards rendered in the group's container; empty while collapsed.
    pub fn cards(&self) -> &[BillCard] {
        &self.cards
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DetailView {
    #[default]
    Placeholder,
    Form(Bill),
}

#[derive(Debug)]
pub struct ReviewReport {
    pub bill: Bill,
    pub persistence: Persistence,
    pub navigated: bool,
}

pub struct DashboardController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    preview: Arc<dyn PreviewSurface>,
    binder: Arc<dyn CardBinder>,
    filter: ReviewFilter,
    policy: NavigationPolicy,
    bills: Vec<Bill>,
    groups: BTreeMap<StatusGroup, GroupState>,
    bound: HashSet<BillId>,
    open_bill: Option<BillId>,
    detail: DetailView,
}

impl DashboardController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        preview: Arc<dyn PreviewSurface>,
        binder: Arc<dyn CardBinder>,
        filter: ReviewFilter,
        bills: Vec<Bill>,
    ) -> Self {
        Self {
            store,
            navigator,
            preview,
            binder,
            filter,
            policy: NavigationPolicy::default(),
            bills,
            groups: StatusGroup::ALL
                .into_iter()
                .map(|group| (group, GroupState::default()))
                .collect(),
            bound: HashSet::new(),
            open_bill: None,
            detail: DetailView::Placeholder,
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn group(&self, group: StatusGroup) -> &GroupState {
        &self.groups[&group]
    }

    pub fn detail(&self) -> &DetailView {
        &self.detail
    }

    /// The highlighted card, if a bill's detail is open.
    pub fn open_bill(&self) -> Option<&BillId> {
        self.open_bill.as_ref()
    }

    pub fn is_bound(&self, bill_id: &BillId) -> bool {
        self.bound.contains(bill_id)
    }

    /// Expands a collapsed group (rendering its cards) or collapses an
    /// expanded one (clearing them).
    pub fn handle_show_tickets(&mut self, group: StatusGroup) -> &GroupState {
        if self.groups[&group].expanded {
            if let Some(state) = self.groups.get_mut(&group) {
                state.expanded = false;
                state.cards.clear();
            }
            debug!(group = group.index(), "status group collapsed");
        } else {
            self.render_group(group);
        }
        &self.groups[&group]
    }

    fn render_group(&mut self, group: StatusGroup) {
        let cards: Vec<BillCard> = filtered_bills(&self.bills, group.status(), &self.filter)
            .into_iter()
            .filter_map(BillCard::from_bill)
            .collect();

        for card in &cards {
            if self.bound.insert(card.bill_id.clone()) {
                self.binder.bind_open(&card.bill_id);
            }
        }

        debug!(group = group.index(), cards = cards.len(), "status group expanded");
        if let Some(state) = self.groups.get_mut(&group) {
            state.expanded = true;
            state.cards = cards;
        }
    }

    /// Opens the clicked bill's detail, or closes it when it is already open.
    pub fn handle_edit_ticket(&mut self, bill_id: &BillId) -> Result<&DetailView, ReviewError> {
        let bill = self.find(bill_id)?.clone();
        if self.open_bill.as_ref() == Some(bill_id) {
            self.open_bill = None;
            self.detail = DetailView::Placeholder;
        } else {
            self.open_bill = Some(bill_id.clone());
            self.detail = DetailView::Form(bill);
        }
        Ok(&self.detail)
    }

    /// Previews the receipt of the bill whose detail is open.
    pub fn handle_click_icon_eye(&self) -> Option<PreviewContent> {
        let DetailView::Form(bill) = &self.detail else {
            return None;
        };
        open_receipt_preview(
            self.preview.as_ref(),
            bill.file_url.as_deref(),
            RECEIPT_WIDTH_RATIO,
        )
    }

    pub async fn handle_accept_submit(
        &mut self,
        bill_id: &BillId,
        comment: &str,
    ) -> Result<ReviewReport, ReviewError> {
        self.review(bill_id, ReviewDecision::Accept, comment).await
    }

    pub async fn handle_refuse_submit(
        &mut self,
        bill_id: &BillId,
        comment: &str,
    ) -> Result<ReviewReport, ReviewError> {
        self.review(bill_id, ReviewDecision::Refuse, comment).await
    }

    async fn review(
        &mut self,
        bill_id: &BillId,
        decision: ReviewDecision,
        comment: &str,
    ) -> Result<ReviewReport, ReviewError> {
        let bill = self.find(bill_id)?;
        let id = bill.id.clone().ok_or(ReviewError::MissingId)?;
        let reviewed = bill.reviewed(decision, comment).map_err(|err| {
            warn!(bill_id = %id, error = %err, "review refused");
            err
        })?;

        let persistence = match &self.store {
            Some(store) => match store.update(&id, &reviewed).await {
                Ok(stored) => {
                    info!(bill_id = %id, status = %reviewed.status, "bill reviewed");
                    if let Some(local) = self.bills.iter_mut().find(|b| b.id.as_ref() == Some(&id)) {
                        *local = reviewed.clone();
                    }
                    Persistence::Stored(stored)
                }
                Err(err) => {
                    error!(bill_id = %id, error = %err, "bill review update failed");
                    Persistence::Failed(err.to_string())
                }
            },
            None => Persistence::Skipped,
        };

        let navigated = self.policy.allows(persistence.is_failed());
        if navigated {
            self.open_bill = None;
            self.detail = DetailView::Placeholder;
            self.navigator.on_navigate(Route::Dashboard);
        }

        Ok(ReviewReport {
            bill: reviewed,
            persistence,
            navigated,
        })
    }

    /// Lists every user's bills. `Ok(None)` when no store is configured.
    pub async fn get_bills_all_users(&self) -> Result<Option<Vec<Bill>>, StoreError> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        match store.list().await {
            Ok(bills) => {
                info!(count = bills.len(), "dashboard bills listed");
                Ok(Some(bills))
            }
            Err(err) => {
                error!(error = %err, "dashboard listing failed");
                Err(err)
            }
        }
    }

    /// Lists every user's bills into a page. On success the dashboard's
    /// bills are replaced and the expanded groups re-rendered; a failed
    /// listing leaves them untouched and carries the banner message.
    pub async fn load_page(&mut self) -> BillsPage<Bill> {
        let listing = self.get_bills_all_users().await;
        if let Ok(Some(bills)) = &listing {
            self.bills = bills.clone();
            let expanded: Vec<StatusGroup> = self
                .groups
                .iter()
                .filter(|(_, state)| state.expanded)
                .map(|(group, _)| *group)
                .collect();
            for group in expanded {
                self.render_group(group);
            }
        }
        BillsPage::from_listing(listing)
    }

    fn find(&self, bill_id: &BillId) -> Result<&Bill, ReviewError> {
        self.bills
            .iter()
            .find(|bill| bill.id.as_ref() == Some(bill_id))
            .ok_or_else(|| ReviewError::UnknownBill(bill_id.clone()))
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
