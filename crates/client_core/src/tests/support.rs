use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use shared::{
    domain::{Bill, BillId, BillStatus, UserType},
    protocol::{UploadResponse, UserRecord},
};

use crate::{
    error::StoreError,
    session::MemorySessionStore,
    store::{BillStore, UploadPayload},
    ui::{CardBinder, Navigator, PreviewContent, PreviewSurface, Route},
};

pub struct FakeStore {
    bills: Vec<Bill>,
    list_error: Option<String>,
    create_error: Option<String>,
    update_error: Option<String>,
    upload: UploadResponse,
    pub creates: Mutex<Vec<UploadPayload>>,
    pub updates: Mutex<Vec<(BillId, Bill)>>,
    pub lists: Mutex<u32>,
}

impl FakeStore {
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills,
            list_error: None,
            create_error: None,
            update_error: None,
            upload: UploadResponse {
                file_url: "https://localhost:3456/images/test.jpg".into(),
                key: BillId::new("1234"),
            },
            creates: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
            lists: Mutex::new(0),
        }
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.into());
        self
    }

    pub fn failing_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.into());
        self
    }

    pub fn failing_update(mut self, message: &str) -> Self {
        self.update_error = Some(message.into());
        self
    }

    pub fn create_calls(&self) -> Vec<UploadPayload> {
        self.creates.lock().expect("creates").clone()
    }

    pub fn update_calls(&self) -> Vec<(BillId, Bill)> {
        self.updates.lock().expect("updates").clone()
    }
}

#[async_trait]
impl BillStore for FakeStore {
    async fn list(&self) -> Result<Vec<Bill>, StoreError> {
        *self.lists.lock().expect("lists") += 1;
        if let Some(message) = &self.list_error {
            return Err(StoreError::rejected(500, message.clone()));
        }
        Ok(self.bills.clone())
    }

    async fn create(&self, payload: UploadPayload) -> Result<UploadResponse, StoreError> {
        self.creates.lock().expect("creates").push(payload);
        if let Some(message) = &self.create_error {
            return Err(StoreError::rejected(500, message.clone()));
        }
        Ok(self.upload.clone())
    }

    async fn update(&self, id: &BillId, bill: &Bill) -> Result<Bill, StoreError> {
        self.updates
            .lock()
            .expect("updates")
            .push((id.clone(), bill.clone()));
        if id.is_unassigned() {
            return Err(StoreError::Unassigned);
        }
        if let Some(message) = &self.update_error {
            return Err(StoreError::rejected(500, message.clone()));
        }
        Ok(Bill {
            id: Some(id.clone()),
            ..bill.clone()
        })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().expect("routes").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn on_navigate(&self, route: Route) {
        self.routes.lock().expect("routes").push(route);
    }
}

pub struct RecordingPreview {
    available: bool,
    opened: Mutex<Vec<PreviewContent>>,
}

impl RecordingPreview {
    pub fn available() -> Self {
        Self {
            available: true,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn opened(&self) -> Vec<PreviewContent> {
        self.opened.lock().expect("opened").clone()
    }
}

impl PreviewSurface for RecordingPreview {
    fn is_available(&self) -> bool {
        self.available
    }

    fn width(&self) -> u32 {
        1000
    }

    fn open(&self, content: PreviewContent) {
        self.opened.lock().expect("opened").push(content);
    }
}

#[derive(Default)]
pub struct RecordingBinder {
    handlers: Mutex<HashMap<BillId, u32>>,
}

impl RecordingBinder {
    pub fn handler_count(&self, bill_id: &BillId) -> u32 {
        self.handlers
            .lock()
            .expect("handlers")
            .get(bill_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.handlers.lock().expect("handlers").values().sum()
    }
}

impl CardBinder for RecordingBinder {
    fn bind_open(&self, bill_id: &BillId) {
        *self
            .handlers
            .lock()
            .expect("handlers")
            .entry(bill_id.clone())
            .or_insert(0) += 1;
    }
}

pub fn session_for(user_type: UserType, email: &str) -> Arc<MemorySessionStore> {
    Arc::new(
        MemorySessionStore::with_user(&UserRecord {
            user_type,
            email: email.into(),
        })
        .expect("session"),
    )
}

fn fixture(
    id: &str,
    expense_type: &str,
    name: &str,
    date: &str,
    amount: i64,
    status: BillStatus,
    email: &str,
) -> Bill {
    Bill {
        id: Some(BillId::new(id)),
        email: email.into(),
        expense_type: expense_type.into(),
        name: name.into(),
        date: date.into(),
        amount,
        vat: "20".into(),
        pct: 20,
        commentary: String::new(),
        comment_admin: None,
        file_url: Some(format!("https://firebasestorage.test/{id}.jpg")),
        file_name: Some(format!("{id}.jpg")),
        status,
    }
}

/// Four employee bills, the first one being the most recent.
pub fn fixture_bills() -> Vec<Bill> {
    vec![
        fixture(
            "47qAXb6fIm2zOKkLzMro",
            "Hôtel et logement",
            "encore",
            "2004-04-04",
            400,
            BillStatus::Pending,
            "a@a",
        ),
        fixture(
            "BeKy5Mo4jkmdfPGYpTxZ",
            "Transports",
            "test1",
            "2001-01-01",
            100,
            BillStatus::Refused,
            "a@a",
        ),
        fixture(
            "UIUZtnPQvnbFnB0ozvJh",
            "Services en ligne",
            "test3",
            "2003-03-03",
            300,
            BillStatus::Accepted,
            "a@a",
        ),
        fixture(
            "qcCK3SzECmaZAGRrHjaC",
            "Restaurants et bars",
            "test2",
            "2002-02-02",
            200,
            BillStatus::Refused,
            "a@a",
        ),
    ]
}

/// Bills from several employees for dashboard tests.
pub fn dashboard_bills() -> Vec<Bill> {
    vec![
        fixture(
            "p1",
            "Transports",
            "train",
            "2022-05-01",
            120,
            BillStatus::Pending,
            "jane.doe@company.tld",
        ),
        fixture(
            "p2",
            "Restaurants et bars",
            "lunch",
            "2022-05-03",
            35,
            BillStatus::Pending,
            "bob@company.tld",
        ),
        fixture(
            "a1",
            "Hôtel et logement",
            "hotel",
            "2022-04-10",
            240,
            BillStatus::Accepted,
            "jane.doe@company.tld",
        ),
        fixture(
            "r1",
            "Equipement et matériel",
            "chair",
            "2022-03-22",
            90,
            BillStatus::Refused,
            "bob@company.tld",
        ),
        fixture(
            "t1",
            "Transports",
            "taxi",
            "2022-05-02",
            40,
            BillStatus::Pending,
            "employee@test.tld",
        ),
        fixture(
            "s1",
            "Transports",
            "own",
            "2022-05-04",
            60,
            BillStatus::Pending,
            "admin@company.tld",
        ),
    ]
}
