//! Submission controller: receipt validation and upload, then the final bill
//! update.

use std::sync::Arc;

use shared::domain::{Bill, BillId, BillStatus};
use tracing::{error, info, warn};

use crate::{
    error::{SessionError, SubmitError},
    format::parse_leading_int,
    session::{current_user, SessionStore},
    store::{BillStore, Persistence, UploadPayload},
    ui::{ErrorIndicator, FileInput, NavigationPolicy, Navigator, Route, SelectedFile},
};

pub const ALLOWED_RECEIPT_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];
pub const FILE_FORMAT_ERROR: &str = "Fichier au format .jpg, .jpeg ou .png uniquement";
pub const DEFAULT_PCT: i64 = 20;

/// Raw field values of the new-bill form at the moment it is submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillForm {
    pub expense_type: String,
    pub name: String,
    pub date: String,
    pub amount: String,
    pub vat: String,
    pub pct: String,
    pub commentary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    FileSelected,
    FileValidated,
    FileRejected,
    Submitted,
}

/// What a successful receipt upload leaves behind for the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub bill_id: BillId,
    pub file_url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSelection {
    Rejected,
    Uploaded(PendingUpload),
    UploadFailed,
    /// Valid file, but no store is configured.
    NotUploaded,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub bill: Bill,
    pub persistence: Persistence,
    pub navigated: bool,
}

pub struct NewBillController {
    store: Option<Arc<dyn BillStore>>,
    navigator: Arc<dyn Navigator>,
    session: Arc<dyn SessionStore>,
    policy: NavigationPolicy,
    file_input: FileInput,
    file_error: ErrorIndicator,
    pending: Option<PendingUpload>,
    state: SubmissionState,
}

impl NewBillController {
    pub fn new(
        store: Option<Arc<dyn BillStore>>,
        navigator: Arc<dyn Navigator>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            store,
            navigator,
            session,
            policy: NavigationPolicy::default(),
            file_input: FileInput::default(),
            file_error: ErrorIndicator::default(),
            pending: None,
            state: SubmissionState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn file_input(&self) -> &FileInput {
        &self.file_input
    }

    pub fn file_error(&self) -> &ErrorIndicator {
        &self.file_error
    }

    pub fn pending_upload(&self) -> Option<&PendingUpload> {
        self.pending.as_ref()
    }

    pub async fn handle_change_file(
        &mut self,
        file: SelectedFile,
    ) -> Result<FileSelection, SessionError> {
        self.state = SubmissionState::FileSelected;
        let extension = file.extension();
        let allowed = extension
            .as_deref()
            .is_some_and(|ext| ALLOWED_RECEIPT_EXTENSIONS.contains(&ext));

        if !allowed {
            info!(file = %file.display_name(), "receipt rejected: unsupported format");
            self.file_input.clear();
            self.file_error.show(FILE_FORMAT_ERROR);
            self.state = SubmissionState::FileRejected;
            return Ok(FileSelection::Rejected);
        }

        self.file_error.hide();
        self.file_input.select(file.clone());
        self.state = SubmissionState::FileValidated;
        self.pending = None;

        let email = current_user(self.session.as_ref())?.email;
        let Some(store) = &self.store else {
            warn!("no bill store configured; receipt not uploaded");
            return Ok(FileSelection::NotUploaded);
        };

        let file_name = file.display_name().to_string();
        let payload = UploadPayload {
            file_name: file_name.clone(),
            bytes: file.bytes,
            mime_type: file.mime_type,
            email,
        };
        match store.create(payload).await {
            Ok(response) => {
                info!(bill_id = %response.key, file = %file_name, "receipt uploaded");
                let pending = PendingUpload {
                    bill_id: response.key,
                    file_url: response.file_url,
                    file_name,
                };
                self.pending = Some(pending.clone());
                Ok(FileSelection::Uploaded(pending))
            }
            Err(err) => {
                error!(error = %err, file = %file_name, "receipt upload failed");
                Ok(FileSelection::UploadFailed)
            }
        }
    }

    pub async fn handle_submit(&mut self, form: &BillForm) -> Result<SubmitOutcome, SubmitError> {
        let bill = self.build_bill(form)?;
        self.state = SubmissionState::Submitted;

        let persistence = match &self.store {
            Some(store) => {
                let bill_id = self
                    .pending
                    .as_ref()
                    .map(|pending| pending.bill_id.clone())
                    .unwrap_or_else(BillId::unassigned);
                if bill_id.is_unassigned() {
                    warn!("submitting without an uploaded receipt record");
                }
                match store.update(&bill_id, &bill).await {
                    Ok(stored) => {
                        info!(%bill_id, "bill submitted");
                        Persistence::Stored(stored)
                    }
                    Err(err) => {
                        error!(error = %err, %bill_id, "bill submission failed");
                        Persistence::Failed(err.to_string())
                    }
                }
            }
            None => Persistence::Skipped,
        };

        let navigated = self.policy.allows(persistence.is_failed());
        if navigated {
            self.navigator.on_navigate(Route::Bills);
        }

        Ok(SubmitOutcome {
            bill,
            persistence,
            navigated,
        })
    }

    fn build_bill(&self, form: &BillForm) -> Result<Bill, SubmitError> {
        for (field, value) in [
            ("type", &form.expense_type),
            ("date", &form.date),
            ("amount", &form.amount),
        ] {
            if value.trim().is_empty() {
                return Err(SubmitError::MissingField(field));
            }
        }
        let amount = parse_leading_int(&form.amount)
            .ok_or_else(|| SubmitError::InvalidAmount(form.amount.clone()))?;
        let pct = parse_leading_int(&form.pct).unwrap_or(DEFAULT_PCT);
        let email = current_user(self.session.as_ref())?.email;

        let (file_url, file_name) = match &self.pending {
            Some(pending) => (
                Some(pending.file_url.clone()),
                Some(pending.file_name.clone()),
            ),
            None => (None, None),
        };

        Ok(Bill {
            id: None,
            email,
            expense_type: form.expense_type.clone(),
            name: form.name.clone(),
            date: form.date.clone(),
            amount,
            vat: form.vat.clone(),
            pct,
            commentary: form.commentary.clone(),
            comment_admin: None,
            file_url,
            file_name,
            status: BillStatus::Pending,
        })
    }
}

#[cfg(test)]
#[path = "tests/new_bill_tests.rs"]
mod tests;
