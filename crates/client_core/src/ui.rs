//! Collaborators the controllers drive: navigation, receipt preview, card
//! event binding, and the element handles of the new-bill form.

use shared::domain::BillId;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Bills,
    NewBill,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
            Route::Dashboard => "#admin/dashboard",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn on_navigate(&self, route: Route);
}

/// When a controller leaves the page after persisting a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationPolicy {
    /// Navigate once the update has settled, whatever its outcome.
    #[default]
    AfterSettle,
    /// Navigate only when the update succeeded; stay on the page otherwise.
    OnSuccess,
}

impl NavigationPolicy {
    pub fn allows(&self, update_failed: bool) -> bool {
        match self {
            NavigationPolicy::AfterSettle => true,
            NavigationPolicy::OnSuccess => !update_failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewContent {
    Receipt { url: String, width: u32 },
    NoReceipt,
}

pub trait PreviewSurface: Send + Sync {
    /// Whether the surface can be shown at all.
    fn is_available(&self) -> bool;
    fn width(&self) -> u32;
    fn open(&self, content: PreviewContent);
}

/// Opens the receipt behind `receipt_url` at `width_ratio` of the surface
/// width. Returns the content shown, or `None` when the surface is missing.
pub fn open_receipt_preview(
    surface: &dyn PreviewSurface,
    receipt_url: Option<&str>,
    width_ratio: f64,
) -> Option<PreviewContent> {
    if !surface.is_available() {
        warn!("preview surface unavailable; receipt not shown");
        return None;
    }

    let content = match receipt_url.map(str::trim) {
        Some(url) if !url.is_empty() && !url.contains("null") => PreviewContent::Receipt {
            url: url.to_string(),
            width: (f64::from(surface.width()) * width_ratio).floor() as u32,
        },
        _ => PreviewContent::NoReceipt,
    };
    info!(?content, "opening receipt preview");
    surface.open(content.clone());
    Some(content)
}

/// Attaches the "open detail" click handler to a rendered bill card.
pub trait CardBinder: Send + Sync {
    fn bind_open(&self, bill_id: &BillId);
}

/// A file picked in the receipt input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// Path as reported by the input, e.g. `C:\fakepath\receipt.png`.
    pub path: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl SelectedFile {
    pub fn new(path: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
            mime_type: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.path
            .rsplit(['\\', '/'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Lower-cased extension including the dot, when it is alphanumeric.
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.display_name().rsplit_once('.')?;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(format!(".{}", ext.to_ascii_lowercase()))
    }
}

#[derive(Debug, Default)]
pub struct FileInput {
    selected: Option<SelectedFile>,
}

impl FileInput {
    pub fn select(&mut self, file: SelectedFile) {
        self.selected = Some(file);
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn value(&self) -> &str {
        self.selected.as_ref().map_or("", |f| f.path.as_str())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[derive(Debug, Default)]
pub struct ErrorIndicator {
    visible: bool,
    text: String,
}

impl ErrorIndicator {
    pub fn show(&mut self, text: impl Into<String>) {
        self.visible = true;
        self.text = text.into();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.text.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
