//! Terminal stand-ins for the page collaborators the controllers drive.

use std::sync::Mutex;

use client_core::{CardBinder, Navigator, PreviewContent, PreviewSurface, Route};
use shared::domain::BillId;
use tracing::{debug, info};

const TERMINAL_WIDTH: u32 = 100;

#[derive(Default)]
pub struct TerminalNavigator {
    current: Mutex<Option<Route>>,
}

impl TerminalNavigator {
    pub fn current(&self) -> Option<Route> {
        self.current.lock().ok().and_then(|route| *route)
    }
}

impl Navigator for TerminalNavigator {
    fn on_navigate(&self, route: Route) {
        info!(path = route.path(), "navigating");
        if let Ok(mut current) = self.current.lock() {
            *current = Some(route);
        }
    }
}

pub struct TerminalPreview;

impl PreviewSurface for TerminalPreview {
    fn is_available(&self) -> bool {
        true
    }

    fn width(&self) -> u32 {
        TERMINAL_WIDTH
    }

    fn open(&self, content: PreviewContent) {
        match content {
            PreviewContent::Receipt { url, width } => {
                println!("receipt ({width} cols): {url}");
            }
            PreviewContent::NoReceipt => println!("no receipt attached to this bill"),
        }
    }
}

/// Cards are printed rather than clickable; binding only records the id.
pub struct TerminalBinder;

impl CardBinder for TerminalBinder {
    fn bind_open(&self, bill_id: &BillId) {
        debug!(%bill_id, "card open handler bound");
    }
}
