use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use egui::{emath, WidgetText};
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use log::{error, info};

use arc_menu_core::data::request::RequestKind;
use arc_menu_core::selection::MenuPanel;
use arc_menu_core::store::memory::MemoryStore;
use arc_menu_core::store::mutation::MutationRequest;

/// Requests the menus make to the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    OpenRequest { id: String, kind: RequestKind },
    OpenProject { id: String },
    OpenProjectRequests { project_id: String, replace: bool },
    OpenApi { id: String, version: String },
    OpenFullList(MenuPanel),
    ExploreApis,
    PopupMenu(MenuPanel),
}

#[derive(Clone)]
pub struct Operation {
    toasts: Rc<RefCell<Toasts>>,
    navigation: Rc<RefCell<VecDeque<NavigationEvent>>>,
}

impl Default for Operation {
    fn default() -> Self {
        Operation {
            toasts: Rc::new(RefCell::new(
                Toasts::default()
                    .anchor(emath::Align2::RIGHT_BOTTOM, (-10.0, -10.0))
                    .direction(egui::Direction::BottomUp),
            )),
            navigation: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl Operation {
    pub fn show(&self, ctx: &egui::Context) {
        self.toasts.borrow_mut().show(ctx);
    }

    pub fn add_toast(&self, toast: Toast) {
        self.toasts.borrow_mut().add(toast);
    }

    pub fn add_success_toast(&self, text: impl Into<WidgetText>) {
        self.add_toast(Toast {
            kind: ToastKind::Success,
            text: text.into(),
            options: ToastOptions::default()
                .duration_in_seconds(2.0)
                .show_icon(true)
                .show_progress(true),
        })
    }

    pub fn add_error_toast(&self, text: impl Into<WidgetText>) {
        self.add_toast(Toast {
            kind: ToastKind::Error,
            text: text.into(),
            options: ToastOptions::default()
                .duration_in_seconds(5.0)
                .show_icon(true)
                .show_progress(true),
        })
    }

    /// Sends the change to the store. A rejection is reported once and
    /// nothing on screen is rolled back.
    pub fn apply(&self, mutation: MutationRequest, store: &mut MemoryStore) -> bool {
        match mutation.apply(store) {
            Ok(()) => true,
            Err(e) => {
                error!("process error: {}", e);
                self.add_error_toast(e.message);
                false
            }
        }
    }

    pub fn navigate(&self, event: NavigationEvent) {
        info!("navigate {:?}", event);
        self.navigation.borrow_mut().push_back(event);
    }

    pub fn take_navigation(&self) -> Vec<NavigationEvent> {
        self.navigation.borrow_mut().drain(..).collect()
    }
}
