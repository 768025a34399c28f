use std::cell::RefCell;
use std::rc::Rc;

use egui::{CollapsingHeader, RichText, ScrollArea};
use log::error;

use arc_menu_core::data::request::RequestKind;
use arc_menu_core::dnd::payload::{DragPayload, MenuSource};
use arc_menu_core::events::{MailBox, MailPost};
use arc_menu_core::lists::requests::RequestListModel;
use arc_menu_core::store::memory::MemoryStore;

use crate::data::config_data::ConfigData;
use crate::operation::{NavigationEvent, Operation};
use crate::panels::{drag_source, list_row, scroll_delta};
use crate::utils::build_request_label;

pub const HISTORY_MAIL: &str = "history-menu";

pub struct HistoryPanel {
    list: RequestListModel,
    mail_box: Rc<RefCell<MailBox>>,
}

impl HistoryPanel {
    pub fn new(mail_post: &Rc<RefCell<MailPost>>) -> Self {
        HistoryPanel {
            list: RequestListModel::new(RequestKind::History),
            mail_box: mail_post.borrow_mut().subscribe(HISTORY_MAIL),
        }
    }

    pub fn refresh(&mut self, operation: &Operation, store: &MemoryStore) {
        if let Err(e) = self.list.refresh(store) {
            operation.add_error_toast(format!("History not loaded: {}", e));
        }
    }

    fn sync(&mut self, operation: &Operation, store: &MemoryStore) {
        for mail in self.mail_box.borrow_mut().take_all() {
            self.list.handle_event(&mail);
        }
        if let Err(e) = self.list.load_if_needed(store) {
            error!("history reload failed: {:#}", e);
            operation.add_error_toast(e.to_string());
        }
    }

    pub fn set_and_render(
        &mut self,
        ui: &mut egui::Ui,
        operation: &Operation,
        store: &MemoryStore,
        config_data: &ConfigData,
    ) {
        self.sync(operation, store);
        if self.list.is_empty() {
            ui.vertical_centered(|ui| {
                ui.heading("Send a request and recall it from here");
                ui.label(RichText::new("Once you made a request it will appear in this place.").weak());
            });
            return;
        }
        let draggable = config_data.data_transfer();
        let output = ScrollArea::vertical()
            .id_source("history_menu")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = config_data.list_type().item_spacing();
                for (date, group) in self.list.grouped().iter().rev() {
                    CollapsingHeader::new(date.format("%A, %B %-d").to_string())
                        .id_source(date)
                        .default_open(true)
                        .show(ui, |ui| {
                            for request in group.history_list.iter() {
                                let label = build_request_label(request, ui);
                                let response =
                                    list_row(ui, label).on_hover_text(request.url.as_str());
                                if response.clicked() {
                                    operation.navigate(NavigationEvent::OpenRequest {
                                        id: request.id.clone(),
                                        kind: RequestKind::History,
                                    });
                                }
                                drag_source(ui, &response, draggable, &request.display_name(), || {
                                    DragPayload::for_request(request, MenuSource::HistoryMenu)
                                });
                            }
                        });
                }
            });
        if self.list.should_load_more(scroll_delta(&output)) {
            if let Err(e) = self.list.load_next(store) {
                operation.add_error_toast(e.to_string());
            }
        }
    }
}
