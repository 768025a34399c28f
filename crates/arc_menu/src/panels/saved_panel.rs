use std::cell::RefCell;
use std::rc::Rc;

use egui::{RichText, ScrollArea, Sense};
use log::error;

use arc_menu_core::data::request::RequestKind;
use arc_menu_core::dnd::arbitrator::{DropCapabilities, DropTarget, NoHost};
use arc_menu_core::dnd::effect::{command_label, Platform};
use arc_menu_core::dnd::payload::{DragPayload, MenuSource};
use arc_menu_core::events::{MailBox, MailPost};
use arc_menu_core::lists::requests::RequestListModel;
use arc_menu_core::store::memory::MemoryStore;

use crate::data::config_data::ConfigData;
use crate::operation::{NavigationEvent, Operation};
use crate::panels::{drag_source, list_row, paint_drop_highlight, scroll_delta, DropZone};
use crate::utils::build_request_label;

pub const SAVED_MAIL: &str = "saved-menu";

pub struct SavedPanel {
    list: RequestListModel,
    mail_box: Rc<RefCell<MailBox>>,
    drop_zone: DropZone,
}

impl SavedPanel {
    pub fn new(mail_post: &Rc<RefCell<MailPost>>) -> Self {
        SavedPanel {
            list: RequestListModel::new(RequestKind::Saved),
            mail_box: mail_post.borrow_mut().subscribe(SAVED_MAIL),
            drop_zone: DropZone::new(DropCapabilities::saved_menu()),
        }
    }

    pub fn refresh(&mut self, operation: &Operation, store: &MemoryStore) {
        if let Err(e) = self.list.refresh(store) {
            operation.add_error_toast(format!("Saved requests not loaded: {}", e));
        }
    }

    fn sync(&mut self, operation: &Operation, store: &MemoryStore) {
        for mail in self.mail_box.borrow_mut().take_all() {
            self.list.handle_event(&mail);
        }
        if let Err(e) = self.list.load_if_needed(store) {
            error!("saved reload failed: {:#}", e);
            operation.add_error_toast(e.to_string());
        }
    }

    pub fn set_and_render(
        &mut self,
        ui: &mut egui::Ui,
        operation: &Operation,
        store: &mut MemoryStore,
        config_data: &ConfigData,
    ) {
        self.sync(operation, store);
        self.drop_zone.configure(config_data);
        self.drop_zone.begin_frame(ui.ctx());
        let area = ui.available_rect_before_wrap();
        let draggable = config_data.data_transfer();

        if self.list.is_empty() {
            ui.vertical_centered(|ui| {
                ui.heading("Save a request and recall it from here");
                ui.label(
                    RichText::new(format!(
                        "Use {} to save a request. It will appear in this place.",
                        command_label("s", Platform::current())
                    ))
                    .weak(),
                );
            });
        } else {
            let output = ScrollArea::vertical()
                .id_source("saved_menu")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.spacing_mut().item_spacing.y = config_data.list_type().item_spacing();
                    for request in self.list.requests().iter() {
                        let label = build_request_label(request, ui);
                        let response = list_row(ui, label).on_hover_text(request.url.as_str());
                        if response.clicked() {
                            operation.navigate(NavigationEvent::OpenRequest {
                                id: request.id.clone(),
                                kind: RequestKind::Saved,
                            });
                        }
                        drag_source(ui, &response, draggable, &request.display_name(), || {
                            DragPayload::for_request(request, MenuSource::SavedMenu)
                        });
                    }
                });
            if self.list.should_load_more(scroll_delta(&output)) {
                if let Err(e) = self.list.load_next(&*store) {
                    operation.add_error_toast(e.to_string());
                }
            }
        }

        let response = ui.interact(area, ui.id().with("saved_drop"), Sense::hover());
        if let Some(mutation) = self
            .drop_zone
            .interact(ui, &response, DropTarget::SavedList, &NoHost)
        {
            if operation.apply(mutation, store) {
                operation.add_success_toast("Request saved");
            }
        }
        if self.drop_zone.highlighted() == Some(&DropTarget::SavedList) {
            paint_drop_highlight(ui, area);
        }
        self.drop_zone.end_frame();
    }
}
