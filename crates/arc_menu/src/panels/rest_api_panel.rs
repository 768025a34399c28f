use std::cell::RefCell;
use std::rc::Rc;

use egui::{RichText, ScrollArea};
use log::error;

use arc_menu_core::events::{MailBox, MailPost};
use arc_menu_core::lists::api_index::ApiIndexListModel;
use arc_menu_core::store::memory::MemoryStore;

use crate::data::config_data::ConfigData;
use crate::operation::{NavigationEvent, Operation};

pub const REST_API_MAIL: &str = "rest-api-menu";

pub struct RestApiPanel {
    list: ApiIndexListModel,
    mail_box: Rc<RefCell<MailBox>>,
}

impl RestApiPanel {
    pub fn new(mail_post: &Rc<RefCell<MailPost>>) -> Self {
        RestApiPanel {
            list: ApiIndexListModel::default(),
            mail_box: mail_post.borrow_mut().subscribe(REST_API_MAIL),
        }
    }

    pub fn refresh(&mut self, operation: &Operation, store: &MemoryStore) {
        if let Err(e) = self.list.refresh(store) {
            operation.add_error_toast(format!("APIs not loaded: {}", e));
        }
    }

    pub fn set_and_render(
        &mut self,
        ui: &mut egui::Ui,
        operation: &Operation,
        store: &MemoryStore,
        config_data: &ConfigData,
    ) {
        for mail in self.mail_box.borrow_mut().take_all() {
            self.list.handle_event(&mail);
        }
        if let Err(e) = self.list.load_if_needed(store) {
            error!("api index reload failed: {:#}", e);
            operation.add_error_toast(e.to_string());
        }
        if self.list.is_empty() {
            ui.vertical_centered(|ui| {
                ui.heading("Drop API project here");
                ui.label(RichText::new("There is no API stored with the application").weak());
            });
            return;
        }
        let mut clicked: Option<String> = None;
        ScrollArea::vertical()
            .id_source("rest_api_menu")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = config_data.list_type().item_spacing();
                for item in self.list.items().iter() {
                    let selected = self.list.selected() == Some(item.id.as_str());
                    let response = ui
                        .selectable_label(selected, item.title.as_str())
                        .on_hover_text(format!("Latest version: {}", item.latest));
                    if response.clicked() {
                        clicked = Some(item.id.clone());
                    }
                }
            });
        if let Some(id) = clicked {
            if let Some(item) = self.list.select(&id) {
                operation.navigate(NavigationEvent::OpenApi {
                    id: item.id.clone(),
                    version: item.latest.clone(),
                });
            }
        }
    }
}
