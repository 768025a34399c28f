use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Local};
use egui::{Context, RichText, ScrollArea};
use log::info;
use strum::IntoEnumIterator;

use arc_menu_core::data::generator::DataGenerator;
use arc_menu_core::events::MailPost;
use arc_menu_core::store::memory::MemoryStore;

use crate::data::config_data::{ConfigData, ListType};
use crate::operation::{NavigationEvent, Operation};
use crate::panels::arc_menu_panel::ArcMenuPanel;

const GENERATED_SIZE: usize = 40;
const NAVIGATION_LOG_SIZE: usize = 200;

pub struct App {
    store: MemoryStore,
    operation: Operation,
    config_data: ConfigData,
    arc_menu_panel: ArcMenuPanel,
    generator: DataGenerator,
    navigation_log: Vec<(DateTime<Local>, NavigationEvent)>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::configure_fonts(&cc.egui_ctx);
        let mail_post = Rc::new(RefCell::new(MailPost::default()));
        let mut generator = DataGenerator::new();
        let store = MemoryStore::with_data(mail_post.clone(), generator.generate(GENERATED_SIZE));
        let config_data = ConfigData::load();
        let arc_menu_panel = ArcMenuPanel::new(&mail_post, &config_data);
        info!("{} started", crate::APP_NAME);
        App {
            store,
            operation: Operation::default(),
            config_data,
            arc_menu_panel,
            generator,
            navigation_log: vec![],
        }
    }

    pub fn configure_fonts(ctx: &Context) {
        let mut font_def = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut font_def, egui_phosphor::Variant::Regular);
        ctx.set_fonts(font_def);
    }

    fn render_settings(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            let mut history = self.config_data.history();
            if ui.checkbox(&mut history, "History").changed() {
                self.config_data.set_history(history);
            }
            let mut hide = self.config_data.hidden();
            if ui.checkbox(&mut hide[0], "Hide history").changed() {
                self.config_data.set_hide_history(hide[0]);
            }
            if ui.checkbox(&mut hide[1], "Hide saved").changed() {
                self.config_data.set_hide_saved(hide[1]);
            }
            if ui.checkbox(&mut hide[2], "Hide projects").changed() {
                self.config_data.set_hide_projects(hide[2]);
            }
            if ui.checkbox(&mut hide[3], "Hide APIs").changed() {
                self.config_data.set_hide_apis(hide[3]);
            }
            let mut data_transfer = self.config_data.data_transfer();
            if ui.checkbox(&mut data_transfer, "Drag and drop").changed() {
                self.config_data.set_data_transfer(data_transfer);
            }
            let mut popup = self.config_data.popup();
            if ui.checkbox(&mut popup, "Popup menus").changed() {
                self.config_data.set_popup(popup);
            }
            let mut list_type = self.config_data.list_type();
            egui::ComboBox::from_id_source("list_type")
                .selected_text(list_type.to_string())
                .show_ui(ui, |ui| {
                    for value in ListType::iter() {
                        ui.selectable_value(&mut list_type, value, value.to_string());
                    }
                });
            if list_type != self.config_data.list_type() {
                self.config_data.set_list_type(list_type);
            }
            ui.separator();
            if ui.button("Send a request").clicked() {
                let request = self.generator.history_request();
                self.store.record_history(request);
            }
            if ui.button("Import data").clicked() {
                self.store.import(self.generator.generate(GENERATED_SIZE));
                self.operation.add_success_toast("Data imported");
            }
            if ui.button("Clear data").clicked() {
                self.store.clear(None);
            }
        });
    }

    fn render_navigation_log(&mut self, ui: &mut egui::Ui) {
        ui.heading("Navigation");
        if self.navigation_log.is_empty() {
            ui.label(RichText::new("Nothing opened yet").weak());
            return;
        }
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (time, event) in self.navigation_log.iter() {
                    ui.label(format!("{} {:?}", time.format("%H:%M:%S"), event));
                }
            });
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("settings_panel").show(ctx, |ui| {
            self.render_settings(ui);
        });
        egui::SidePanel::left("arc_menu_panel")
            .default_width(280.0)
            .show(ctx, |ui| {
                self.arc_menu_panel.set_and_render(
                    ui,
                    &self.operation,
                    &mut self.store,
                    &self.config_data,
                );
            });
        for event in self.operation.take_navigation() {
            self.navigation_log.push((Local::now(), event));
        }
        if self.navigation_log.len() > NAVIGATION_LOG_SIZE {
            let overflow = self.navigation_log.len() - NAVIGATION_LOG_SIZE;
            self.navigation_log.drain(..overflow);
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_navigation_log(ui);
        });
        self.operation.show(ctx);
    }
}
