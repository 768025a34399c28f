use std::cell::RefCell;
use std::rc::Rc;

use egui::{RichText, Ui};
use egui_phosphor::regular;

use arc_menu_core::dnd::arbitrator::{DropCapabilities, DropTarget};
use arc_menu_core::events::MailPost;
use arc_menu_core::selection::{MenuPanel, SelectionController};
use arc_menu_core::store::memory::MemoryStore;

use crate::data::config_data::ConfigData;
use crate::operation::{NavigationEvent, Operation};
use crate::panels::history_panel::HistoryPanel;
use crate::panels::projects_panel::ProjectsPanel;
use crate::panels::rest_api_panel::RestApiPanel;
use crate::panels::saved_panel::SavedPanel;
use crate::panels::{paint_drop_highlight, DropZone, VERTICAL_GAP};

fn panel_icon(panel: MenuPanel) -> &'static str {
    match panel {
        MenuPanel::History => regular::CLOCK_COUNTER_CLOCKWISE,
        MenuPanel::Saved => regular::FLOPPY_DISK,
        MenuPanel::Projects => regular::FOLDERS,
        MenuPanel::ApiDocs => regular::BOOK_OPEN,
    }
}

/// The tabbed navigation menu: history, saved, projects and APIs.
pub struct ArcMenuPanel {
    selection: SelectionController,
    drop_zone: DropZone,
    history_panel: HistoryPanel,
    saved_panel: SavedPanel,
    projects_panel: ProjectsPanel,
    rest_api_panel: RestApiPanel,
}

impl ArcMenuPanel {
    pub fn new(mail_post: &Rc<RefCell<MailPost>>, config_data: &ConfigData) -> Self {
        ArcMenuPanel {
            selection: SelectionController::new(config_data.history(), config_data.hidden()),
            drop_zone: DropZone::new(DropCapabilities::tab_container()),
            history_panel: HistoryPanel::new(mail_post),
            saved_panel: SavedPanel::new(mail_post),
            projects_panel: ProjectsPanel::new(mail_post),
            rest_api_panel: RestApiPanel::new(mail_post),
        }
    }

    pub fn selected_panel(&self) -> Option<MenuPanel> {
        self.selection.selected_panel()
    }

    fn sync_config(&mut self, config_data: &ConfigData) {
        if self.selection.history_enabled() != config_data.history() {
            self.selection.set_history_enabled(config_data.history());
        }
        let [history, saved, projects, apis] = config_data.hidden();
        if self.selection.is_hidden(MenuPanel::History) != history {
            self.selection.set_hide_history(history);
        }
        if self.selection.is_hidden(MenuPanel::Saved) != saved {
            self.selection.set_hide_saved(saved);
        }
        if self.selection.is_hidden(MenuPanel::Projects) != projects {
            self.selection.set_hide_projects(projects);
        }
        if self.selection.is_hidden(MenuPanel::ApiDocs) != apis {
            self.selection.set_hide_apis(apis);
        }
        self.drop_zone.configure(config_data);
    }

    fn refresh(&mut self, panel: MenuPanel, operation: &Operation, store: &MemoryStore) {
        match panel {
            MenuPanel::History => self.history_panel.refresh(operation, store),
            MenuPanel::Saved => self.saved_panel.refresh(operation, store),
            MenuPanel::Projects => self.projects_panel.refresh(operation, store),
            MenuPanel::ApiDocs => self.rest_api_panel.refresh(operation, store),
        }
    }

    fn render_tabs(&mut self, ui: &mut Ui) {
        if let Some(DropTarget::Tab(panel)) = self.drop_zone.begin_frame(ui.ctx()) {
            self.selection.open_from_drag(panel);
        }
        let selected = self.selection.selected_panel();
        let mut clicked: Option<usize> = None;
        let mut tab_rects = vec![];
        ui.horizontal_wrapped(|ui| {
            for tab in self.selection.tabs().into_iter().filter(|t| !t.hidden) {
                let text = format!("{} {}", panel_icon(tab.panel), tab.panel);
                let response = ui.selectable_label(selected == Some(tab.panel), text);
                if response.clicked() {
                    clicked = Some(tab.index);
                }
                self.drop_zone
                    .interact(ui, &response, DropTarget::Tab(tab.panel), &self.selection);
                tab_rects.push((tab.panel, response.rect));
            }
        });
        if let Some(DropTarget::Tab(panel)) = self.drop_zone.highlighted() {
            if let Some((_, rect)) = tab_rects.iter().find(|(p, _)| p == panel) {
                paint_drop_highlight(ui, *rect);
            }
        }
        self.drop_zone.end_frame();
        if let Some(index) = clicked {
            self.selection.select_index(index);
        }
    }

    fn render_actions(
        &mut self,
        ui: &mut Ui,
        panel: MenuPanel,
        operation: &Operation,
        store: &MemoryStore,
        config_data: &ConfigData,
    ) {
        ui.horizontal(|ui| {
            match panel {
                MenuPanel::History => {
                    if ui.button("All history").clicked() {
                        operation.navigate(NavigationEvent::OpenFullList(panel));
                    }
                }
                MenuPanel::Saved => {
                    if ui.button("All saved").clicked() {
                        operation.navigate(NavigationEvent::OpenFullList(panel));
                    }
                }
                MenuPanel::ApiDocs => {
                    if ui.button("Explore").clicked() {
                        operation.navigate(NavigationEvent::ExploreApis);
                    }
                }
                MenuPanel::Projects => {}
            }
            if ui
                .button(regular::ARROWS_CLOCKWISE)
                .on_hover_text("Refresh")
                .clicked()
            {
                self.refresh(panel, operation, store);
            }
            if config_data.popup()
                && ui
                    .button(regular::ARROW_SQUARE_OUT)
                    .on_hover_text("Open in a new window")
                    .clicked()
            {
                operation.navigate(NavigationEvent::PopupMenu(panel));
            }
        });
    }

    pub fn set_and_render(
        &mut self,
        ui: &mut Ui,
        operation: &Operation,
        store: &mut MemoryStore,
        config_data: &ConfigData,
    ) {
        self.sync_config(config_data);
        self.render_tabs(ui);
        ui.add_space(VERTICAL_GAP);
        let Some(panel) = self.selection.selected_panel() else {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("No menu available").weak());
            });
            return;
        };
        self.render_actions(ui, panel, operation, store, config_data);
        ui.separator();
        match panel {
            MenuPanel::History => {
                self.history_panel
                    .set_and_render(ui, operation, store, config_data)
            }
            MenuPanel::Saved => self
                .saved_panel
                .set_and_render(ui, operation, store, config_data),
            MenuPanel::Projects => {
                self.projects_panel
                    .set_and_render(ui, operation, store, config_data)
            }
            MenuPanel::ApiDocs => {
                self.rest_api_panel
                    .set_and_render(ui, operation, store, config_data)
            }
        }
    }
}
