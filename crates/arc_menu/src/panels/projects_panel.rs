use std::cell::RefCell;
use std::rc::Rc;

use egui::{Response, RichText, ScrollArea, Ui};
use egui_phosphor::regular;
use log::error;

use arc_menu_core::data::request::RequestKind;
use arc_menu_core::dnd::arbitrator::{DropCapabilities, DropTarget};
use arc_menu_core::dnd::effect::{command_label, Platform};
use arc_menu_core::dnd::insertion::{
    resolve_drop_marker, resolve_insertion_index, ItemRect, MarkerSide,
};
use arc_menu_core::dnd::payload::{DragPayload, MenuSource, PayloadKind};
use arc_menu_core::events::{MailBox, MailPost};
use arc_menu_core::lists::projects::{ProjectEntry, ProjectsListModel};
use arc_menu_core::store::memory::MemoryStore;
use arc_menu_core::store::mutation::MutationRequest;

use crate::data::config_data::ConfigData;
use crate::operation::{NavigationEvent, Operation};
use crate::panels::{
    drag_source, list_row, paint_drop_highlight, paint_insert_marker, DropZone, HORIZONTAL_GAP,
};
use crate::utils::build_request_label;

pub const PROJECTS_MAIL: &str = "projects-menu";

struct RequestRow {
    project_id: String,
    response: Response,
}

pub struct ProjectsPanel {
    model: ProjectsListModel,
    mail_box: Rc<RefCell<MailBox>>,
    drop_zone: DropZone,
}

fn item_rects<'a>(responses: impl Iterator<Item = &'a Response>) -> Vec<ItemRect> {
    responses
        .enumerate()
        .map(|(index, r)| ItemRect::new(r.rect.top(), r.rect.height(), index))
        .collect()
}

fn paint_marker(ui: &Ui, pointer_y: f32, rects: &[ItemRect], responses: &[&Response]) {
    if let Some(marker) = resolve_drop_marker(pointer_y, rects) {
        if let Some(response) = responses.get(marker.index) {
            let y = match marker.side {
                MarkerSide::Above => response.rect.top(),
                MarkerSide::Below => response.rect.bottom(),
            };
            paint_insert_marker(ui, response.rect, y);
        }
    }
}

impl ProjectsPanel {
    pub fn new(mail_post: &Rc<RefCell<MailPost>>) -> Self {
        ProjectsPanel {
            model: ProjectsListModel::new(),
            mail_box: mail_post.borrow_mut().subscribe(PROJECTS_MAIL),
            drop_zone: DropZone::new(DropCapabilities::projects_menu()),
        }
    }

    pub fn refresh(&mut self, operation: &Operation, store: &MemoryStore) {
        if let Err(e) = self.model.refresh(store) {
            operation.add_error_toast(format!("Projects not loaded: {}", e));
        }
    }

    fn sync(&mut self, operation: &Operation, store: &MemoryStore) {
        let mails = self.mail_box.borrow_mut().take_all();
        let changed = mails
            .iter()
            .fold(false, |changed, mail| self.model.handle_event(mail) || changed);
        let result = self
            .model
            .load_if_needed(store)
            .and_then(|_| if changed { self.model.sync_opened(store) } else { Ok(()) });
        if let Err(e) = result {
            error!("projects reload failed: {:#}", e);
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
        if let Some(DropTarget::ProjectRow { project_id }) = self.drop_zone.begin_frame(ui.ctx()) {
            if let Err(e) = self.model.open(&project_id, &*store) {
                operation.add_error_toast(e.to_string());
            }
        }
        let draggable = config_data.data_transfer();
        let mut actions: Vec<MutationRequest> = vec![];
        let mut toggles: Vec<String> = vec![];
        let mut project_rows: Vec<(String, Response)> = vec![];
        let mut request_rows: Vec<RequestRow> = vec![];

        if ui
            .button(format!("{} Add a project", regular::PLUS))
            .clicked()
        {
            actions.push(self.model.add_project());
        }
        if self.model.is_empty() {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("You have no saved projects.").strong());
                ui.label(
                    RichText::new(
                        "Projects help you organize requests into a group for structure and quick access.",
                    )
                    .weak(),
                );
            });
        }

        let model = &self.model;
        ScrollArea::vertical()
            .id_source("projects_menu")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.spacing_mut().item_spacing.y = config_data.list_type().item_spacing();
                for project in model.projects() {
                    let open = model.is_open(&project.id);
                    let icon = if open {
                        regular::FOLDER_OPEN
                    } else {
                        regular::FOLDER
                    };
                    let response = list_row(ui, format!("{} {}", icon, project.name));
                    if response.clicked() {
                        toggles.push(project.id.clone());
                    }
                    drag_source(ui, &response, draggable, &project.name, || {
                        DragPayload::for_project(project, MenuSource::ProjectsMenu)
                    });
                    response.clone().context_menu(|ui| {
                        if ui.button("Open details").clicked() {
                            operation.navigate(NavigationEvent::OpenProject {
                                id: project.id.clone(),
                            });
                            ui.close_menu();
                        }
                        if ui.button("Open all in workspace").clicked() {
                            operation.navigate(NavigationEvent::OpenProjectRequests {
                                project_id: project.id.clone(),
                                replace: false,
                            });
                            ui.close_menu();
                        }
                        if ui.button("Replace all in workspace").clicked() {
                            operation.navigate(NavigationEvent::OpenProjectRequests {
                                project_id: project.id.clone(),
                                replace: true,
                            });
                            ui.close_menu();
                        }
                        ui.separator();
                        if ui.button("Delete project").clicked() {
                            actions.push(model.delete_project(&project.id));
                            ui.close_menu();
                        }
                    });
                    project_rows.push((project.id.clone(), response));
                    if !open {
                        continue;
                    }
                    ui.indent(project.id.as_str(), |ui| {
                        let entries = model.entries(&project.id);
                        if entries.is_empty() {
                            ui.label(
                                RichText::new(format!(
                                    "Use {} to save a request in a project.",
                                    command_label("s", Platform::current())
                                ))
                                .weak(),
                            );
                        }
                        for entry in entries.iter() {
                            let response = match entry {
                                ProjectEntry::Request(request) => {
                                    let label = build_request_label(request, ui);
                                    let response =
                                        list_row(ui, label).on_hover_text(request.url.as_str());
                                    if response.clicked() {
                                        operation.navigate(NavigationEvent::OpenRequest {
                                            id: request.id.clone(),
                                            kind: RequestKind::Saved,
                                        });
                                    }
                                    drag_source(
                                        ui,
                                        &response,
                                        draggable,
                                        &request.display_name(),
                                        || DragPayload::for_project_request(request, &project.id),
                                    );
                                    response
                                }
                                ProjectEntry::Unknown { id } => {
                                    ui.horizontal(|ui| {
                                        ui.label(RichText::new("Unknown entry").weak().italics());
                                        ui.add_space(HORIZONTAL_GAP);
                                        if ui.small_button("Remove").clicked() {
                                            if let Some(update) = model.remove_unknown(&project.id, id) {
                                                actions.push(update);
                                            }
                                        }
                                    })
                                    .response
                                }
                            };
                            request_rows.push(RequestRow {
                                project_id: project.id.clone(),
                                response,
                            });
                        }
                    });
                }
            });

        for project_id in toggles {
            if let Err(e) = self.model.toggle(&project_id, &*store) {
                operation.add_error_toast(e.to_string());
            }
        }
        actions.extend(self.handle_drops(ui, &project_rows, &request_rows));
        for mutation in actions {
            operation.apply(mutation, store);
        }
        self.drop_zone.end_frame();
    }

    fn handle_drops(
        &mut self,
        ui: &Ui,
        project_rows: &[(String, Response)],
        request_rows: &[RequestRow],
    ) -> Vec<MutationRequest> {
        let mut mutations = vec![];
        let Some(pointer_y) = ui.input(|i| i.pointer.hover_pos()).map(|p| p.y) else {
            return mutations;
        };
        let dragging_project = egui::DragAndDrop::payload::<DragPayload>(ui.ctx())
            .map_or(false, |p| p.kind() == Some(PayloadKind::Project));

        let project_responses: Vec<&Response> = project_rows.iter().map(|(_, r)| r).collect();
        let project_rects = item_rects(project_responses.iter().copied());
        for (project_id, response) in project_rows.iter() {
            let target = if dragging_project {
                DropTarget::ProjectOrder {
                    index: resolve_insertion_index(pointer_y, &project_rects),
                }
            } else {
                DropTarget::ProjectRow {
                    project_id: project_id.clone(),
                }
            };
            if let Some(mutation) = self.drop_zone.interact(ui, response, target, &self.model) {
                mutations.push(mutation);
            }
        }

        for project_id in self.model.opened().to_vec() {
            let responses: Vec<&Response> = request_rows
                .iter()
                .filter(|row| row.project_id == project_id)
                .map(|row| &row.response)
                .collect();
            let rects = item_rects(responses.iter().copied());
            for response in responses.iter() {
                let target = DropTarget::RequestList {
                    project_id: project_id.clone(),
                    index: resolve_insertion_index(pointer_y, &rects),
                };
                if let Some(mutation) = self.drop_zone.interact(ui, response, target, &self.model) {
                    mutations.push(mutation);
                }
            }
            if matches!(self.drop_zone.highlighted(),
                Some(DropTarget::RequestList { project_id: p, .. }) if *p == project_id)
            {
                paint_marker(ui, pointer_y, &rects, &responses);
            }
        }

        match self.drop_zone.highlighted() {
            Some(DropTarget::ProjectRow { project_id }) => {
                if let Some((_, response)) = project_rows.iter().find(|(id, _)| id == project_id) {
                    paint_drop_highlight(ui, response.rect);
                }
            }
            Some(DropTarget::ProjectOrder { .. }) => {
                paint_marker(ui, pointer_y, &project_rects, &project_responses);
            }
            _ => {}
        }
        mutations
    }
}
