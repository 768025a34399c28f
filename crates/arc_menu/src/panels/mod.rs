use std::time::Duration;

use egui::{Button, Rect, Response, Sense, Stroke, Ui, WidgetText};

use arc_menu_core::dnd::arbitrator::{DropArbitrator, DropCapabilities, DropHost, DropTarget};
use arc_menu_core::dnd::payload::DragPayload;
use arc_menu_core::store::mutation::MutationRequest;

use crate::data::config_data::ConfigData;
use crate::utils::{drag_modifiers, shorten};

pub mod arc_menu_panel;
pub mod history_panel;
pub mod projects_panel;
pub mod rest_api_panel;
pub mod saved_panel;

pub const HORIZONTAL_GAP: f32 = 8.0;
pub const VERTICAL_GAP: f32 = 2.0;
const DRAG_LABEL_MAX_CHARS: usize = 40;

/// Ties one [`DropArbitrator`] to egui's drag and drop for a frame.
///
/// Call [`DropZone::begin_frame`] before rendering targets and
/// [`DropZone::end_frame`] after; targets that were not hovered in between get
/// a drag leave.
#[derive(Debug)]
pub struct DropZone {
    arbitrator: DropArbitrator,
    hovered: Option<DropTarget>,
}

impl DropZone {
    pub fn new(capabilities: DropCapabilities) -> Self {
        DropZone {
            arbitrator: DropArbitrator::new(capabilities),
            hovered: None,
        }
    }

    pub fn configure(&mut self, config_data: &ConfigData) {
        if self.arbitrator.is_enabled() != config_data.data_transfer() {
            self.arbitrator.set_enabled(config_data.data_transfer());
        }
        self.arbitrator
            .set_delay(Duration::from_millis(config_data.drag_open_timeout_ms()));
    }

    pub fn is_enabled(&self) -> bool {
        self.arbitrator.is_enabled()
    }

    /// Returns the target whose hover delay ran out.
    pub fn begin_frame(&mut self, ctx: &egui::Context) -> Option<DropTarget> {
        self.hovered = None;
        let fired = self.arbitrator.poll();
        if let Some(remaining) = self.arbitrator.remaining() {
            ctx.request_repaint_after(remaining);
        }
        fired
    }

    pub fn interact(
        &mut self,
        ui: &Ui,
        response: &Response,
        target: DropTarget,
        host: &dyn DropHost,
    ) -> Option<MutationRequest> {
        let modifiers = drag_modifiers(ui);
        if let Some(payload) = response.dnd_release_payload::<DragPayload>() {
            return self.arbitrator.drop(&target, &payload, modifiers, host);
        }
        if let Some(payload) = response.dnd_hover_payload::<DragPayload>() {
            let outcome = self.arbitrator.drag_over(&target, &payload, modifiers, host);
            if outcome.accept {
                self.hovered = Some(target);
            }
        }
        None
    }

    pub fn highlighted(&self) -> Option<&DropTarget> {
        self.arbitrator.affordance()
    }

    pub fn end_frame(&mut self) {
        if let Some(current) = self.arbitrator.affordance().cloned() {
            if self.hovered.as_ref() != Some(&current) {
                self.arbitrator.drag_leave(&current);
            }
        }
    }
}

pub fn paint_drop_highlight(ui: &Ui, rect: Rect) {
    let color = ui.visuals().selection.stroke.color;
    ui.painter()
        .rect_stroke(rect.expand(1.0), 2.0, Stroke::new(2.0, color));
}

pub fn paint_insert_marker(ui: &Ui, rect: Rect, y: f32) {
    let color = ui.visuals().selection.stroke.color;
    ui.painter().hline(rect.x_range(), y, Stroke::new(2.0, color));
}

/// Frameless list row that can be clicked and dragged.
pub fn list_row(ui: &mut Ui, text: impl Into<WidgetText>) -> Response {
    ui.add(
        Button::new(text)
            .frame(false)
            .sense(Sense::click_and_drag()),
    )
}

/// Starts a drag with `payload` when the row begins to move.
pub fn drag_source(
    ui: &Ui,
    response: &Response,
    enabled: bool,
    label: &str,
    payload: impl FnOnce() -> DragPayload,
) {
    if !enabled {
        return;
    }
    if response.drag_started() {
        egui::DragAndDrop::set_payload(ui.ctx(), payload());
    }
    if response.dragged() && egui::DragAndDrop::has_payload_of_type::<DragPayload>(ui.ctx()) {
        egui::show_tooltip_at_pointer(ui.ctx(), response.id.with("drag"), |ui| {
            ui.label(shorten(label.to_string(), Some(DRAG_LABEL_MAX_CHARS)));
        });
    }
}

/// Remaining scroll distance below the viewport.
pub fn scroll_delta<R>(output: &egui::scroll_area::ScrollAreaOutput<R>) -> f32 {
    output.content_size.y - (output.state.offset.y + output.inner_rect.height())
}
