use std::cmp::min;

use eframe::emath::Align;
use eframe::epaint::text::LayoutJob;
use egui::text::TextWrapping;
use egui::{Color32, FontSelection, RichText, Style, Ui};

use arc_menu_core::data::request::{ArcRequest, Method};
use arc_menu_core::dnd::effect::DragModifiers;

pub fn method_color(method: &Method, ui: &Ui) -> Color32 {
    match method {
        Method::GET => Color32::from_rgb(0x3a, 0x9b, 0x5c),
        Method::POST => Color32::from_rgb(0xd9, 0x8e, 0x1e),
        Method::PUT => Color32::from_rgb(0x2b, 0x7b, 0xd6),
        Method::DELETE => Color32::from_rgb(0xd6, 0x45, 0x3d),
        _ => ui.visuals().warn_fg_color,
    }
}

pub fn shorten(name: String, max_char: Option<usize>) -> String {
    match max_char {
        Some(size) if name.chars().count() > size => {
            let len = min(name.chars().count() - 1, size);
            name.chars().take(len).collect::<String>() + "..."
        }
        _ => name,
    }
}

/// Method badge followed by the request name, or its URL when unnamed.
pub fn build_request_label(request: &ArcRequest, ui: &Ui) -> LayoutJob {
    let mut lb = LayoutJob {
        wrap: TextWrapping {
            max_width: ui.available_width(),
            max_rows: 1,
            break_anywhere: true,
            overflow_character: Some('…'),
        },
        ..Default::default()
    };
    let style = Style::default();
    RichText::new(format!("{} ", request.method))
        .color(method_color(&request.method, ui))
        .strong()
        .monospace()
        .append_to(&mut lb, &style, FontSelection::Default, Align::Center);
    RichText::new(request.display_name())
        .color(ui.visuals().text_color())
        .append_to(&mut lb, &style, FontSelection::Default, Align::Center);
    lb
}

pub fn drag_modifiers(ui: &Ui) -> DragModifiers {
    ui.input(|i| DragModifiers {
        ctrl: i.modifiers.ctrl,
        meta: i.modifiers.mac_cmd,
    })
}
