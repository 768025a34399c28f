use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::dnd::arbitrator::DropHost;

/// The panels of the tabbed menu, in fallback priority order.
#[derive(
    Debug, Display, EnumIter, EnumString, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize,
)]
pub enum MenuPanel {
    History,
    Saved,
    Projects,
    #[strum(to_string = "APIs")]
    ApiDocs,
}

impl MenuPanel {
    /// Panels a hovering drag may open.
    pub fn opens_on_drag(&self) -> bool {
        matches!(self, MenuPanel::Saved | MenuPanel::Projects)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabEntry {
    pub panel: MenuPanel,
    pub index: usize,
    pub hidden: bool,
}

/// Tracks the visible panel of the tabbed menu.
///
/// The selected panel is stored, not its index. Indices shift by one when
/// history is disabled, and are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionController {
    history_enabled: bool,
    hide_history: bool,
    hide_saved: bool,
    hide_projects: bool,
    hide_apis: bool,
    selected: Option<MenuPanel>,
}

impl Default for SelectionController {
    fn default() -> Self {
        SelectionController::new(true, [false; 4])
    }
}

impl SelectionController {
    /// `hidden` holds the history, saved, projects and APIs flags.
    pub fn new(history_enabled: bool, hidden: [bool; 4]) -> Self {
        let [hide_history, hide_saved, hide_projects, hide_apis] = hidden;
        let mut controller = SelectionController {
            history_enabled,
            hide_history,
            hide_saved,
            hide_projects,
            hide_apis,
            selected: None,
        };
        controller.select_first_available();
        controller
    }

    pub fn history_enabled(&self) -> bool {
        self.history_enabled
    }

    pub fn is_hidden(&self, panel: MenuPanel) -> bool {
        match panel {
            MenuPanel::History => self.hide_history,
            MenuPanel::Saved => self.hide_saved,
            MenuPanel::Projects => self.hide_projects,
            MenuPanel::ApiDocs => self.hide_apis,
        }
    }

    pub fn is_available(&self, panel: MenuPanel) -> bool {
        !self.is_hidden(panel) && (panel != MenuPanel::History || self.history_enabled)
    }

    /// Panels that own a tab slot. Hidden panels keep theirs.
    pub fn panels(&self) -> Vec<MenuPanel> {
        MenuPanel::iter()
            .filter(|p| *p != MenuPanel::History || self.history_enabled)
            .collect()
    }

    pub fn index_of(&self, panel: MenuPanel) -> Option<usize> {
        self.panels().iter().position(|p| *p == panel)
    }

    pub fn panel_at(&self, index: usize) -> Option<MenuPanel> {
        self.panels().get(index).copied()
    }

    pub fn selected_panel(&self) -> Option<MenuPanel> {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.and_then(|p| self.index_of(p))
    }

    pub fn tabs(&self) -> Vec<TabEntry> {
        self.panels()
            .into_iter()
            .enumerate()
            .map(|(index, panel)| TabEntry {
                panel,
                index,
                hidden: self.is_hidden(panel),
            })
            .collect()
    }

    /// User activated a tab.
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.panel_at(index) {
            Some(panel) => {
                self.selected = Some(panel);
                true
            }
            None => false,
        }
    }

    pub fn select_panel(&mut self, panel: MenuPanel) -> bool {
        match self.index_of(panel) {
            Some(index) => self.select_index(index),
            None => false,
        }
    }

    /// First available panel in priority order, or nothing.
    pub fn select_first_available(&mut self) -> Option<MenuPanel> {
        self.selected = MenuPanel::iter().find(|p| self.is_available(*p));
        self.selected
    }

    fn set_hidden(&mut self, panel: MenuPanel, hidden: bool) {
        match panel {
            MenuPanel::History => self.hide_history = hidden,
            MenuPanel::Saved => self.hide_saved = hidden,
            MenuPanel::Projects => self.hide_projects = hidden,
            MenuPanel::ApiDocs => self.hide_apis = hidden,
        }
        if hidden && self.selected == Some(panel) {
            self.select_first_available();
        }
        if !hidden && self.selected.is_none() {
            self.select_first_available();
        }
    }

    pub fn set_hide_history(&mut self, hidden: bool) {
        self.set_hidden(MenuPanel::History, hidden)
    }

    pub fn set_hide_saved(&mut self, hidden: bool) {
        self.set_hidden(MenuPanel::Saved, hidden)
    }

    pub fn set_hide_projects(&mut self, hidden: bool) {
        self.set_hidden(MenuPanel::Projects, hidden)
    }

    pub fn set_hide_apis(&mut self, hidden: bool) {
        self.set_hidden(MenuPanel::ApiDocs, hidden)
    }

    pub fn set_history_enabled(&mut self, enabled: bool) {
        let was_enabled = self.history_enabled;
        self.history_enabled = enabled;
        if enabled && !was_enabled {
            if self.hide_history {
                if self.selected.is_none() {
                    self.select_first_available();
                }
            } else {
                self.selected = Some(MenuPanel::History);
            }
        } else if !enabled && self.selected == Some(MenuPanel::History) {
            self.select_first_available();
        }
    }

    /// A hover timer fired over a tab. Only saved and projects open this way.
    pub fn open_from_drag(&mut self, panel: MenuPanel) -> bool {
        if !panel.opens_on_drag() || self.is_hidden(panel) {
            return false;
        }
        self.selected = Some(panel);
        true
    }
}

impl DropHost for SelectionController {
    fn selected_panel(&self) -> Option<MenuPanel> {
        self.selected
    }
}
