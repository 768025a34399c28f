use std::fs;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use arc_menu_core::dnd::DEFAULT_DRAG_OPEN_TIMEOUT_MS;

use crate::APP_NAME;

#[derive(Debug, Display, EnumIter, EnumString, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListType {
    Default,
    Comfortable,
    Compact,
}

impl Default for ListType {
    fn default() -> Self {
        ListType::Default
    }
}

impl ListType {
    pub fn item_spacing(&self) -> f32 {
        match self {
            ListType::Default => 4.0,
            ListType::Comfortable => 8.0,
            ListType::Compact => 1.0,
        }
    }
}

/// Menu settings, saved next to the logs in the application directory.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigData {
    history: bool,
    hide_history: bool,
    hide_saved: bool,
    hide_projects: bool,
    hide_apis: bool,
    data_transfer: bool,
    drag_open_timeout_ms: u64,
    list_type: ListType,
    popup: bool,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for ConfigData {
    fn default() -> Self {
        ConfigData {
            history: true,
            hide_history: false,
            hide_saved: false,
            hide_projects: false,
            hide_apis: false,
            data_transfer: true,
            drag_open_timeout_ms: DEFAULT_DRAG_OPEN_TIMEOUT_MS,
            list_type: ListType::Default,
            popup: false,
            path: None,
        }
    }
}

impl ConfigData {
    pub fn load() -> Self {
        match dirs::home_dir() {
            Some(home_dir) => Self::load_from(home_dir.join(APP_NAME).join("config.json")),
            None => Self::default(),
        }
    }

    /// Reads the file at `path`; anything unreadable falls back to defaults.
    /// Later setters write back to the same path.
    pub fn load_from(path: PathBuf) -> Self {
        let mut config_data = match File::open(&path) {
            Ok(mut file) => {
                let mut content = String::new();
                match file.read_to_string(&mut content) {
                    Ok(_) => serde_json::from_str(content.as_str()).unwrap_or_else(|e| {
                        warn!("config {} ignored: {}", path.display(), e);
                        Self::default()
                    }),
                    Err(_) => Self::default(),
                }
            }
            Err(_) => Self::default(),
        };
        config_data.path = Some(path);
        config_data
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            warn!("config not saved: {:#}", e);
        }
    }

    pub fn history(&self) -> bool {
        self.history
    }
    pub fn hide_history(&self) -> bool {
        self.hide_history
    }
    pub fn hide_saved(&self) -> bool {
        self.hide_saved
    }
    pub fn hide_projects(&self) -> bool {
        self.hide_projects
    }
    pub fn hide_apis(&self) -> bool {
        self.hide_apis
    }
    pub fn data_transfer(&self) -> bool {
        self.data_transfer
    }
    pub fn drag_open_timeout_ms(&self) -> u64 {
        self.drag_open_timeout_ms
    }
    pub fn list_type(&self) -> ListType {
        self.list_type
    }
    pub fn popup(&self) -> bool {
        self.popup
    }

    /// The hide flags in panel priority order.
    pub fn hidden(&self) -> [bool; 4] {
        [
            self.hide_history,
            self.hide_saved,
            self.hide_projects,
            self.hide_apis,
        ]
    }

    pub fn set_history(&mut self, history: bool) {
        self.history = history;
        self.save_or_warn();
    }
    pub fn set_hide_history(&mut self, hide: bool) {
        self.hide_history = hide;
        self.save_or_warn();
    }
    pub fn set_hide_saved(&mut self, hide: bool) {
        self.hide_saved = hide;
        self.save_or_warn();
    }
    pub fn set_hide_projects(&mut self, hide: bool) {
        self.hide_projects = hide;
        self.save_or_warn();
    }
    pub fn set_hide_apis(&mut self, hide: bool) {
        self.hide_apis = hide;
        self.save_or_warn();
    }
    pub fn set_data_transfer(&mut self, data_transfer: bool) {
        self.data_transfer = data_transfer;
        self.save_or_warn();
    }
    pub fn set_drag_open_timeout_ms(&mut self, timeout: u64) {
        self.drag_open_timeout_ms = timeout;
        self.save_or_warn();
    }
    pub fn set_list_type(&mut self, list_type: ListType) {
        self.list_type = list_type;
        self.save_or_warn();
    }
    pub fn set_popup(&mut self, popup: bool) {
        self.popup = popup;
        self.save_or_warn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("arc_menu_{}_{}", name, uuid::Uuid::new_v4()))
            .join("config.json")
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: ConfigData = serde_json::from_str(r#"{"hide_saved": true}"#).unwrap();
        assert!(config.hide_saved());
        assert!(config.history());
        assert!(config.data_transfer());
        assert_eq!(config.drag_open_timeout_ms(), 700);
        assert_eq!(config.list_type(), ListType::Default);
    }

    #[test]
    fn setters_write_through() {
        let path = temp_path("write");
        let mut config = ConfigData::load_from(path.clone());
        assert_eq!(config, ConfigData::load_from(path.clone()));
        config.set_list_type(ListType::Compact);
        config.set_hide_apis(true);

        let reloaded = ConfigData::load_from(path.clone());
        assert_eq!(reloaded.list_type(), ListType::Compact);
        assert_eq!(reloaded.hidden(), [false, false, false, true]);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn broken_file_falls_back() {
        let path = temp_path("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ nope").unwrap();
        let config = ConfigData::load_from(path.clone());
        assert!(config.history());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
