use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(Debug, Display, AsRefStr, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum DropEffect {
    Copy,
    Move,
}

/// The `effectAllowed` value a drag source declares.
#[derive(Debug, Display, EnumString, PartialEq, Eq, Clone, Copy)]
#[strum(ascii_case_insensitive)]
pub enum EffectAllowed {
    #[strum(serialize = "none")]
    None,
    #[strum(serialize = "copy")]
    Copy,
    #[strum(serialize = "move")]
    Move,
    #[strum(serialize = "link")]
    Link,
    #[strum(serialize = "copyMove")]
    CopyMove,
    #[strum(serialize = "copyLink")]
    CopyLink,
    #[strum(serialize = "linkMove")]
    LinkMove,
    #[strum(serialize = "all")]
    All,
    #[strum(serialize = "uninitialized")]
    Uninitialized,
}

impl Default for EffectAllowed {
    fn default() -> Self {
        EffectAllowed::Uninitialized
    }
}

impl EffectAllowed {
    /// Whether `move` is spelled out in the allowed set; `all` does not
    /// count. `Uninitialized` covers both an undeclared value and the literal
    /// `"uninitialized"` string, and both behave as `copyMove`.
    pub fn allows_move(&self) -> bool {
        matches!(
            self,
            EffectAllowed::Move
                | EffectAllowed::CopyMove
                | EffectAllowed::LinkMove
                | EffectAllowed::Uninitialized
        )
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else {
            Platform::Other
        }
    }
}

/// Modifier keys held while a drag is in progress.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct DragModifiers {
    pub ctrl: bool,
    pub meta: bool,
}

impl DragModifiers {
    pub fn command(platform: Platform) -> Self {
        match platform {
            Platform::Apple => DragModifiers {
                ctrl: false,
                meta: true,
            },
            Platform::Other => DragModifiers {
                ctrl: true,
                meta: false,
            },
        }
    }

    /// Cmd on Apple platforms, Ctrl everywhere else.
    pub fn command_held(&self, platform: Platform) -> bool {
        match platform {
            Platform::Apple => self.meta,
            Platform::Other => self.ctrl,
        }
    }
}

/// `Move` only when the command modifier is held, the payload is not a
/// history entry and the source allows moving. Everything else copies.
pub fn resolve_drop_effect(
    modifier_active: bool,
    allowed: EffectAllowed,
    history_origin: bool,
) -> DropEffect {
    if modifier_active && !history_origin && allowed.allows_move() {
        DropEffect::Move
    } else {
        DropEffect::Copy
    }
}

/// Keyboard hint such as `ctrl+s` or `meta+s`.
pub fn command_label(key: &str, platform: Platform) -> String {
    match platform {
        Platform::Apple => format!("meta+{}", key),
        Platform::Other => format!("ctrl+{}", key),
    }
}
