//! A "Move" / "Resize" context menu mirroring a controller's toggles.

use crate::{
    config::ControllerConfig,
    controller::InteractiveGeometryController,
    host::GeometryHost,
    store::GeometryStore,
};

/// Title given to menus created by the binder.
pub const MENU_TITLE: &str = "Layout";

/// What a menu item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    /// Toggle the moving mode.
    ToggleMove,
    /// Toggle the resizing mode.
    ToggleResize,
}

impl MenuAction {
    /// Label shown for the action.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ToggleMove => "Move",
            Self::ToggleResize => "Resize",
        }
    }
}

/// One checkable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Bound action.
    pub action: MenuAction,
    /// Display text.
    pub label: String,
    /// Check mark.
    pub checked: bool,
}

impl MenuItem {
    /// An unchecked item for `action`.
    pub fn new(action: MenuAction) -> Self {
        Self {
            action,
            label: action.label().to_string(),
            checked: false,
        }
    }
}

/// A widget's context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    /// Menu title.
    pub title: String,
    /// Entries, in display order.
    pub items: Vec<MenuItem>,
}

impl ContextMenu {
    /// The item bound to `action`, if present.
    pub fn item(&self, action: MenuAction) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.action == action)
    }
}

/// Which toggles a widget offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Moving is allowed.
    pub allow_move: bool,
    /// Resizing is allowed.
    pub allow_resize: bool,
}

impl From<&ControllerConfig> for Capabilities {
    fn from(c: &ControllerConfig) -> Self {
        Self {
            allow_move: c.allow_move,
            allow_resize: c.allow_resize,
        }
    }
}

/// Keeps a context menu in step with a controller.
pub struct MenuBinder;

impl MenuBinder {
    /// Make `menu` offer exactly the items `caps` allows. With no
    /// capabilities, or for an invisible widget, the menu is removed.
    pub fn sync(menu: &mut Option<ContextMenu>, caps: Capabilities, visible: bool) {
        if !visible || !(caps.allow_move || caps.allow_resize) {
            *menu = None;
            return;
        }
        let m = menu.get_or_insert_with(|| ContextMenu {
            title: MENU_TITLE.to_string(),
            items: Vec::new(),
        });
        for (action, wanted) in [
            (MenuAction::ToggleMove, caps.allow_move),
            (MenuAction::ToggleResize, caps.allow_resize),
        ] {
            let present = m.item(action).is_some();
            if wanted && !present {
                m.items.push(MenuItem::new(action));
            } else if !wanted && present {
                m.items.retain(|i| i.action != action);
            }
        }
        m.items.sort_by_key(|i| i.action == MenuAction::ToggleResize);
    }

    /// Set check marks from the controller's mode.
    pub fn refresh_checks(menu: &mut ContextMenu, controller: &InteractiveGeometryController) {
        for i in &mut menu.items {
            i.checked = match i.action {
                MenuAction::ToggleMove => controller.is_moving(),
                MenuAction::ToggleResize => controller.is_resizing(),
            };
        }
    }

    /// Run the toggle behind `action`. Returns whether the toggled mode is
    /// now active.
    pub fn activate(
        action: MenuAction,
        controller: &mut InteractiveGeometryController,
        host: &mut dyn GeometryHost,
        store: &GeometryStore,
    ) -> bool {
        match action {
            MenuAction::ToggleMove => controller.toggle_move(host, store),
            MenuAction::ToggleResize => controller.toggle_resize(host, store),
        }
    }
}
