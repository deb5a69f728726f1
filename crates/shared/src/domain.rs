use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.0)
            }
        }
    };
}

id_newtype!(WindowId);
id_newtype!(ControlId);

/// Outcome code reported by a modal window when it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionMode {
    #[default]
    None,
    Ok,
    Cancel,
    Abort,
    Retry,
    Ignore,
    Yes,
    No,
}

impl ActionMode {
    /// Dialog-result code of a dispatch that did not end in a modal window.
    pub const NOT_A_DIALOG: i32 = -1;

    const ALL: [ActionMode; 8] = [
        ActionMode::None,
        ActionMode::Ok,
        ActionMode::Cancel,
        ActionMode::Abort,
        ActionMode::Retry,
        ActionMode::Ignore,
        ActionMode::Yes,
        ActionMode::No,
    ];

    pub fn code(self) -> i32 {
        match self {
            ActionMode::None => 0,
            ActionMode::Ok => 1,
            ActionMode::Cancel => 2,
            ActionMode::Abort => 3,
            ActionMode::Retry => 4,
            ActionMode::Ignore => 5,
            ActionMode::Yes => 6,
            ActionMode::No => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.code() == code)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.label().eq_ignore_ascii_case(raw))
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionMode::None => "none",
            ActionMode::Ok => "ok",
            ActionMode::Cancel => "cancel",
            ActionMode::Abort => "abort",
            ActionMode::Retry => "retry",
            ActionMode::Ignore => "ignore",
            ActionMode::Yes => "yes",
            ActionMode::No => "no",
        }
    }
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the next view of a dispatch is created or activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationMode {
    /// No window is open yet: the view becomes the application's top-level surface.
    FirstWindow,
    Dialog,
    #[default]
    Plain,
    MdiChild,
}

/// What a wired control event does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToActionFlag {
    /// Always open a new plain window.
    View,
    /// Activate the existing plain window, creating it when none is open.
    #[default]
    ViewActived,
    Dialog,
    /// Always open a new MDI child.
    Child,
    ChildActived,
}

impl ToActionFlag {
    pub fn creation_mode(self) -> CreationMode {
        match self {
            ToActionFlag::View | ToActionFlag::ViewActived => CreationMode::Plain,
            ToActionFlag::Dialog => CreationMode::Dialog,
            ToActionFlag::Child | ToActionFlag::ChildActived => CreationMode::MdiChild,
        }
    }

    pub fn always_create(self) -> bool {
        matches!(self, ToActionFlag::View | ToActionFlag::Child)
    }
}

/// Identity of the action that produced a view result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOrigin {
    /// The controller's `Index` action: an existing window is activated, not refreshed.
    Entry,
    SubAction,
}

impl ActionOrigin {
    pub fn is_entry(self) -> bool {
        self == ActionOrigin::Entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialog_codes_round_trip_and_reject_unknown() {
        assert_eq!(ActionMode::from_code(ActionMode::Ok.code()), Some(ActionMode::Ok));
        assert_eq!(ActionMode::from_code(ActionMode::NOT_A_DIALOG), None);
        assert_eq!(ActionMode::parse(" Cancel "), Some(ActionMode::Cancel));
        assert_eq!(ActionMode::parse("maybe"), None);
    }

    #[test]
    fn action_flags_map_to_creation_modes() {
        assert_eq!(ToActionFlag::Child.creation_mode(), CreationMode::MdiChild);
        assert!(ToActionFlag::Child.always_create());
        assert!(!ToActionFlag::ChildActived.always_create());
        assert_eq!(ToActionFlag::Dialog.creation_mode(), CreationMode::Dialog);
    }
}
