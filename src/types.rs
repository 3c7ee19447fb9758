/*
 * Platform-agnostic types describing what a dialog invocation needs. Each
 * request object replaces the process-wide "current message" state a modal
 * dialog would otherwise read: the caller builds one, hands it to the host,
 * and the dialog procedure receives it through its init parameter.
 */

/// Numeric id of a dialog template in the module's resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(pub u16);

impl DialogId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// Numeric id of a control inside a dialog template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub i32);

impl ControlId {
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Id of the `index`-th control in a contiguous id range starting here.
    pub const fn offset(self, index: usize) -> Self {
        Self(self.0 + index as i32)
    }
}

/// The kinds of modal dialog the host can show; each kind admits one
/// invocation at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Notification,
    Selection,
    List,
}

impl DialogKind {
    pub(crate) const ALL: [DialogKind; 3] =
        [DialogKind::Notification, DialogKind::Selection, DialogKind::List];

    pub(crate) fn index(self) -> usize {
        match self {
            DialogKind::Notification => 0,
            DialogKind::Selection => 1,
            DialogKind::List => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    /// Warning icon with Yes/No buttons.
    WarningQuestion,
    Error,
    Question,
}

impl NotificationKind {
    /// Whether the dialog offers a Yes button next to No.
    pub fn is_question(self) -> bool {
        matches!(
            self,
            NotificationKind::WarningQuestion | NotificationKind::Question
        )
    }
}

/// Target of the optional "More information" button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoreInfo {
    Url(String),
    Dialog(DialogId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationRequest {
    pub kind: NotificationKind,
    pub title: String,
    pub text: String,
    /// Settings key written `true` when "don't display again" is ticked.
    pub dont_display_setting: Option<String>,
    pub more_info: Option<MoreInfo>,
}

impl NotificationRequest {
    pub fn new(kind: NotificationKind, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            text: text.into(),
            dont_display_setting: None,
            more_info: None,
        }
    }

    pub fn with_dont_display_setting(mut self, key: impl Into<String>) -> Self {
        self.dont_display_setting = Some(key.into());
        self
    }

    pub fn with_more_info(mut self, more_info: MoreInfo) -> Self {
        self.more_info = Some(more_info);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStyle {
    #[default]
    Radio,
    CheckBox,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionRequest {
    pub style: SelectionStyle,
    pub title: String,
    pub message: String,
    pub choices: Vec<String>,
    /// Bit `i` set means choice `i` starts checked.
    pub initial_mask: u32,
    /// Choice that gets a username edit box next to it.
    pub username_index: Option<usize>,
}

/// Result of an accepted selection dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub mask: u32,
    /// Sanitized username, present only when a username field was requested.
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub title: String,
    pub message: String,
    pub items: Vec<String>,
}

/// Taskbar button progress indicator modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarState {
    NoProgress,
    Indeterminate,
    Normal,
    Error,
    Paused,
}
