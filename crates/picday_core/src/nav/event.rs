//! Navigation intents, effects, and reducer output.

use super::route::{NavigationState, RouteNode, Tab, WriteMode};
use crate::model::entry::EntryId;
use chrono::NaiveDate;

/// Discrete user intent fed to the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    BottomTabClick(Tab),
    CalendarDateSelected(NaiveDate, WriteMode),
    DiaryWriteClick(NaiveDate, WriteMode),
    DiaryEditClick(NaiveDate, EntryId),
    WriteAddClick(NaiveDate),
    WriteBack,
    WriteSaveComplete,
    WriteDeleteComplete,
    ProcessDeepLink(Option<String>),
}

impl NavEvent {
    /// Stable event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BottomTabClick(_) => "bottom_tab_click",
            Self::CalendarDateSelected(..) => "calendar_date_selected",
            Self::DiaryWriteClick(..) => "diary_write_click",
            Self::DiaryEditClick(..) => "diary_edit_click",
            Self::WriteAddClick(_) => "write_add_click",
            Self::WriteBack => "write_back",
            Self::WriteSaveComplete => "write_save_complete",
            Self::WriteDeleteComplete => "write_delete_complete",
            Self::ProcessDeepLink(_) => "process_deep_link",
        }
    }
}

/// Side effect the host applies after a transition. Order is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    Navigate(RouteNode),
    ReplaceRoot(RouteNode),
    Pop,
    PopToRoot,
    UpdateSelectedDate(NaiveDate),
    /// Clears the UI's transient pending-edit id so it is not reapplied.
    ConsumeEditEntry(EntryId),
}

/// Reducer output: the replacement state and the effects to apply in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTransition {
    pub state: NavigationState,
    pub effects: Vec<NavEffect>,
}

impl NavTransition {
    /// Transition that keeps `state` and emits nothing.
    pub fn unchanged(state: &NavigationState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }
}
