//! Route nodes and navigation state values.

use crate::model::entry::EntryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mode a Write route opens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Compose a new entry for the date.
    Add,
    /// Browse entries for the date; editing starts from here.
    View,
}

impl WriteMode {
    /// Stable string label used by FFI inputs and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::View => "view",
        }
    }

    /// Parses a mode label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "view" => Some(Self::View),
            _ => None,
        }
    }
}

/// Bottom-bar tab. The only route kinds allowed at the stack root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Calendar,
    Diary,
}

impl Tab {
    /// Route node this tab maps to.
    pub fn node(self) -> RouteNode {
        match self {
            Self::Calendar => RouteNode::Calendar,
            Self::Diary => RouteNode::Diary,
        }
    }

    /// Parses a tab label, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "calendar" => Some(Self::Calendar),
            "diary" => Some(Self::Diary),
            _ => None,
        }
    }
}

/// One screen in the back-stack. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum RouteNode {
    Calendar,
    Diary,
    Write {
        date: NaiveDate,
        mode: WriteMode,
        editing_entry_id: Option<EntryId>,
    },
}

impl RouteNode {
    pub fn write(date: NaiveDate, mode: WriteMode, editing_entry_id: Option<EntryId>) -> Self {
        Self::Write {
            date,
            mode,
            editing_entry_id,
        }
    }

    /// Returns the tab when this node may sit at the stack root.
    pub fn as_tab(&self) -> Option<Tab> {
        match self {
            Self::Calendar => Some(Tab::Calendar),
            Self::Diary => Some(Tab::Diary),
            Self::Write { .. } => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.as_tab().is_some()
    }

    /// Short metadata-only label, e.g. `write:2026-01-22:add`.
    pub fn label(&self) -> String {
        match self {
            Self::Calendar => "calendar".to_string(),
            Self::Diary => "diary".to_string(),
            Self::Write { date, mode, .. } => format!("write:{date}:{}", mode.as_str()),
        }
    }
}

/// Ordered route stack plus the date shared by calendar and diary screens.
///
/// # Invariants
/// - `back_stack` is non-empty; the first element is `Calendar` or `Diary`.
/// - The last element is the visible screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    pub back_stack: Vec<RouteNode>,
    pub selected_date: Option<NaiveDate>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new(Tab::Calendar)
    }
}

impl NavigationState {
    /// Creates a single-root state with no selected date.
    pub fn new(root: Tab) -> Self {
        Self {
            back_stack: vec![root.node()],
            selected_date: None,
        }
    }

    pub fn root(&self) -> Option<&RouteNode> {
        self.back_stack.first()
    }

    /// Currently visible route.
    pub fn top(&self) -> Option<&RouteNode> {
        self.back_stack.last()
    }

    /// Returns whether the stack satisfies the root invariant.
    pub fn is_well_formed(&self) -> bool {
        self.root().is_some_and(RouteNode::is_root)
    }
}
