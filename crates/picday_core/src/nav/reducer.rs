//! Pure navigation reducer.
//!
//! # Responsibility
//! - Map `(NavigationState, NavEvent)` to a replacement state and ordered
//!   effects.
//!
//! # Invariants
//! - Deterministic and synchronous; the input state is never mutated.
//! - An empty stack, a pop at the root, or a malformed deep link yields the
//!   input state unchanged with no effects.
//! - `UpdateSelectedDate` is always emitted before the matching `Navigate`.

use super::deep_link::DeepLinkParser;
use super::event::{NavEffect, NavEvent, NavTransition};
use super::route::{NavigationState, RouteNode, Tab, WriteMode};
use crate::config::DeepLinkConfig;
use crate::model::entry::EntryId;
use chrono::NaiveDate;
use log::{debug, warn};

/// Reduces `event` against `state` using the default deep-link origin.
pub fn reduce(state: &NavigationState, event: &NavEvent) -> NavTransition {
    NavReducer::default().reduce(state, event)
}

/// Navigation reducer bound to one deep-link configuration.
#[derive(Debug, Clone, Default)]
pub struct NavReducer {
    deep_links: DeepLinkParser,
}

impl NavReducer {
    pub fn new(config: &DeepLinkConfig) -> Self {
        Self {
            deep_links: DeepLinkParser::new(config),
        }
    }

    pub fn reduce(&self, state: &NavigationState, event: &NavEvent) -> NavTransition {
        if state.back_stack.is_empty() {
            warn!(
                "event=nav_reduce module=nav status=skip reason=empty_stack nav_event={}",
                event.name()
            );
            return NavTransition::unchanged(state);
        }

        match event {
            NavEvent::BottomTabClick(tab) => switch_tab(state, *tab),
            NavEvent::CalendarDateSelected(date, mode) | NavEvent::DiaryWriteClick(date, mode) => {
                open_write(state, *date, *mode, None)
            }
            NavEvent::DiaryEditClick(date, entry_id) => {
                open_write(state, *date, WriteMode::View, Some(*entry_id))
            }
            NavEvent::WriteAddClick(date) => push_add(state, *date),
            NavEvent::WriteBack | NavEvent::WriteSaveComplete | NavEvent::WriteDeleteComplete => {
                pop(state)
            }
            NavEvent::ProcessDeepLink(uri) => self.open_deep_link(state, uri.as_deref()),
        }
    }

    fn open_deep_link(&self, state: &NavigationState, uri: Option<&str>) -> NavTransition {
        let Some(date) = uri.and_then(|raw| self.deep_links.parse_diary_date(raw)) else {
            debug!(
                "event=nav_deep_link module=nav status=skip present={}",
                uri.is_some()
            );
            return NavTransition::unchanged(state);
        };

        NavTransition {
            state: NavigationState {
                back_stack: vec![RouteNode::Calendar, RouteNode::Diary],
                selected_date: Some(date),
            },
            effects: vec![
                NavEffect::UpdateSelectedDate(date),
                NavEffect::ReplaceRoot(RouteNode::Calendar),
                NavEffect::Navigate(RouteNode::Diary),
            ],
        }
    }
}

fn switch_tab(state: &NavigationState, tab: Tab) -> NavTransition {
    let target = tab.node();
    if state.root() == Some(&target) {
        return NavTransition::unchanged(state);
    }

    NavTransition {
        state: NavigationState {
            back_stack: vec![target.clone()],
            selected_date: state.selected_date,
        },
        effects: vec![NavEffect::ReplaceRoot(target)],
    }
}

fn open_write(
    state: &NavigationState,
    date: NaiveDate,
    mode: WriteMode,
    editing_entry_id: Option<EntryId>,
) -> NavTransition {
    let node = RouteNode::write(date, mode, editing_entry_id);
    let mut back_stack = state.back_stack.clone();
    back_stack.push(node.clone());

    let mut effects = vec![
        NavEffect::UpdateSelectedDate(date),
        NavEffect::Navigate(node),
    ];
    if let Some(entry_id) = editing_entry_id {
        effects.push(NavEffect::ConsumeEditEntry(entry_id));
    }

    NavTransition {
        state: NavigationState {
            back_stack,
            selected_date: Some(date),
        },
        effects,
    }
}

fn push_add(state: &NavigationState, date: NaiveDate) -> NavTransition {
    let node = RouteNode::write(date, WriteMode::Add, None);
    let mut back_stack = state.back_stack.clone();
    back_stack.push(node.clone());

    NavTransition {
        state: NavigationState {
            back_stack,
            selected_date: state.selected_date,
        },
        effects: vec![NavEffect::Navigate(node)],
    }
}

fn pop(state: &NavigationState) -> NavTransition {
    if state.back_stack.len() <= 1 {
        return NavTransition::unchanged(state);
    }

    let mut back_stack = state.back_stack.clone();
    back_stack.pop();
    NavTransition {
        state: NavigationState {
            back_stack,
            selected_date: state.selected_date,
        },
        effects: vec![NavEffect::Pop],
    }
}

#[cfg(test)]
mod tests {
    use super::reduce;
    use crate::nav::event::{NavEffect, NavEvent};
    use crate::nav::route::{NavigationState, RouteNode, Tab};

    #[test]
    fn empty_stack_is_absorbed() {
        let state = NavigationState {
            back_stack: Vec::new(),
            selected_date: None,
        };
        let transition = reduce(&state, &NavEvent::BottomTabClick(Tab::Diary));
        assert_eq!(transition.state, state);
        assert!(transition.is_noop());
    }

    #[test]
    fn tab_switch_replaces_whole_stack() {
        let state = NavigationState {
            back_stack: vec![RouteNode::Calendar, RouteNode::Diary],
            selected_date: None,
        };
        let transition = reduce(&state, &NavEvent::BottomTabClick(Tab::Diary));
        assert_eq!(transition.state.back_stack, vec![RouteNode::Diary]);
        assert_eq!(
            transition.effects,
            vec![NavEffect::ReplaceRoot(RouteNode::Diary)]
        );
    }
}
