//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `picday_core` linkage.
//! - Optionally reduce one deep link from the default state and print the
//!   resulting stack, for quick local checks of link handling.

use picday_core::{reduce, NavEvent, NavigationState, RouteNode};

fn main() {
    println!("picday_core ping={}", picday_core::ping());
    println!("picday_core version={}", picday_core::core_version());

    let Some(link) = std::env::args().nth(1) else {
        return;
    };
    let transition = reduce(
        &NavigationState::default(),
        &NavEvent::ProcessDeepLink(Some(link)),
    );
    let stack = transition
        .state
        .back_stack
        .iter()
        .map(RouteNode::label)
        .collect::<Vec<_>>()
        .join(" > ");
    let selected = transition
        .state
        .selected_date
        .map(|date| date.to_string())
        .unwrap_or_else(|| "none".to_string());

    println!("deep_link handled={}", !transition.is_noop());
    println!("deep_link stack={stack}");
    println!("deep_link selected_date={selected}");
}
