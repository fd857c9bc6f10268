//! Integration tests driving the full gameplay plugin.

mod enemy_lifecycle;
mod state_transitions;
