// Library half of the patterncmp CLI: console report and terminal viewer.
// Kept separate from main.rs so both are reachable from tests.

pub mod report;
pub mod tui;
