mod common;
mod format_tests;
mod info_tests;
mod stage_tests;
