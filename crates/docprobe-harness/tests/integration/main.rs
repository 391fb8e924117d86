mod common;

mod browser_tests;
mod pipeline_tests;
mod session_tests;
