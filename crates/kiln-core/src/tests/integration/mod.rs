pub mod boot_tests;
pub mod common;
