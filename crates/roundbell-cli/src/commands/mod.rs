pub mod accelerations;
pub mod config;
pub mod run;
