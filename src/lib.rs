//! hostguard - block domains through the hosts file, with a deliberate delay before unblocking.

pub mod blocker;
pub mod cli;
pub mod clock;
pub mod config;
pub mod doctor;
pub mod domain;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod platform;
pub mod store;
pub mod timer;
