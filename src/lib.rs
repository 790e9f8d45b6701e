//! User accounts for the clinic portal: an email-addressed user with a
//! doctor, patient or admin role, and a manager that creates regular and
//! administrative accounts on top of a pluggable store.

pub mod accounts;
pub mod config;
pub mod state;
