//! Chain app: the long-lived coordinator host process and its transport.
pub mod platform;
