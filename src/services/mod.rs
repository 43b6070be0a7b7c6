//! Background services that run beside the HTTP router.

pub mod sweeper;
