//! Headless client core for the SkillHub course-purchasing platform:
//! cart state and server reconciliation, the payment-gateway checkout
//! handshake, and order-tracking reconciliation. Rendering is the host's
//! job; everything user-visible flows through [`notify::Notifier`].

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod model;
pub mod notify;
pub mod orders;
pub mod session;
pub mod sync;
