//! Message model: typed values, the erased envelope, and delivery groups.
//!
//! This module groups the message **data model** used by the routing engine:
//! - [`Message`] marker trait for values that can travel through the bus
//! - [`AnyMessage`] type-erased envelope carrying the routing `TypeId`
//! - [`Token`] opaque key partitioning subscribers into delivery groups
//!
//! The concrete type of a message is its only routing key: matching is exact
//! `TypeId` equality, never structural or supertype matching.

mod message;
mod token;

pub use message::{AnyMessage, Message};
pub use token::Token;
