//! Repositories module - Database access, one repository per entity
//!
//! Queries are built at runtime (`sqlx::query_as::<_, T>` and `QueryBuilder`)
//! and decoded through `FromRow`, so building the crate needs no live database.
//! Status changes go through `transition` methods that update with
//! `WHERE status = <observed>` and return `None` when another request won.

pub mod ad_request;
pub mod call;
pub mod chat;
pub mod message;
pub mod notification;
pub mod order;
pub mod portfolio;
pub mod rating;
pub mod support;
pub mod traits;
pub mod user;

pub use traits::{Create, Delete, Read, Update};

pub use ad_request::AdRequestRepository;
pub use call::CallRepository;
pub use chat::ChatRepository;
pub use message::MessageRepository;
pub use notification::NotificationRepository;
pub use order::OrderRepository;
pub use portfolio::PortfolioRepository;
pub use rating::RatingRepository;
pub use support::SupportRepository;
pub use user::UserRepository;
