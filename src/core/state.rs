//! Application State - Shared state of the application
//!
//! Holds every repository, the token settings and the registry of
//! online WebSocket connections.

use crate::repositories::{
    AdRequestRepository, CallRepository, ChatRepository, MessageRepository,
    NotificationRepository, OrderRepository, PortfolioRepository, RatingRepository,
    SupportRepository, UserRepository,
};
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;

/// Global state shared by every route and middleware
pub struct AppState {
    pub user: UserRepository,
    pub portfolio: PortfolioRepository,
    pub order: OrderRepository,
    pub ad: AdRequestRepository,
    pub support: SupportRepository,
    pub chat: ChatRepository,
    pub msg: MessageRepository,
    pub call: CallRepository,
    pub rating: RatingRepository,
    pub notification: NotificationRepository,

    /// Secret key for JWT tokens
    pub jwt_secret: String,

    /// Lifetime of issued tokens and session cookies
    pub jwt_ttl_hours: i64,

    /// Online users and the channel feeding their WebSocket
    pub users_online: UserMap,
}

impl AppState {
    /// Creates the state, handing a clone of the pool to every repository
    ///
    /// # Arguments
    /// * `pool` - Shared SQLite connection pool
    /// * `jwt_secret` - Key used to sign JWT tokens
    /// * `jwt_ttl_hours` - Validity of issued tokens
    pub fn new(pool: SqlitePool, jwt_secret: String, jwt_ttl_hours: i64) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            portfolio: PortfolioRepository::new(pool.clone()),
            order: OrderRepository::new(pool.clone()),
            ad: AdRequestRepository::new(pool.clone()),
            support: SupportRepository::new(pool.clone()),
            chat: ChatRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            call: CallRepository::new(pool.clone()),
            rating: RatingRepository::new(pool.clone()),
            notification: NotificationRepository::new(pool),
            jwt_secret,
            jwt_ttl_hours,
            users_online: UserMap::new(),
        }
    }
}
