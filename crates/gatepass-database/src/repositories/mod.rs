//! PostgreSQL repository implementations.

pub mod access_log;
pub mod qr_token;
pub mod user;

pub use access_log::AccessLogRepository;
pub use qr_token::QrTokenRepository;
pub use user::UserRepository;
