pub mod achievements;
pub mod analytics;
pub mod domain;
pub mod expiry;
pub mod lifecycle;
pub mod ports;

pub use domain::{
    Achievement, AuthSession, Donation, DonationStatus, FoodCategory, FoodItem, FoodStatus,
    User, UserCredentials,
};
pub use expiry::{Clock, ExpiryTier, SystemClock};
pub use ports::{DatabaseService, PortError, PortResult};
