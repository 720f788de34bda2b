pub mod auth;
pub mod invitations;
pub mod listings;
pub mod pricing_factors;
pub mod user_factors;
pub mod users;
