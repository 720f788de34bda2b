pub mod auth;
pub mod invitation_service;
pub mod listing_service;
pub mod price_calculator;
pub mod pricing_service;
pub mod rule_store;
pub mod user_service;
