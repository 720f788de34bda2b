pub mod activity;
pub mod auth;
pub mod invitation;
pub mod listing;
pub mod pricing;
