pub mod user_repo;
pub use user_repo::UserRepository;
pub mod pricing_repo;
pub use pricing_repo::PricingRepository;
pub mod invitation_repo;
pub use invitation_repo::InvitationRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
