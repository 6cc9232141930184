//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod member;
pub mod group;
pub mod event;
pub mod donation;
pub mod admin;

// Re-export repositories
pub use member::MemberRepository;
pub use group::GroupRepository;
pub use event::EventRepository;
pub use donation::DonationRepository;
pub use admin::AdminRepository;
