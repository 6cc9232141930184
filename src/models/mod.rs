//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod member;
pub mod group;
pub mod event;
pub mod donation;
pub mod admin;

// Re-export commonly used models
pub use member::{Member, CreateMemberRequest, UpdateMemberRequest, MemberFilter};
pub use group::{Group, GroupMember, GroupSummary, GroupKind, GroupRole, CreateGroupRequest, UpdateGroupRequest, AddGroupMemberRequest};
pub use event::{Event, EventAttendee, CreateEventRequest, UpdateEventRequest, RegisterAttendeeRequest, AttendanceCounts, CategoryAttendance};
pub use donation::{Donation, CreateDonationRequest, DonationFilter, DonationTotals};
pub use admin::{AdminSetting, ActivityEntry, ActivityKind, DashboardStats, Permission, UpsertSettingRequest, RecordActivityRequest};
