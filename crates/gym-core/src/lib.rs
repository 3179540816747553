//! # gym-core
//!
//! Domain model and storage abstraction for the gym membership backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         GymStore                              │
//! │  ┌──────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐  │
//! │  │  Users   │  │ Payments  │──│ Memberships │  │ Contacts │  │
//! │  └──────────┘  └───────────┘  └─────────────┘  └──────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Membership` only ever comes out of `GymStore::activate_payment`, which
//! marks the originating `Payment` paid in the same atomic step.

pub mod error;
pub mod ids;
pub mod model;
pub mod plan;
pub mod store;

pub use error::{GymError, Result};
pub use ids::{ContactId, MembershipId, PaymentId, UserId};
pub use model::{
    Contact, Membership, MembershipStatus, NewContact, NewPayment, NewUser, Payment,
    PaymentStatus, User, UserProfile, MEMBERSHIP_DURATION_DAYS,
};
pub use plan::{Plan, PlanDetails};
pub use store::{Activation, GymStore, MemoryStore, PaymentCompletion};
