//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod campaign;
pub mod donation;
pub mod donor;
pub mod event;
pub mod event_attendance;

// Re-export specific types to avoid conflicts
pub use campaign::{Column as CampaignColumn, Entity as Campaign, Model as CampaignModel};
pub use donation::{Column as DonationColumn, Entity as Donation, Model as DonationModel};
pub use donor::{Column as DonorColumn, Entity as Donor, Model as DonorModel};
pub use event::{Column as EventColumn, Entity as Event, Model as EventModel};
pub use event_attendance::{
    Column as EventAttendanceColumn, Entity as EventAttendance, Model as EventAttendanceModel,
};
