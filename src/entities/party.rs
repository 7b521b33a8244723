//! Party entity - Represents one scheduled client event.
//!
//! Each party has a client, a calendar date, an optional start time, a lifecycle
//! status, and a cached freelancer-payment aggregate. Dates and times are stored
//! as text (`%Y-%m-%d` / `%H:%M`) and parsed at reconciliation time, so a
//! malformed row degrades to a per-party skip instead of poisoning a batch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Party database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    /// Unique identifier for the party
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the client the event is booked for
    pub client_name: String,
    /// Scheduled calendar date, stored as `%Y-%m-%d`
    pub event_date: String,
    /// Optional start time of day, stored as `%H:%M`; None means the whole day
    pub event_time: Option<String>,
    /// Lifecycle status: `"planning"`, `"confirmed"`, `"happening"`,
    /// `"ended_pending"`, `"ended"`, or `"cancelled"`
    pub status: String,
    /// Cached aggregate of the staff payment set: `"pending"`, `"partial"`,
    /// or `"paid"`. Derived - recomputed after every assignment mutation,
    /// never edited directly.
    pub freelancer_payment_status: String,
    /// Soft delete flag - if true, party is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Party and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One party has many staff assignments
    #[sea_orm(has_many = "super::staff_assignment::Entity")]
    StaffAssignments,
    /// One party has at most one invoice
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
    /// One party has many installments (denormalized through its invoice)
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
    /// One party has many staff payment records
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::staff_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffAssignments.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
