//! Staff assignment entity - Binds one freelance worker to one party.
//!
//! Each assignment carries the agreed base amount, an optional bonus with a
//! free-text reason, a payment status, and a confirmation status. The total
//! payable for an assignment is `base_amount + bonus_amount`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the party this assignment belongs to
    pub party_id: i64,
    /// Name of the freelancer (reference into the external staff profile store)
    pub staff_name: String,
    /// Agreed base amount for working this party
    pub base_amount: f64,
    /// Bonus on top of the base amount; defaults to the freelancer's standing
    /// fixed bonus at assignment time
    pub bonus_amount: f64,
    /// Free-text reason for the bonus, if any
    pub bonus_reason: Option<String>,
    /// Payment status: `"pending"` or `"paid"`
    pub payment_status: String,
    /// Confirmation status: `"pending"` or `"confirmed"`
    pub confirmation_status: String,
}

/// Defines relationships between StaffAssignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id"
    )]
    Party,
    /// A paid assignment has exactly one payment record
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
