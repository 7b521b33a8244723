//! Payment entity - The money-moved record behind a paid staff assignment.
//!
//! A payment row exists exactly while its assignment is in the `"paid"` state:
//! marking an assignment paid inserts one, marking it unpaid deletes it again.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the party the paid work was done for
    pub party_id: i64,
    /// ID of the assignment this payment settles
    pub staff_assignment_id: i64,
    /// Amount paid out: base amount plus bonus at the time of payment
    pub amount: f64,
    /// Date the payment was made, stored as `%Y-%m-%d`
    pub paid_on: String,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id"
    )]
    Party,
    /// Each payment settles one staff assignment
    #[sea_orm(
        belongs_to = "super::staff_assignment::Entity",
        from = "Column::StaffAssignmentId",
        to = "super::staff_assignment::Column::Id"
    )]
    StaffAssignment,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::staff_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
