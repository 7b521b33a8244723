//! Invoice entity - The client-facing budget/bill for a party.
//!
//! At most one invoice exists per party. The `total` column is always
//! recomputed from the invoice's line items minus discount plus surcharge;
//! it is never edited independently of its inputs. `payment_status` is the
//! authoritative client-payment input to the party status engine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the party this invoice bills for
    pub party_id: i64,
    /// Discount subtracted from the line-item sum
    pub discount: f64,
    /// Surcharge added on top of the line-item sum
    pub surcharge: f64,
    /// Invoice total: sum of line items - discount + surcharge
    pub total: f64,
    /// Payment mode: `"lump_sum"` or `"installments"`
    pub payment_mode: String,
    /// Number of installments when `payment_mode` is `"installments"`
    pub installment_count: i32,
    /// Amount paid up front before the installment plan starts
    pub down_payment: f64,
    /// Client payment status: `"pending"`, `"partially_paid"`, or `"fully_paid"`
    pub payment_status: String,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice belongs to one party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id"
    )]
    Party,
    /// One invoice has many line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
    /// One invoice has many installments
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
