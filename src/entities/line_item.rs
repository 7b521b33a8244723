//! Line item entity - One billable line of an invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice line item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the invoice this line belongs to
    pub invoice_id: i64,
    /// Human-readable description of the billed item or service
    pub description: String,
    /// Quantity billed
    pub quantity: f64,
    /// Price per unit
    pub unit_price: f64,
}

/// Defines relationships between LineItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
