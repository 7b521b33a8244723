//! Installment entity - One scheduled payment unit of an installment-mode invoice.
//!
//! Installments are generated in a single batch at invoice-creation time.
//! `party_id` is denormalized from the invoice for query convenience.
//! Overdue is a display-time classification (pending past its due date),
//! never a stored status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Installment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    /// Unique identifier for the installment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the invoice this installment amortizes
    pub invoice_id: i64,
    /// ID of the owning party (denormalized for query convenience)
    pub party_id: i64,
    /// Position in the plan, 1-indexed
    pub sequence_no: i32,
    /// Amount due for this installment
    pub amount: f64,
    /// Due date, stored as `%Y-%m-%d`
    pub due_date: String,
    /// Payment status: `"pending"` or `"paid"`
    pub status: String,
    /// Date the installment was paid, stored as `%Y-%m-%d`
    pub payment_date: Option<String>,
    /// How the installment was paid (cash, transfer, ...)
    pub payment_method: Option<String>,
    /// Free-text notes about this installment
    pub notes: Option<String>,
}

/// Defines relationships between Installment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each installment belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
    /// Each installment belongs to one party
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id"
    )]
    Party,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
