//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod installment;
pub mod invoice;
pub mod line_item;
pub mod party;
pub mod payment;
pub mod staff_assignment;

// Re-export specific types to avoid conflicts
pub use installment::{Column as InstallmentColumn, Entity as Installment, Model as InstallmentModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use line_item::{Column as LineItemColumn, Entity as LineItem, Model as LineItemModel};
pub use party::{Column as PartyColumn, Entity as Party, Model as PartyModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use staff_assignment::{
    Column as StaffAssignmentColumn, Entity as StaffAssignment, Model as StaffAssignmentModel,
};
