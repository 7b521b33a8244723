//! Core business logic for `PartyLedger`.
//!
//! Framework-agnostic operations over the entity layer: party lifecycle,
//! staff assignment and payment, client billing with installment plans,
//! and the reconciliation engine that ties them together.

/// Installment scheduling and amortization for installment-mode invoices
pub mod installment;
/// Invoice business logic - line items, totals, client payment status
pub mod invoice;
/// Party lifecycle operations - creation, manual transitions, cascade delete
pub mod party;
/// Payment aggregation - deriving a party's freelancer-payment status
pub mod payment;
/// Reconciliation orchestration - payment events and the batch status pass
pub mod reconcile;
/// Financial report generation for a single party
pub mod report;
/// Party status state machine and typed status values
pub mod status;
/// Staff assignment operations - adding, editing, confirming, removing
pub mod staff;
