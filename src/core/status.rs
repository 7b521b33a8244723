//! Party status state machine.
//!
//! Statuses are stored as text on the entity rows and round-tripped through
//! the typed enums in this module. The two reconcile functions below are the
//! only code that advances a party past `confirmed` automatically: one is
//! driven by wall-clock time crossing the scheduled event time, the other by
//! payment completeness. Both are idempotent, so re-running a reconciliation
//! pass never produces a different outcome.

use crate::{
    entities::party,
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, IntoActiveModel, Set};
use tracing::{debug, info};

/// Lifecycle status of a party.
///
/// Forward path: `Planning -> Confirmed -> (Happening) -> EndedPending -> Ended`.
/// `Cancelled` is terminal and reachable from any non-terminal state.
/// `Happening` is only ever set manually, never derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyStatus {
    /// Being scoped with the client; nothing is committed yet
    Planning,
    /// Booked and scheduled; eligible for time-based reconciliation
    Confirmed,
    /// Manually flagged as currently in progress
    Happening,
    /// The event time has passed but money is still owed on one side
    EndedPending,
    /// The event is over and both client and staff are fully settled
    Ended,
    /// Called off; terminal
    Cancelled,
}

impl PartyStatus {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Confirmed => "confirmed",
            Self::Happening => "happening",
            Self::EndedPending => "ended_pending",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stored status string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "planning" => Ok(Self::Planning),
            "confirmed" => Ok(Self::Confirmed),
            "happening" => Ok(Self::Happening),
            "ended_pending" => Ok(Self::EndedPending),
            "ended" => Ok(Self::Ended),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }

    /// Whether this status admits no further transitions
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Cancelled)
    }

    /// Whether a manual transition from `self` to `to` is allowed.
    ///
    /// The reconcile functions bypass this check; it guards only
    /// user-initiated transitions (confirm, mark happening, cancel).
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        match (self, to) {
            (Self::Planning, Self::Confirmed) | (Self::Confirmed, Self::Happening) => true,
            // Cancellation is allowed from any non-terminal state
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Aggregate freelancer-payment status of a party, derived from its
/// staff assignment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreelancerPaymentStatus {
    /// No assignment has been paid
    Pending,
    /// At least one assignment paid, at least one still owed
    Partial,
    /// Every assignment paid, or no staff assigned (nothing owed)
    Paid,
}

impl FreelancerPaymentStatus {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }

    /// Parses a stored status string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "partial" => Ok(Self::Partial),
            "paid" => Ok(Self::Paid),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Client payment completeness of a party's invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPaymentStatus {
    /// Nothing received yet
    Pending,
    /// Some but not all of the invoice total received
    PartiallyPaid,
    /// Invoice settled in full
    FullyPaid,
}

impl ClientPaymentStatus {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::FullyPaid => "fully_paid",
        }
    }

    /// Parses a stored status string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "fully_paid" => Ok(Self::FullyPaid),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Payment status of a single staff assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffPaymentStatus {
    /// Not yet paid out
    Pending,
    /// Paid out; a payment record exists for it
    Paid,
}

impl StaffPaymentStatus {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Parses a stored status string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Stored payment status of a single installment.
///
/// Overdue is not stored: it is a display-time classification of a pending
/// installment whose due date has passed (see `core::installment`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentStatus {
    /// Not yet paid
    Pending,
    /// Paid; terminal for the installment
    Paid,
}

impl InstallmentStatus {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }

    /// Parses a stored status string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// How a client settles an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// One payment covering the whole invoice
    LumpSum,
    /// Down payment plus a monthly installment plan
    Installments,
}

impl PaymentMode {
    /// String representation stored in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LumpSum => "lump_sum",
            Self::Installments => "installments",
        }
    }

    /// Parses a stored mode string
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "lump_sum" => Ok(Self::LumpSum),
            "installments" => Ok(Self::Installments),
            other => Err(Error::UnknownStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// Computes the instant a party is considered over.
///
/// With a start time set this is `event_date + event_time`; with no start
/// time the party is treated as lasting the whole day and ends at 23:59:59.
/// No duration is tracked at this layer.
pub fn effective_end(event_date: &str, event_time: Option<&str>) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(event_date, "%Y-%m-%d").map_err(|_| Error::InvalidDate {
        value: event_date.to_string(),
    })?;

    match event_time {
        Some(raw) => {
            let time = NaiveTime::parse_from_str(raw, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
                .map_err(|_| Error::InvalidDate {
                    value: raw.to_string(),
                })?;
            Ok(date.and_time(time))
        }
        // End-of-day fallback: no start time means the party blocks the
        // whole day, so it only counts as over once the day is.
        None => date.and_hms_opt(23, 59, 59).ok_or_else(|| Error::InvalidDate {
            value: event_date.to_string(),
        }),
    }
}

/// Advances a `confirmed` party whose scheduled time has passed.
///
/// Once `now` reaches the party's effective end the party becomes `ended`
/// when both payment sides are settled, and `ended_pending` otherwise.
/// Parties in any other status are left untouched, and calling this again
/// with the same inputs yields the same result.
///
/// Returns the party's (possibly unchanged) status; persists it on change.
pub async fn reconcile_time_based_status(
    db: &DatabaseConnection,
    party: &party::Model,
    client: ClientPaymentStatus,
    freelancer: FreelancerPaymentStatus,
    now: NaiveDateTime,
) -> Result<PartyStatus> {
    let current = PartyStatus::parse(&party.status)?;
    if current != PartyStatus::Confirmed {
        return Ok(current);
    }

    let end = effective_end(&party.event_date, party.event_time.as_deref())?;
    if now < end {
        debug!(party_id = party.id, "Party has not reached its end time yet");
        return Ok(current);
    }

    let next = if client == ClientPaymentStatus::FullyPaid
        && freelancer == FreelancerPaymentStatus::Paid
    {
        PartyStatus::Ended
    } else {
        PartyStatus::EndedPending
    };

    persist_status(db, party, next).await?;
    info!(
        party_id = party.id,
        from = current.as_str(),
        to = next.as_str(),
        "Advanced party past its scheduled end time"
    );
    Ok(next)
}

/// Completes an `ended_pending` party once both payment sides are settled.
///
/// This transition is payment-driven rather than time-driven: it is re-run
/// after every payment event so a party closes as soon as the last debt on
/// either side clears. Parties in any other status are left untouched.
pub async fn reconcile_pending_to_ended(
    db: &DatabaseConnection,
    party: &party::Model,
    client: ClientPaymentStatus,
    freelancer: FreelancerPaymentStatus,
) -> Result<PartyStatus> {
    let current = PartyStatus::parse(&party.status)?;
    if current != PartyStatus::EndedPending {
        return Ok(current);
    }

    if client != ClientPaymentStatus::FullyPaid || freelancer != FreelancerPaymentStatus::Paid {
        return Ok(current);
    }

    persist_status(db, party, PartyStatus::Ended).await?;
    info!(party_id = party.id, "Party fully settled, closing it out");
    Ok(PartyStatus::Ended)
}

/// Writes a new status onto the party row.
async fn persist_status(
    db: &DatabaseConnection,
    party: &party::Model,
    status: PartyStatus,
) -> Result<()> {
    let mut active = party.clone().into_active_model();
    active.status = Set(status.as_str().to_string());
    active.update(db).await?;
    Ok(())
}
