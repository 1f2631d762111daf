//! Rental model and its approval workflow

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{book::BookStatus, user::UserClaims};
use crate::{
    error::{AppError, AppResult},
    permissions::{self, Access},
};

/// Rental status.
///
/// `Active` is kept so existing rows decode; no action moves a rental into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Approved,
    Active,
    Completed,
    Canceled,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Approved => "approved",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Canceled => "canceled",
        }
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rental as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: i32,
    #[serde(rename = "renter")]
    pub renter_id: i32,
    pub renter_name: String,
    #[serde(rename = "book")]
    pub book_id: i32,
    pub book_title: String,
    /// Owner of the rented book, used by permission checks only
    #[serde(skip)]
    pub book_owner_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RentalStatus,
}

/// Rental request. The renter is always the caller and the status starts at pending.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRental {
    #[serde(rename = "book")]
    pub book_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Rental update. Only the period may change; status moves through the actions.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRental {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Check constraint backing `validate_period` in the database
pub const RENTAL_PERIOD_CONSTRAINT: &str = "rentals_period_check";
pub const INVALID_PERIOD_MESSAGE: &str = "end_date must not be before start_date";

/// Reject periods that end before they start
pub fn validate_period(start_date: NaiveDate, end_date: NaiveDate) -> AppResult<()> {
    if end_date < start_date {
        return Err(AppError::Validation(INVALID_PERIOD_MESSAGE.to_string()));
    }
    Ok(())
}

/// Workflow actions on a rental
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalAction {
    Approve,
    Complete,
    Cancel,
}

/// Outcome of a permitted action: the new rental status and, when the book
/// changes too, its new status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub rental_status: RentalStatus,
    pub book_status: Option<BookStatus>,
}

impl RentalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalAction::Approve => "approve",
            RentalAction::Complete => "complete",
            RentalAction::Cancel => "cancel",
        }
    }

    /// Check that the caller may perform this action on the rental
    pub fn authorize(&self, claims: &UserClaims, rental: &Rental) -> AppResult<()> {
        match self {
            RentalAction::Approve => permissions::require(
                permissions::is_owner_or_read_only(claims, Access::Write, rental.book_owner_id),
                "You are not the owner of this book",
            ),
            RentalAction::Complete => permissions::require(
                permissions::is_renter_or_owner_or_admin(
                    claims,
                    Access::Write,
                    rental.renter_id,
                    rental.book_owner_id,
                ),
                "You are not authorized to complete this rental",
            ),
            RentalAction::Cancel => permissions::require(
                permissions::is_renter_or_owner_or_admin(
                    claims,
                    Access::Write,
                    rental.renter_id,
                    rental.book_owner_id,
                ),
                "You are not authorized to cancel this rental",
            ),
        }
    }

    /// Compute the transition from the current status
    pub fn transition(&self, current: RentalStatus) -> AppResult<Transition> {
        match (self, current) {
            (RentalAction::Approve, RentalStatus::Pending) => Ok(Transition {
                rental_status: RentalStatus::Approved,
                book_status: Some(BookStatus::Rented),
            }),
            (RentalAction::Approve, _) => Err(AppError::InvalidState(
                "This rental request is not in pending status".to_string(),
            )),
            (RentalAction::Complete, RentalStatus::Approved) => Ok(Transition {
                rental_status: RentalStatus::Completed,
                book_status: Some(BookStatus::Available),
            }),
            (RentalAction::Complete, _) => Err(AppError::InvalidState(
                "This rental is not in approved status".to_string(),
            )),
            (RentalAction::Cancel, RentalStatus::Pending) => Ok(Transition {
                rental_status: RentalStatus::Canceled,
                book_status: None,
            }),
            (RentalAction::Cancel, RentalStatus::Approved) => Ok(Transition {
                rental_status: RentalStatus::Canceled,
                book_status: Some(BookStatus::Available),
            }),
            (RentalAction::Cancel, _) => Err(AppError::InvalidState(
                "This rental cannot be canceled in its current status".to_string(),
            )),
        }
    }

    /// Permission first, then state
    pub fn apply(&self, claims: &UserClaims, rental: &Rental) -> AppResult<Transition> {
        self.authorize(claims, rental)?;
        self.transition(rental.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use crate::permissions::tests::claims;

    const RENTER: i32 = 10;
    const OWNER: i32 = 20;
    const ADMIN: i32 = 1;
    const STRANGER: i32 = 99;

    const ALL_STATUSES: [RentalStatus; 5] = [
        RentalStatus::Pending,
        RentalStatus::Approved,
        RentalStatus::Active,
        RentalStatus::Completed,
        RentalStatus::Canceled,
    ];

    fn rental(status: RentalStatus) -> Rental {
        Rental {
            id: 1,
            renter_id: RENTER,
            renter_name: "renter1".to_string(),
            book_id: 5,
            book_title: "The Great Gatsby".to_string(),
            book_owner_id: OWNER,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            status,
        }
    }

    #[test]
    fn approve_requires_owner_or_admin_and_pending() {
        let callers = [
            (claims(OWNER, Role::Owner), true),
            (claims(ADMIN, Role::Admin), true),
            (claims(RENTER, Role::Renter), false),
            (claims(STRANGER, Role::Owner), false),
        ];

        for (caller, allowed) in &callers {
            for status in ALL_STATUSES {
                let result = RentalAction::Approve.apply(caller, &rental(status));
                match (allowed, status) {
                    (true, RentalStatus::Pending) => assert_eq!(
                        result.unwrap(),
                        Transition {
                            rental_status: RentalStatus::Approved,
                            book_status: Some(BookStatus::Rented),
                        }
                    ),
                    (true, _) => assert!(matches!(result, Err(AppError::InvalidState(_)))),
                    (false, _) => assert!(matches!(result, Err(AppError::Authorization(_)))),
                }
            }
        }
    }

    #[test]
    fn complete_only_from_approved() {
        for caller in [
            claims(OWNER, Role::Owner),
            claims(RENTER, Role::Renter),
            claims(ADMIN, Role::Admin),
        ] {
            for status in ALL_STATUSES {
                let result = RentalAction::Complete.apply(&caller, &rental(status));
                if status == RentalStatus::Approved {
                    let transition = result.unwrap();
                    assert_eq!(transition.rental_status, RentalStatus::Completed);
                    assert_eq!(transition.book_status, Some(BookStatus::Available));
                } else {
                    assert!(matches!(result, Err(AppError::InvalidState(_))));
                }
            }
        }
    }

    #[test]
    fn complete_denied_to_outsiders() {
        let result = RentalAction::Complete.apply(&claims(STRANGER, Role::Viewer), &rental(RentalStatus::Approved));
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn cancel_from_pending_leaves_book_alone() {
        let transition = RentalAction::Cancel
            .apply(&claims(RENTER, Role::Renter), &rental(RentalStatus::Pending))
            .unwrap();
        assert_eq!(transition.rental_status, RentalStatus::Canceled);
        assert_eq!(transition.book_status, None);
    }

    #[test]
    fn cancel_from_approved_restores_book() {
        for caller in [
            claims(OWNER, Role::Owner),
            claims(RENTER, Role::Renter),
            claims(ADMIN, Role::Admin),
        ] {
            let transition = RentalAction::Cancel
                .apply(&caller, &rental(RentalStatus::Approved))
                .unwrap();
            assert_eq!(transition.rental_status, RentalStatus::Canceled);
            assert_eq!(transition.book_status, Some(BookStatus::Available));
        }
    }

    #[test]
    fn cancel_rejected_once_finished() {
        for status in [RentalStatus::Active, RentalStatus::Completed, RentalStatus::Canceled] {
            let result = RentalAction::Cancel.apply(&claims(RENTER, Role::Renter), &rental(status));
            assert!(matches!(result, Err(AppError::InvalidState(_))));
        }
    }

    #[test]
    fn permission_is_checked_before_state() {
        let result = RentalAction::Approve.apply(&claims(STRANGER, Role::Viewer), &rental(RentalStatus::Completed));
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn no_action_reaches_active() {
        for action in [RentalAction::Approve, RentalAction::Complete, RentalAction::Cancel] {
            for status in ALL_STATUSES {
                if let Ok(transition) = action.transition(status) {
                    assert_ne!(transition.rental_status, RentalStatus::Active);
                }
            }
        }
    }

    #[test]
    fn period_must_not_end_before_start() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert!(validate_period(start, start).is_ok());
        assert!(validate_period(start, start.succ_opt().unwrap()).is_ok());
        assert!(matches!(
            validate_period(start, start.pred_opt().unwrap()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn owner_id_is_not_serialized() {
        let value = serde_json::to_value(rental(RentalStatus::Pending)).unwrap();
        assert!(value.get("book_owner_id").is_none());
        assert_eq!(value["renter"], RENTER);
        assert_eq!(value["book"], 5);
        assert_eq!(value["start_date"], "2024-03-01");
    }
}
