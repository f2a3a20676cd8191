//! Transition legality and actor permissions.
//!
//! Pure functions over the status graph; no storage access. The lifecycle
//! service evaluates these inside its transaction so the decision is made
//! against the committed status, never a stale read.

use crate::domain::{Actor, Purchase, PurchaseAssigned, PurchaseStatus, Role};
use crate::error::{CoreError, Result};

/// User-visible guard messages.
pub mod errmsg {
    pub const NOT_PROCESSED: &str = "Purchase isn't processed yet.";
    pub const NOT_FINISHED: &str = "Purchase isn't finished yet.";
    pub const NOT_DONE: &str = "Purchase isn't done yet.";
    pub const ASSIGNMENT_DRIVEN: &str =
        "status is set by operator assignment and cannot be written directly";
    pub const NOT_DELETABLE: &str = "only draft or rejected purchases can be deleted";
    pub const NOT_EDITABLE: &str = "purchase content is only editable while draft";
}

/// Check that `actor` may move a purchase from `from` to `to`.
///
/// Reviewed and Assigned are never legal as direct writes; they are produced
/// by the assignment engine only.
pub fn check_transition(actor: &Actor, from: PurchaseStatus, to: PurchaseStatus) -> Result<()> {
    use PurchaseStatus::*;

    match to {
        Reviewed | Assigned => Err(CoreError::validation(errmsg::ASSIGNMENT_DRIVEN)),

        Submitted => {
            require_role(actor, Role::Customer)?;
            match from {
                Draft => Ok(()),
                _ => Err(illegal(from, to)),
            }
        }

        // Re-saving a draft keeps it a draft; a submitted purchase may be
        // pulled back for editing.
        Draft => {
            require_role(actor, Role::Customer)?;
            match from {
                Draft | Submitted => Ok(()),
                _ => Err(illegal(from, to)),
            }
        }

        Accept => {
            require_role(actor, Role::Customer)?;
            match from {
                Done => Ok(()),
                _ => Err(CoreError::validation(errmsg::NOT_FINISHED)),
            }
        }

        Done => {
            require_role(actor, Role::Operator)?;
            match from {
                Processed => Ok(()),
                _ => Err(CoreError::validation(errmsg::NOT_PROCESSED)),
            }
        }

        Processed => {
            require_role(actor, Role::Operator)?;
            match from {
                Assigned => Ok(()),
                _ => Err(illegal(from, to)),
            }
        }

        Rejected => {
            require_role(actor, Role::Operator)?;
            match from {
                Submitted | Reviewed => Ok(()),
                _ => Err(illegal(from, to)),
            }
        }
    }
}

/// True when the actor may read this purchase: its owner, or the operator
/// currently assigned to it.
pub fn can_view(
    purchase: &Purchase,
    assignment: Option<&PurchaseAssigned>,
    actor: &Actor,
) -> bool {
    if purchase.customer == actor.id {
        return true;
    }
    if actor.has_role(Role::Operator) {
        if let Some(assignment) = assignment {
            return assignment.operator == Some(actor.id);
        }
    }
    false
}

pub(crate) fn require_role(actor: &Actor, role: Role) -> Result<()> {
    if actor.has_role(role) {
        Ok(())
    } else {
        Err(CoreError::permission(format!(
            "requires the {} role",
            role.as_str()
        )))
    }
}

fn illegal(from: PurchaseStatus, to: PurchaseStatus) -> CoreError {
    CoreError::validation(format!("illegal status transition: {from} -> {to}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn customer() -> Actor {
        Actor::customer(Uuid::new_v4())
    }

    fn operator() -> Actor {
        Actor::operator(Uuid::new_v4())
    }

    mod customer_transitions {
        use super::*;
        use PurchaseStatus::*;

        #[test]
        fn test_submit_from_draft() {
            assert!(check_transition(&customer(), Draft, Submitted).is_ok());
        }

        #[test]
        fn test_pull_back_to_draft() {
            assert!(check_transition(&customer(), Submitted, Draft).is_ok());
        }

        #[test]
        fn test_draft_resave_idempotent() {
            assert!(check_transition(&customer(), Draft, Draft).is_ok());
        }

        #[test]
        fn test_accept_from_done() {
            assert!(check_transition(&customer(), Done, Accept).is_ok());
        }

        #[test]
        fn test_accept_too_early() {
            for from in [Draft, Submitted, Reviewed, Assigned, Processed, Rejected] {
                let err = check_transition(&customer(), from, Accept).unwrap_err();
                assert_eq!(err.to_string(), errmsg::NOT_FINISHED);
            }
        }

        #[test]
        fn test_customer_cannot_mark_done() {
            assert!(matches!(
                check_transition(&customer(), Processed, Done),
                Err(CoreError::PermissionDenied(_))
            ));
        }
    }

    mod operator_transitions {
        use super::*;
        use PurchaseStatus::*;

        #[test]
        fn test_done_from_processed() {
            assert!(check_transition(&operator(), Processed, Done).is_ok());
        }

        #[test]
        fn test_done_too_early() {
            for from in [Draft, Submitted, Reviewed, Assigned, Done, Rejected] {
                let err = check_transition(&operator(), from, Done).unwrap_err();
                assert_eq!(err.to_string(), errmsg::NOT_PROCESSED);
            }
        }

        #[test]
        fn test_processed_from_assigned() {
            assert!(check_transition(&operator(), Assigned, Processed).is_ok());
            assert!(check_transition(&operator(), Submitted, Processed).is_err());
        }

        #[test]
        fn test_reject_during_review() {
            assert!(check_transition(&operator(), Submitted, Rejected).is_ok());
            assert!(check_transition(&operator(), Reviewed, Rejected).is_ok());
            assert!(check_transition(&operator(), Done, Rejected).is_err());
        }

        #[test]
        fn test_operator_cannot_accept() {
            assert!(matches!(
                check_transition(&operator(), Done, Accept),
                Err(CoreError::PermissionDenied(_))
            ));
        }
    }

    mod assignment_driven {
        use super::*;
        use PurchaseStatus::*;

        #[test]
        fn test_reviewed_never_direct() {
            for actor in [customer(), operator()] {
                assert!(check_transition(&actor, Submitted, Reviewed).is_err());
                assert!(check_transition(&actor, Submitted, Assigned).is_err());
            }
        }
    }
}
