//! Lifecycle - Status machines for orders, ad requests, calls and verifications
//!
//! These functions never touch the database. Services ask them which status a
//! record moves to, then persist the answer with a compare-and-set update so a
//! concurrent transition of the same record is detected.

use super::enums::{AdStatus, CallStatus, OrderStatus, PaymentStatus, VerificationStatus};
use std::fmt;

/// Who is acting on an order or ad request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Seeker,
    Provider,
    Admin,
}

/// Who is acting on a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallParty {
    Caller,
    Callee,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// the party may never perform the action
    NotPermitted { action: &'static str },
    /// the action is not legal from the current status
    InvalidState { action: &'static str, current: String },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::NotPermitted { action } => {
                write!(f, "you are not allowed to {}", action)
            }
            TransitionError::InvalidState { action, current } => {
                write!(f, "cannot {} while status is {}", action, current)
            }
        }
    }
}

fn invalid<S: fmt::Debug>(action: &'static str, current: S) -> TransitionError {
    TransitionError::InvalidState {
        action,
        current: format!("{:?}", current),
    }
}

// ************************* ORDERS ************************* //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Accept,
    Decline,
    Cancel,
    SubmitPayment,
    ApprovePayment,
    RejectPayment,
    Start,
    Complete,
    Dispute,
    ResolveForProvider,
    ResolveForSeeker,
    GrantGracePeriod,
}

impl OrderAction {
    pub fn name(self) -> &'static str {
        match self {
            OrderAction::Accept => "accept the order",
            OrderAction::Decline => "decline the order",
            OrderAction::Cancel => "cancel the order",
            OrderAction::SubmitPayment => "submit a payment",
            OrderAction::ApprovePayment => "approve the payment",
            OrderAction::RejectPayment => "reject the payment",
            OrderAction::Start => "start the work",
            OrderAction::Complete => "complete the order",
            OrderAction::Dispute => "open a dispute",
            OrderAction::ResolveForProvider | OrderAction::ResolveForSeeker => {
                "resolve the dispute"
            }
            OrderAction::GrantGracePeriod => "grant a grace period",
        }
    }

    pub fn permitted(self, party: Party) -> bool {
        match self {
            OrderAction::Accept | OrderAction::Decline | OrderAction::Start => {
                party == Party::Provider
            }
            OrderAction::Cancel | OrderAction::SubmitPayment | OrderAction::Complete => {
                party == Party::Seeker
            }
            OrderAction::Dispute => matches!(party, Party::Seeker | Party::Provider),
            OrderAction::ApprovePayment
            | OrderAction::RejectPayment
            | OrderAction::ResolveForProvider
            | OrderAction::ResolveForSeeker
            | OrderAction::GrantGracePeriod => party == Party::Admin,
        }
    }
}

/// Status an order moves to when `party` performs `action`
pub fn order_transition(
    status: OrderStatus,
    payment: PaymentStatus,
    action: OrderAction,
    party: Party,
) -> Result<OrderStatus, TransitionError> {
    if !action.permitted(party) {
        return Err(TransitionError::NotPermitted {
            action: action.name(),
        });
    }

    use OrderAction as A;
    use OrderStatus as S;
    let next = match (action, status) {
        (A::Accept, S::PendingApproval) => S::PendingPayment,
        (A::Decline, S::PendingApproval) => S::Declined,
        (A::Cancel, S::PendingApproval | S::PendingPayment) => S::Cancelled,
        (A::SubmitPayment, S::PendingPayment) if payment != PaymentStatus::Submitted => {
            S::PendingPayment
        }
        (A::ApprovePayment, S::PendingPayment) if payment == PaymentStatus::Submitted => S::Paid,
        (A::RejectPayment, S::PendingPayment) if payment == PaymentStatus::Submitted => {
            S::PendingPayment
        }
        (A::Start, S::Paid) => S::InProgress,
        (A::Complete, S::Paid | S::InProgress) => S::Completed,
        (A::Dispute, S::Paid | S::InProgress) => S::Disputed,
        (A::ResolveForProvider, S::Disputed) => S::Completed,
        (A::ResolveForSeeker, S::Disputed) => S::Refunded,
        (A::GrantGracePeriod, S::Disputed) => S::InProgress,
        (action, status) => return Err(invalid(action.name(), status)),
    };
    Ok(next)
}

// ************************* ADS ************************* //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdAction {
    Approve,
    Reject,
    SubmitPayment,
    ConfirmPayment,
    RejectPayment,
}

impl AdAction {
    pub fn name(self) -> &'static str {
        match self {
            AdAction::Approve => "approve the ad",
            AdAction::Reject => "reject the ad",
            AdAction::SubmitPayment => "submit the ad payment",
            AdAction::ConfirmPayment => "confirm the ad payment",
            AdAction::RejectPayment => "reject the ad payment",
        }
    }

    /// `Party::Provider` stands for the provider owning the ad
    pub fn permitted(self, party: Party) -> bool {
        match self {
            AdAction::SubmitPayment => party == Party::Provider,
            _ => party == Party::Admin,
        }
    }
}

pub fn ad_transition(
    status: AdStatus,
    action: AdAction,
    party: Party,
) -> Result<AdStatus, TransitionError> {
    if !action.permitted(party) {
        return Err(TransitionError::NotPermitted {
            action: action.name(),
        });
    }

    let next = match (action, status) {
        (AdAction::Approve, AdStatus::PendingApproval) => AdStatus::AwaitingPayment,
        (AdAction::Reject, AdStatus::PendingApproval) => AdStatus::Rejected,
        (AdAction::SubmitPayment, AdStatus::AwaitingPayment) => AdStatus::PaymentSubmitted,
        (AdAction::ConfirmPayment, AdStatus::PaymentSubmitted) => AdStatus::Active,
        (AdAction::RejectPayment, AdStatus::PaymentSubmitted) => AdStatus::AwaitingPayment,
        (action, status) => return Err(invalid(action.name(), status)),
    };
    Ok(next)
}

// ************************* CALLS ************************* //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Accept,
    Decline,
    End,
}

impl CallAction {
    pub fn name(self) -> &'static str {
        match self {
            CallAction::Accept => "accept the call",
            CallAction::Decline => "decline the call",
            CallAction::End => "end the call",
        }
    }
}

pub fn call_transition(
    status: CallStatus,
    action: CallAction,
    party: CallParty,
) -> Result<CallStatus, TransitionError> {
    if matches!(action, CallAction::Accept | CallAction::Decline) && party != CallParty::Callee {
        return Err(TransitionError::NotPermitted {
            action: action.name(),
        });
    }

    let next = match (action, status) {
        (CallAction::Accept, CallStatus::Ringing) => CallStatus::Ongoing,
        (CallAction::Decline, CallStatus::Ringing) => CallStatus::Declined,
        (CallAction::End, CallStatus::Ringing) => CallStatus::Missed,
        (CallAction::End, CallStatus::Ongoing) => CallStatus::Ended,
        (action, status) => return Err(invalid(action.name(), status)),
    };
    Ok(next)
}

// ************************* VERIFICATION ************************* //

impl VerificationStatus {
    /// A provider may (re)submit documents unless already pending or verified
    pub fn can_submit(self) -> bool {
        matches!(
            self,
            VerificationStatus::Unverified | VerificationStatus::Rejected
        )
    }
}

/// Admin decision on a pending verification
pub fn verification_review(
    status: VerificationStatus,
    approve: bool,
) -> Result<VerificationStatus, TransitionError> {
    let action = if approve {
        "approve the verification"
    } else {
        "reject the verification"
    };
    match status {
        VerificationStatus::Pending if approve => Ok(VerificationStatus::Verified),
        VerificationStatus::Pending => Ok(VerificationStatus::Rejected),
        other => Err(invalid(action, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ORDER_ACTIONS: [OrderAction; 12] = [
        OrderAction::Accept,
        OrderAction::Decline,
        OrderAction::Cancel,
        OrderAction::SubmitPayment,
        OrderAction::ApprovePayment,
        OrderAction::RejectPayment,
        OrderAction::Start,
        OrderAction::Complete,
        OrderAction::Dispute,
        OrderAction::ResolveForProvider,
        OrderAction::ResolveForSeeker,
        OrderAction::GrantGracePeriod,
    ];

    fn any_permitted_party(action: OrderAction) -> Party {
        [Party::Seeker, Party::Provider, Party::Admin]
            .into_iter()
            .find(|p| action.permitted(*p))
            .unwrap()
    }

    #[test]
    fn test_happy_path() {
        let s = OrderStatus::PendingApproval;
        let s = order_transition(s, PaymentStatus::Unpaid, OrderAction::Accept, Party::Provider)
            .unwrap();
        assert_eq!(s, OrderStatus::PendingPayment);
        let s = order_transition(
            s,
            PaymentStatus::Unpaid,
            OrderAction::SubmitPayment,
            Party::Seeker,
        )
        .unwrap();
        assert_eq!(s, OrderStatus::PendingPayment);
        let s = order_transition(
            s,
            PaymentStatus::Submitted,
            OrderAction::ApprovePayment,
            Party::Admin,
        )
        .unwrap();
        assert_eq!(s, OrderStatus::Paid);
        let s = order_transition(s, PaymentStatus::Verified, OrderAction::Start, Party::Provider)
            .unwrap();
        assert_eq!(s, OrderStatus::InProgress);
        let s = order_transition(
            s,
            PaymentStatus::Verified,
            OrderAction::Complete,
            Party::Seeker,
        )
        .unwrap();
        assert_eq!(s, OrderStatus::Completed);
    }

    #[test]
    fn test_terminal_statuses_accept_nothing() {
        for status in OrderStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for action in ALL_ORDER_ACTIONS {
                let party = any_permitted_party(action);
                let result = order_transition(status, PaymentStatus::Verified, action, party);
                assert!(
                    matches!(result, Err(TransitionError::InvalidState { .. })),
                    "{:?} should not leave {:?}",
                    action,
                    status
                );
            }
        }
    }

    #[test]
    fn test_wrong_party_is_not_permitted() {
        let result = order_transition(
            OrderStatus::PendingApproval,
            PaymentStatus::Unpaid,
            OrderAction::Accept,
            Party::Seeker,
        );
        assert_eq!(
            result,
            Err(TransitionError::NotPermitted {
                action: "accept the order"
            })
        );

        let result = order_transition(
            OrderStatus::Disputed,
            PaymentStatus::Verified,
            OrderAction::ResolveForSeeker,
            Party::Seeker,
        );
        assert!(matches!(result, Err(TransitionError::NotPermitted { .. })));
    }

    #[test]
    fn test_payment_review_requires_submission() {
        let result = order_transition(
            OrderStatus::PendingPayment,
            PaymentStatus::Unpaid,
            OrderAction::ApprovePayment,
            Party::Admin,
        );
        assert!(matches!(result, Err(TransitionError::InvalidState { .. })));

        // a rejected receipt can be replaced
        let result = order_transition(
            OrderStatus::PendingPayment,
            PaymentStatus::Rejected,
            OrderAction::SubmitPayment,
            Party::Seeker,
        );
        assert_eq!(result, Ok(OrderStatus::PendingPayment));

        let result = order_transition(
            OrderStatus::PendingPayment,
            PaymentStatus::Submitted,
            OrderAction::SubmitPayment,
            Party::Seeker,
        );
        assert!(matches!(result, Err(TransitionError::InvalidState { .. })));
    }

    #[test]
    fn test_dispute_outcomes() {
        for party in [Party::Seeker, Party::Provider] {
            assert_eq!(
                order_transition(
                    OrderStatus::InProgress,
                    PaymentStatus::Verified,
                    OrderAction::Dispute,
                    party
                ),
                Ok(OrderStatus::Disputed)
            );
        }
        let resolve = |action| {
            order_transition(
                OrderStatus::Disputed,
                PaymentStatus::Verified,
                action,
                Party::Admin,
            )
        };
        assert_eq!(resolve(OrderAction::ResolveForProvider), Ok(OrderStatus::Completed));
        assert_eq!(resolve(OrderAction::ResolveForSeeker), Ok(OrderStatus::Refunded));
        assert_eq!(resolve(OrderAction::GrantGracePeriod), Ok(OrderStatus::InProgress));
    }

    #[test]
    fn test_cannot_dispute_before_payment() {
        let result = order_transition(
            OrderStatus::PendingPayment,
            PaymentStatus::Unpaid,
            OrderAction::Dispute,
            Party::Seeker,
        );
        assert!(matches!(result, Err(TransitionError::InvalidState { .. })));
    }

    #[test]
    fn test_ad_workflow() {
        let s = ad_transition(AdStatus::PendingApproval, AdAction::Approve, Party::Admin).unwrap();
        assert_eq!(s, AdStatus::AwaitingPayment);
        let s = ad_transition(s, AdAction::SubmitPayment, Party::Provider).unwrap();
        assert_eq!(s, AdStatus::PaymentSubmitted);
        assert_eq!(
            ad_transition(s, AdAction::RejectPayment, Party::Admin),
            Ok(AdStatus::AwaitingPayment)
        );
        assert_eq!(
            ad_transition(s, AdAction::ConfirmPayment, Party::Admin),
            Ok(AdStatus::Active)
        );
        assert!(ad_transition(s, AdAction::ConfirmPayment, Party::Provider).is_err());
        assert!(ad_transition(AdStatus::Rejected, AdAction::Approve, Party::Admin).is_err());
    }

    #[test]
    fn test_call_transitions() {
        assert_eq!(
            call_transition(CallStatus::Ringing, CallAction::Accept, CallParty::Callee),
            Ok(CallStatus::Ongoing)
        );
        assert!(matches!(
            call_transition(CallStatus::Ringing, CallAction::Accept, CallParty::Caller),
            Err(TransitionError::NotPermitted { .. })
        ));
        assert_eq!(
            call_transition(CallStatus::Ringing, CallAction::End, CallParty::Caller),
            Ok(CallStatus::Missed)
        );
        assert_eq!(
            call_transition(CallStatus::Ongoing, CallAction::End, CallParty::Callee),
            Ok(CallStatus::Ended)
        );
        assert!(call_transition(CallStatus::Ended, CallAction::End, CallParty::Caller).is_err());
    }

    #[test]
    fn test_verification_review() {
        assert_eq!(
            verification_review(VerificationStatus::Pending, true),
            Ok(VerificationStatus::Verified)
        );
        assert_eq!(
            verification_review(VerificationStatus::Pending, false),
            Ok(VerificationStatus::Rejected)
        );
        assert!(verification_review(VerificationStatus::Verified, false).is_err());
        assert!(VerificationStatus::Rejected.can_submit());
        assert!(!VerificationStatus::Pending.can_submit());
    }
}
