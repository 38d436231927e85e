//! Claims domain integration tests

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use core_kernel::{ClaimId, Currency, Money, PolicyId};
use domain_claims::{
    Claim, ClaimDocument, ClaimError, ClaimPayment, ClaimStatus, PaymentMethod, PaymentStatus,
    MAX_DOCUMENT_BYTES,
};

fn usd(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn open_claim(amount: rust_decimal::Decimal) -> Claim {
    let today = Utc::now().date_naive();
    Claim::open(
        PolicyId::new(),
        today - Duration::days(14),
        today,
        usd(amount),
        Some("storm damage to detached garage".to_string()),
    )
    .unwrap()
}

#[test]
fn claim_with_documents_and_payments_round_trip() {
    let mut claim = open_claim(dec!(12_500));

    let photo = ClaimDocument::new(
        claim.id,
        "garage-roof.jpg",
        "image/jpeg",
        2_400_000,
        "claims/2025/garage-roof.jpg",
    )
    .unwrap();
    claim.add_document(photo);

    let estimate = ClaimDocument::new(
        claim.id,
        "contractor-estimate.pdf",
        "application/pdf",
        MAX_DOCUMENT_BYTES,
        "claims/2025/contractor-estimate.pdf",
    )
    .unwrap();
    claim.add_document(estimate);

    assert_eq!(claim.documents.len(), 2);

    claim.update_status(ClaimStatus::InProgress).unwrap();
    claim.update_status(ClaimStatus::Approved).unwrap();

    let mut payment = ClaimPayment::new(
        claim.id,
        "SP-8844213",
        usd(dec!(12_500)),
        PaymentMethod::Ach,
    )
    .unwrap();
    payment.complete().unwrap();
    claim.apply_payment(payment).unwrap();

    assert_eq!(claim.status, ClaimStatus::Closed);
    assert_eq!(claim.paid_amount.amount(), dec!(12_500));
    assert_eq!(claim.payments.len(), 1);
}

#[test]
fn failed_partner_payment_leaves_claim_untouched() {
    let mut claim = open_claim(dec!(2_000));

    let mut payment =
        ClaimPayment::new(claim.id, "SP-REJECTED", usd(dec!(900)), PaymentMethod::Check).unwrap();
    payment.update_status(PaymentStatus::Processing).unwrap();
    payment.update_status(PaymentStatus::Failed).unwrap();

    assert!(matches!(
        claim.apply_payment(payment.clone()),
        Err(ClaimError::PaymentNotCompleted(_))
    ));

    claim.record_payment_attempt(payment);
    assert!(claim.paid_amount.is_zero());
    assert_eq!(claim.status, ClaimStatus::Pending);
}

#[test]
fn document_rules_checked_per_upload() {
    let claim_id = ClaimId::new();

    let oversized = ClaimDocument::new(
        claim_id,
        "dashcam.mov",
        "image/png",
        MAX_DOCUMENT_BYTES + 1,
        "claims/dashcam.mov",
    );
    assert!(oversized.is_err());

    let wrong_type = ClaimDocument::new(
        claim_id,
        "dashcam.mov",
        "video/quicktime",
        5_000_000,
        "claims/dashcam.mov",
    );
    assert!(wrong_type.is_err());
}
