//! The single-redemption contract: exactly one of any number of scans of a
//! valid code succeeds, everything else is a deterministic rejection.

mod common;

use sqlx::PgPool;
use uuid::Uuid;

use gatepass_server::services::redemption::{self, RedemptionOutcome};

async fn qr_code(pool: &PgPool, ticket_id: Uuid) -> String {
    sqlx::query_scalar::<_, String>("SELECT qr_code FROM tickets WHERE id = $1")
        .bind(ticket_id)
        .fetch_one(pool)
        .await
        .expect("ticket missing")
}

#[sqlx::test(migrations = "./migrations")]
async fn first_scan_succeeds_and_records_check_in(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let admin = common::create_user(&pool, "admin").await;
    let scanner = common::create_user(&pool, "scanner").await;
    let event = common::create_event(&pool, &admin).await;
    let ticket_type = common::create_ticket_type(&pool, event.id, 30).await;

    let issued = common::issue(&state, &admin, event.id, ticket_type.id)
        .await
        .expect("issuance failed");
    assert_eq!(common::quantity_issued(&pool, ticket_type.id).await, 1);
    assert_eq!(common::ticket_status(&pool, issued.id).await, "active");

    let code = qr_code(&pool, issued.id).await;
    let outcome = redemption::redeem(&pool, &code, &scanner)
        .await
        .expect("redeem errored");

    match outcome {
        RedemptionOutcome::Accepted(ticket) => {
            assert_eq!(ticket.ticket_number, issued.ticket_number);
            assert_eq!(ticket.event_name, "Test Event");
        }
        other => panic!("expected acceptance, got {other:?}"),
    }

    assert_eq!(common::ticket_status(&pool, issued.id).await, "used");
    assert_eq!(common::check_in_count(&pool, issued.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn second_scan_reports_the_winning_scanner(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let admin = common::create_user(&pool, "admin").await;
    let first_scanner = common::create_user(&pool, "scanner").await;
    let second_scanner = common::create_user(&pool, "scanner").await;
    let event = common::create_event(&pool, &admin).await;
    let ticket_type = common::create_ticket_type(&pool, event.id, 30).await;

    let issued = common::issue(&state, &admin, event.id, ticket_type.id)
        .await
        .expect("issuance failed");
    let code = qr_code(&pool, issued.id).await;

    let first = redemption::redeem(&pool, &code, &first_scanner)
        .await
        .expect("first redeem errored");
    let winning_time = match first {
        RedemptionOutcome::Accepted(ticket) => ticket.check_in_time,
        other => panic!("expected acceptance, got {other:?}"),
    };

    let second = redemption::redeem(&pool, &code, &second_scanner)
        .await
        .expect("second redeem errored");
    match second {
        RedemptionOutcome::AlreadyUsed {
            previous_check_in,
            scanned_by,
            ..
        } => {
            assert_eq!(previous_check_in, Some(winning_time));
            assert_eq!(scanned_by.as_deref(), Some(first_scanner.full_name.as_str()));
        }
        other => panic!("expected already-used rejection, got {other:?}"),
    }

    // the losing scan must not have appended a second check-in
    assert_eq!(common::check_in_count(&pool, issued.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_scans_admit_exactly_once(pool: PgPool) {
    const SCANNERS: usize = 8;

    let state = common::test_state(pool.clone());
    let admin = common::create_user(&pool, "admin").await;
    let event = common::create_event(&pool, &admin).await;
    let ticket_type = common::create_ticket_type(&pool, event.id, 30).await;

    let issued = common::issue(&state, &admin, event.id, ticket_type.id)
        .await
        .expect("issuance failed");
    let code = qr_code(&pool, issued.id).await;

    let mut handles = Vec::new();
    for _ in 0..SCANNERS {
        let pool = pool.clone();
        let code = code.clone();
        let scanner = common::create_user(&pool, "scanner").await;
        handles.push(tokio::spawn(async move {
            redemption::redeem(&pool, &code, &scanner).await
        }));
    }

    let mut accepted = 0usize;
    let mut rejected = 0usize;
    for handle in handles {
        match handle.await.expect("task panicked").expect("redeem errored") {
            RedemptionOutcome::Accepted(_) => accepted += 1,
            RedemptionOutcome::AlreadyUsed { .. } => rejected += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    assert_eq!(accepted, 1, "exactly one concurrent scan may win");
    assert_eq!(rejected, SCANNERS - 1);
    assert_eq!(common::check_in_count(&pool, issued.id).await, 1);
    assert_eq!(common::ticket_status(&pool, issued.id).await, "used");
}

#[sqlx::test(migrations = "./migrations")]
async fn cancelled_ticket_never_admits_and_is_never_mutated(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let admin = common::create_user(&pool, "admin").await;
    let scanner = common::create_user(&pool, "scanner").await;
    let event = common::create_event(&pool, &admin).await;
    let ticket_type = common::create_ticket_type(&pool, event.id, 30).await;

    let issued = common::issue(&state, &admin, event.id, ticket_type.id)
        .await
        .expect("issuance failed");
    sqlx::query("UPDATE tickets SET status = 'cancelled' WHERE id = $1")
        .bind(issued.id)
        .execute(&pool)
        .await
        .expect("cancel failed");

    let code = qr_code(&pool, issued.id).await;
    let outcome = redemption::redeem(&pool, &code, &scanner)
        .await
        .expect("redeem errored");

    assert!(matches!(outcome, RedemptionOutcome::Cancelled { .. }));
    assert_eq!(common::ticket_status(&pool, issued.id).await, "cancelled");
    assert_eq!(common::check_in_count(&pool, issued.id).await, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_code_is_not_found_with_no_side_effects(pool: PgPool) {
    let scanner = common::create_user(&pool, "scanner").await;

    let outcome = redemption::redeem(&pool, "TKT-NOPE|bogus|ghost@example.com", &scanner)
        .await
        .expect("redeem errored");

    assert!(matches!(outcome, RedemptionOutcome::NotFound));

    let check_ins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins")
        .fetch_one(&pool)
        .await
        .expect("count failed");
    assert_eq!(check_ins, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn scan_history_and_stats_track_the_scanner(pool: PgPool) {
    let state = common::test_state(pool.clone());
    let admin = common::create_user(&pool, "admin").await;
    let scanner = common::create_user(&pool, "scanner").await;
    let event = common::create_event(&pool, &admin).await;
    let ticket_type = common::create_ticket_type(&pool, event.id, 30).await;

    for _ in 0..3 {
        let issued = common::issue(&state, &admin, event.id, ticket_type.id)
            .await
            .expect("issuance failed");
        let code = qr_code(&pool, issued.id).await;
        let outcome = redemption::redeem(&pool, &code, &scanner)
            .await
            .expect("redeem errored");
        assert!(matches!(outcome, RedemptionOutcome::Accepted(_)));
    }

    let history = redemption::scan_history(&pool, scanner.id)
        .await
        .expect("history failed");
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|record| record.event_name == "Test Event"));

    let stats = redemption::scanner_stats(&pool, scanner.id)
        .await
        .expect("stats failed");
    assert_eq!(stats.total_scans, 3);
    assert_eq!(stats.today_scans, 3);
}
