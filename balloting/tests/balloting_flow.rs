//! End-to-end balloting flows against the in-memory environment:
//! create → open → vote → close, NSB responses → acceptance decision,
//! FDARS recommend → verify, and the concurrent write paths.

use arso_balloting::{BallotingError, CastVote, ErrorKind, GovernanceEngine};
use arso_nullables::{NullAuditTrail, NullClock, NullEnvironment};
use arso_types::{
    AcceptanceApproval, AcceptanceCriteria, AcceptanceDecision, AuditAction, BallotingDraft,
    BallotingId, BallotingPeriod, BallotingStatus, Disposition, GovernanceRules, MeetingId,
    MemberId, NewNsbResponse, NsbResponseType, ProjectId, QuorumRule, QuorumSubject, RosterKey,
    Timestamp, VoteChoice,
};
use proptest::prelude::*;
use std::sync::Arc;
use std::thread;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    env: Arc<NullEnvironment>,
    audit: Arc<NullAuditTrail>,
    engine: Arc<GovernanceEngine<NullEnvironment>>,
    project: ProjectId,
    secretary: MemberId,
}

fn date(year: i32, month: u32, day: u32) -> Timestamp {
    Timestamp::from_ymd(year, month, day).expect("valid date")
}

fn rules() -> GovernanceRules {
    GovernanceRules {
        acceptance: Some(AcceptanceCriteria {
            approval_threshold_bps: 6_000,
            max_disapprovals: 2,
        }),
        quorum: Some(QuorumRule { required_bps: 5_000 }),
    }
}

fn harness() -> Harness {
    let env = Arc::new(NullEnvironment::new());
    let audit = Arc::new(NullAuditTrail::new());
    let clock = Arc::new(NullClock::at(date(2024, 1, 2)));
    let engine = GovernanceEngine::new(env.clone(), clock, audit.clone(), rules())
        .expect("valid rules");
    Harness {
        env,
        audit,
        engine: Arc::new(engine),
        project: ProjectId::new("prj-arso-042"),
        secretary: MemberId::new("tc-secretary"),
    }
}

fn member(i: usize) -> MemberId {
    MemberId::new(format!("nsb-{i}"))
}

impl Harness {
    fn roster(&self, n: usize) {
        self.env.set_roster(
            RosterKey::Project(self.project.clone()),
            (0..n).map(member),
        );
    }

    fn open_balloting(&self) -> BallotingId {
        let balloting = self
            .engine
            .sessions
            .create(
                &self.secretary,
                BallotingDraft {
                    project_id: self.project.clone(),
                    period: BallotingPeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
                },
            )
            .expect("create");
        self.engine
            .sessions
            .open(&self.secretary, balloting.id)
            .expect("open");
        balloting.id
    }

    fn cast(&self, balloting: BallotingId, voter: &MemberId, choice: VoteChoice) -> CastVote {
        CastVote {
            balloting_id: balloting,
            project_id: self.project.clone(),
            member_id: voter.clone(),
            choice,
            comment: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Balloting rounds
// ---------------------------------------------------------------------------

#[test]
fn full_round_from_draft_to_accepted_close() {
    let h = harness();
    h.roster(10);

    let draft = h
        .engine
        .sessions
        .create(
            &h.secretary,
            BallotingDraft {
                project_id: h.project.clone(),
                period: BallotingPeriod::new(date(2024, 1, 1), date(2024, 1, 10)),
            },
        )
        .unwrap();
    assert_eq!(draft.status, BallotingStatus::Draft);
    h.engine.sessions.open(&h.secretary, draft.id).unwrap();

    for i in 0..6 {
        let voter = member(i);
        h.engine
            .ledger
            .cast_vote(&voter, h.cast(draft.id, &voter, VoteChoice::Approve))
            .unwrap();
    }
    let voter = member(6);
    h.engine
        .ledger
        .cast_vote(&voter, h.cast(draft.id, &voter, VoteChoice::Abstain))
        .unwrap();

    assert!(h
        .engine
        .quorum
        .check_quorum(QuorumSubject::Balloting(draft.id))
        .unwrap());

    let closed = h.engine.sessions.close(&h.secretary, draft.id).unwrap();
    assert_eq!(closed.outcome.disposition, Disposition::Accept);
    assert_eq!(closed.outcome.tally.approve, 6);
    assert_eq!(closed.outcome.tally.abstain, 1);
    assert_eq!(closed.outcome.tally, h.engine.ledger.tally_votes(draft.id).unwrap());

    // Votes are frozen once the round is over.
    let late = member(7);
    let err = h
        .engine
        .ledger
        .cast_vote(&late, h.cast(draft.id, &late, VoteChoice::Approve))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);
}

#[test]
fn invalid_period_is_a_validation_error() {
    let h = harness();
    let err = h
        .engine
        .sessions
        .create(
            &h.secretary,
            BallotingDraft {
                project_id: h.project.clone(),
                period: BallotingPeriod::new(date(2024, 1, 1), date(2023, 12, 31)),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let events = h.audit.events_for(AuditAction::CreateBalloting);
    assert_eq!(events.len(), 1);
    assert!(!events[0].outcome.is_success());
}

#[test]
fn meeting_quorum_follows_attendance() {
    let h = harness();
    let meeting = MeetingId::new(1);
    h.env
        .set_roster(RosterKey::Meeting(meeting), (0..10).map(member));
    for i in 0..4 {
        h.engine
            .quorum
            .record_attendance(&h.secretary, meeting, &member(i))
            .unwrap();
    }
    assert!(!h.engine.quorum.check_quorum(QuorumSubject::Meeting(meeting)).unwrap());
    h.engine
        .quorum
        .record_attendance(&h.secretary, meeting, &member(4))
        .unwrap();
    assert!(h.engine.quorum.check_quorum(QuorumSubject::Meeting(meeting)).unwrap());
}

// ---------------------------------------------------------------------------
// Acceptance and FDARS
// ---------------------------------------------------------------------------

#[test]
fn nsb_responses_drive_acceptance() {
    let h = harness();
    h.roster(10);
    let acceptance = &h.engine.acceptance;
    let kinds = [
        NsbResponseType::ApproveNoComment,
        NsbResponseType::ApproveWithComment,
    ];
    for i in 0..7 {
        acceptance
            .record_nsb_response(
                &member(i),
                NewNsbResponse {
                    project_id: h.project.clone(),
                    responder_id: member(i),
                    response_type: kinds[i % 2],
                    comments: "editorial remarks attached".into(),
                },
            )
            .unwrap();
    }
    acceptance
        .record_nsb_response(
            &member(7),
            NewNsbResponse {
                project_id: h.project.clone(),
                responder_id: member(7),
                response_type: NsbResponseType::Disapprove,
                comments: "conflicts with national standard".into(),
            },
        )
        .unwrap();

    let counts = acceptance.count_responses_by_type(&h.project).unwrap();
    assert_eq!(counts.values().sum::<u64>(), 8);

    acceptance.calculate_stats(&h.secretary, &h.project).unwrap();
    let decided = acceptance
        .set_acceptance_approval(
            &h.secretary,
            AcceptanceApproval {
                project_id: h.project.clone(),
                tc_secretary_id: Some(h.secretary.clone()),
            },
        )
        .unwrap();
    assert_eq!(decided.decision, AcceptanceDecision::Accepted);
}

#[test]
fn fdars_recommendation_is_verified_once() {
    let h = harness();
    let (a, b) = (MemberId::new("user-a"), MemberId::new("user-b"));
    h.engine.sessions.recommend_fdars(&a, &h.project, true).unwrap();
    let verified = h
        .engine
        .sessions
        .verify_fdars_recommendation(&b, &h.project)
        .unwrap();
    assert!(verified.verified);
    let err = h
        .engine
        .sessions
        .verify_fdars_recommendation(&b, &h.project)
        .unwrap_err();
    assert!(matches!(err, BallotingError::AlreadyVerified(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn audit_failure_does_not_roll_back() {
    let h = harness();
    let balloting = h.open_balloting();
    h.audit.set_failing(true);
    let voter = member(0);
    h.engine
        .ledger
        .cast_vote(&voter, h.cast(balloting, &voter, VoteChoice::Approve))
        .unwrap();
    assert_eq!(h.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 1);
}

#[test]
fn storage_failure_surfaces_and_leaves_no_vote() {
    let h = harness();
    let balloting = h.open_balloting();
    h.env.fail_next_commit();
    let voter = member(0);
    let err = h
        .engine
        .ledger
        .cast_vote(&voter, h.cast(balloting, &voter, VoteChoice::Approve))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(h.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_duplicate_votes_admit_exactly_one() {
    let h = harness();
    let balloting = h.open_balloting();
    let voter = member(0);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let engine = Arc::clone(&h.engine);
            let request = h.cast(
                balloting,
                &voter,
                if i % 2 == 0 {
                    VoteChoice::Approve
                } else {
                    VoteChoice::Disapprove
                },
            );
            let voter = voter.clone();
            thread::spawn(move || engine.ledger.cast_vote(&voter, request))
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("voter thread"))
        .collect();
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, BallotingError::DuplicateVote { .. })));
    assert_eq!(h.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 1);
}

#[test]
fn close_tally_counts_exactly_the_votes_committed_before_it() {
    let h = harness();
    h.roster(32);
    let balloting = h.open_balloting();

    let voters: Vec<_> = (0..32)
        .map(|i| {
            let engine = Arc::clone(&h.engine);
            let voter = member(i);
            let request = h.cast(balloting, &voter, VoteChoice::Approve);
            thread::spawn(move || engine.ledger.cast_vote(&voter, request))
        })
        .collect();
    let closer = {
        let engine = Arc::clone(&h.engine);
        let secretary = h.secretary.clone();
        thread::spawn(move || engine.sessions.close(&secretary, balloting))
    };

    let results: Vec<_> = voters
        .into_iter()
        .map(|v| v.join().expect("voter thread"))
        .collect();
    let closed = closer.join().expect("closer thread");

    let accepted = results.iter().filter(|r| r.is_ok()).count() as u32;
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, BallotingError::BallotingClosed { .. })));
    match closed {
        Ok(closed) => {
            assert_eq!(closed.outcome.tally.total, accepted);
            assert_eq!(closed.balloting.status, BallotingStatus::Closed);
        }
        Err(e) => panic!("close failed: {e}"),
    }
    assert_eq!(
        h.engine.ledger.count_votes_by_balloting(balloting).unwrap(),
        u64::from(accepted)
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn choice_strategy() -> impl Strategy<Value = VoteChoice> {
    prop_oneof![
        Just(VoteChoice::Approve),
        Just(VoteChoice::Disapprove),
        Just(VoteChoice::Abstain),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn tally_matches_the_recorded_votes(
        choices in prop::collection::vec(choice_strategy(), 0..40)
    ) {
        let h = harness();
        let balloting = h.open_balloting();
        for (i, choice) in choices.iter().enumerate() {
            let voter = member(i);
            h.engine
                .ledger
                .cast_vote(&voter, h.cast(balloting, &voter, *choice))
                .unwrap();
        }

        let tally = h.engine.ledger.tally_votes(balloting).unwrap();
        let count = |c: VoteChoice| choices.iter().filter(|&&x| x == c).count() as u32;
        prop_assert_eq!(tally.approve, count(VoteChoice::Approve));
        prop_assert_eq!(tally.disapprove, count(VoteChoice::Disapprove));
        prop_assert_eq!(tally.abstain, count(VoteChoice::Abstain));
        prop_assert_eq!(tally.approve + tally.disapprove + tally.abstain, tally.total);
        prop_assert_eq!(tally.total as usize, choices.len());
    }
}
