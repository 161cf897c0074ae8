//! Nullable store: thread-safe in-memory environment for testing.
//!
//! A write transaction holds the environment lock for its whole lifetime,
//! so write transactions are fully serialized. Writes are staged on a copy
//! of the tables and only become visible on `commit`; dropping the
//! transaction discards them. Read transactions take a snapshot.

use arso_store::{
    AcceptanceStore, AcceptanceStoreMut, BallotingStore, BallotingStoreMut, Environment,
    FdarsStore, FdarsStoreMut, NsbResponseStore, NsbResponseStoreMut, ReadTxn, RosterStore,
    RosterStoreMut, StoreError, VoteStore, VoteStoreMut, WriteTxn,
};
use arso_types::{
    Acceptance, Balloting, BallotingId, FdarsRecommendation, MeetingId, MemberId, NsbResponse,
    NsbResponseId, ProjectId, RosterKey, Vote, VoteId,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Clone, Default)]
struct Tables {
    ballotings: BTreeMap<BallotingId, Balloting>,
    votes: BTreeMap<VoteId, Vote>,
    /// Unique index: (balloting, member) → vote.
    vote_index: HashMap<(BallotingId, MemberId), VoteId>,
    responses: BTreeMap<NsbResponseId, NsbResponse>,
    /// Unique index: (project, responder) → response.
    response_index: HashMap<(ProjectId, MemberId), NsbResponseId>,
    /// Primary key doubles as the (project, version) unique index.
    acceptances: BTreeMap<(ProjectId, u32), Acceptance>,
    fdars: HashMap<ProjectId, FdarsRecommendation>,
    rosters: HashMap<RosterKey, BTreeSet<MemberId>>,
    attendance: HashMap<MeetingId, BTreeSet<MemberId>>,
}

/// An in-memory storage environment.
pub struct NullEnvironment {
    tables: Mutex<Tables>,
    next_id: AtomicU64,
    fail_next_commit: AtomicBool,
}

impl NullEnvironment {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            next_id: AtomicU64::new(1),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Seed an eligibility roster.
    pub fn set_roster<I, M>(&self, key: RosterKey, members: I)
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        self.tables
            .lock()
            .unwrap()
            .rosters
            .insert(key, members.into_iter().map(Into::into).collect());
    }

    /// Make the next commit fail with a backend error, as if the database
    /// had gone away mid-transaction.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("null environment lock poisoned".into()))
    }
}

impl Default for NullEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for NullEnvironment {
    type Read<'a> = NullReadTxn where Self: 'a;
    type Write<'a> = NullWriteTxn<'a> where Self: 'a;

    fn read_txn(&self) -> Result<NullReadTxn, StoreError> {
        let tables = self.lock()?.clone();
        Ok(NullReadTxn { tables })
    }

    fn write_txn(&self) -> Result<NullWriteTxn<'_>, StoreError> {
        let guard = self.lock()?;
        let staged = guard.clone();
        Ok(NullWriteTxn {
            guard,
            staged,
            env: self,
        })
    }
}

/// Snapshot read transaction.
pub struct NullReadTxn {
    tables: Tables,
}

impl NullReadTxn {
    fn tables(&self) -> &Tables {
        &self.tables
    }
}

/// Exclusive write transaction.
pub struct NullWriteTxn<'a> {
    guard: MutexGuard<'a, Tables>,
    staged: Tables,
    env: &'a NullEnvironment,
}

impl NullWriteTxn<'_> {
    fn tables(&self) -> &Tables {
        &self.staged
    }
}

macro_rules! impl_read_stores {
    ($txn:ty) => {
        impl BallotingStore for $txn {
            fn get_balloting(&self, id: BallotingId) -> Result<Option<Balloting>, StoreError> {
                Ok(self.tables().ballotings.get(&id).cloned())
            }

            fn ballotings_for_project(
                &self,
                project: &ProjectId,
            ) -> Result<Vec<Balloting>, StoreError> {
                Ok(self
                    .tables()
                    .ballotings
                    .values()
                    .filter(|b| &b.project_id == project)
                    .cloned()
                    .collect())
            }

            fn iter_ballotings(&self) -> Result<Vec<Balloting>, StoreError> {
                Ok(self.tables().ballotings.values().cloned().collect())
            }
        }

        impl VoteStore for $txn {
            fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError> {
                Ok(self.tables().votes.get(&id).cloned())
            }

            fn votes_for_balloting(&self, balloting: BallotingId) -> Result<Vec<Vote>, StoreError> {
                Ok(self
                    .tables()
                    .votes
                    .values()
                    .filter(|v| v.balloting_id == balloting)
                    .cloned()
                    .collect())
            }

            fn votes_by_member(&self, member: &MemberId) -> Result<Vec<Vote>, StoreError> {
                Ok(self
                    .tables()
                    .votes
                    .values()
                    .filter(|v| &v.member_id == member)
                    .cloned()
                    .collect())
            }

            fn votes_for_project(&self, project: &ProjectId) -> Result<Vec<Vote>, StoreError> {
                Ok(self
                    .tables()
                    .votes
                    .values()
                    .filter(|v| &v.project_id == project)
                    .cloned()
                    .collect())
            }

            fn count_votes(&self, balloting: BallotingId) -> Result<u64, StoreError> {
                Ok(self
                    .tables()
                    .votes
                    .values()
                    .filter(|v| v.balloting_id == balloting)
                    .count() as u64)
            }
        }

        impl NsbResponseStore for $txn {
            fn responses_for_project(
                &self,
                project: &ProjectId,
            ) -> Result<Vec<NsbResponse>, StoreError> {
                Ok(self
                    .tables()
                    .responses
                    .values()
                    .filter(|r| &r.project_id == project)
                    .cloned()
                    .collect())
            }
        }

        impl AcceptanceStore for $txn {
            fn latest_acceptance(
                &self,
                project: &ProjectId,
            ) -> Result<Option<Acceptance>, StoreError> {
                Ok(self
                    .tables()
                    .acceptances
                    .range((project.clone(), 0)..=(project.clone(), u32::MAX))
                    .next_back()
                    .map(|(_, a)| a.clone()))
            }

            fn acceptance_history(
                &self,
                project: &ProjectId,
            ) -> Result<Vec<Acceptance>, StoreError> {
                Ok(self
                    .tables()
                    .acceptances
                    .range((project.clone(), 0)..=(project.clone(), u32::MAX))
                    .map(|(_, a)| a.clone())
                    .collect())
            }
        }

        impl FdarsStore for $txn {
            fn get_fdars(
                &self,
                project: &ProjectId,
            ) -> Result<Option<FdarsRecommendation>, StoreError> {
                Ok(self.tables().fdars.get(project).cloned())
            }
        }

        impl RosterStore for $txn {
            fn eligible_members(&self, key: &RosterKey) -> Result<BTreeSet<MemberId>, StoreError> {
                Ok(self.tables().rosters.get(key).cloned().unwrap_or_default())
            }

            fn meeting_attendees(
                &self,
                meeting: MeetingId,
            ) -> Result<BTreeSet<MemberId>, StoreError> {
                Ok(self
                    .tables()
                    .attendance
                    .get(&meeting)
                    .cloned()
                    .unwrap_or_default())
            }
        }

        impl ReadTxn for $txn {}
    };
}

impl_read_stores!(NullReadTxn);
impl_read_stores!(NullWriteTxn<'_>);

impl BallotingStoreMut for NullWriteTxn<'_> {
    fn insert_balloting(&mut self, balloting: &Balloting) -> Result<(), StoreError> {
        if self.staged.ballotings.contains_key(&balloting.id) {
            return Err(StoreError::Duplicate(balloting.id.to_string()));
        }
        self.staged.ballotings.insert(balloting.id, balloting.clone());
        Ok(())
    }

    fn put_balloting(&mut self, balloting: &Balloting) -> Result<(), StoreError> {
        match self.staged.ballotings.get_mut(&balloting.id) {
            Some(existing) => {
                *existing = balloting.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(balloting.id.to_string())),
        }
    }

    fn delete_balloting(&mut self, id: BallotingId) -> Result<(), StoreError> {
        self.staged
            .ballotings
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

impl VoteStoreMut for NullWriteTxn<'_> {
    fn insert_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        let key = (vote.balloting_id, vote.member_id.clone());
        if self.staged.vote_index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "vote by {} on {}",
                vote.member_id, vote.balloting_id
            )));
        }
        if self.staged.votes.contains_key(&vote.id) {
            return Err(StoreError::Duplicate(vote.id.to_string()));
        }
        self.staged.vote_index.insert(key, vote.id);
        self.staged.votes.insert(vote.id, vote.clone());
        Ok(())
    }

    fn put_vote(&mut self, vote: &Vote) -> Result<(), StoreError> {
        let existing = self
            .staged
            .votes
            .get_mut(&vote.id)
            .ok_or_else(|| StoreError::NotFound(vote.id.to_string()))?;
        if existing.balloting_id != vote.balloting_id || existing.member_id != vote.member_id {
            return Err(StoreError::Conflict(format!(
                "unique key of {} cannot change",
                vote.id
            )));
        }
        *existing = vote.clone();
        Ok(())
    }

    fn delete_vote(&mut self, id: VoteId) -> Result<(), StoreError> {
        let vote = self
            .staged
            .votes
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.staged
            .vote_index
            .remove(&(vote.balloting_id, vote.member_id));
        Ok(())
    }
}

impl NsbResponseStoreMut for NullWriteTxn<'_> {
    fn insert_response(&mut self, response: &NsbResponse) -> Result<(), StoreError> {
        let key = (response.project_id.clone(), response.responder_id.clone());
        if self.staged.response_index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "response by {} on {}",
                response.responder_id, response.project_id
            )));
        }
        self.staged.response_index.insert(key, response.id);
        self.staged.responses.insert(response.id, response.clone());
        Ok(())
    }
}

impl AcceptanceStoreMut for NullWriteTxn<'_> {
    fn insert_acceptance(&mut self, acceptance: &Acceptance) -> Result<(), StoreError> {
        let key = (acceptance.project_id.clone(), acceptance.version);
        if self.staged.acceptances.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "acceptance v{} of {}",
                acceptance.version, acceptance.project_id
            )));
        }
        self.staged.acceptances.insert(key, acceptance.clone());
        Ok(())
    }

    fn put_acceptance(&mut self, acceptance: &Acceptance) -> Result<(), StoreError> {
        let key = (acceptance.project_id.clone(), acceptance.version);
        match self.staged.acceptances.get_mut(&key) {
            Some(existing) => {
                *existing = acceptance.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!(
                "acceptance v{} of {}",
                acceptance.version, acceptance.project_id
            ))),
        }
    }
}

impl FdarsStoreMut for NullWriteTxn<'_> {
    fn put_fdars(&mut self, recommendation: &FdarsRecommendation) -> Result<(), StoreError> {
        self.staged
            .fdars
            .insert(recommendation.project_id.clone(), recommendation.clone());
        Ok(())
    }
}

impl RosterStoreMut for NullWriteTxn<'_> {
    fn record_attendance(
        &mut self,
        meeting: MeetingId,
        member: &MemberId,
    ) -> Result<(), StoreError> {
        self.staged
            .attendance
            .entry(meeting)
            .or_default()
            .insert(member.clone());
        Ok(())
    }
}

impl WriteTxn for NullWriteTxn<'_> {
    fn next_id(&mut self) -> Result<u64, StoreError> {
        Ok(self.env.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn commit(self) -> Result<(), StoreError> {
        let Self {
            mut guard,
            staged,
            env,
        } = self;
        if env.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected commit failure".into()));
        }
        *guard = staged;
        Ok(())
    }
}
