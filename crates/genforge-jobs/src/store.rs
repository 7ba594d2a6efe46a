//! In-memory job and artifact stores.
//!
//! Plain `Mutex<HashMap>` keyed stores; the job's own execution task is
//! the only writer for its key, readers take snapshots.

use std::collections::HashMap;
use std::sync::Mutex;

use genforge_core::domain::artifact::{Artifact, GenerationOutput};
use uuid::Uuid;

use crate::job::Job;

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Job) {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        jobs.insert(job.id, job);
    }

    pub fn get(&self, job_id: Uuid) -> Option<Job> {
        let jobs = self.jobs.lock().expect("job store lock poisoned");
        jobs.get(&job_id).cloned()
    }

    pub fn update<F>(&self, job_id: Uuid, mutate: F)
    where
        F: FnOnce(&mut Job),
    {
        let mut jobs = self.jobs.lock().expect("job store lock poisoned");
        if let Some(job) = jobs.get_mut(&job_id) {
            mutate(job);
        }
    }
}

/// Current artifact set per job; each round's persist replaces the set.
#[derive(Default)]
pub struct MemoryArtifactStore {
    sets: Mutex<HashMap<Uuid, GenerationOutput>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, job_id: Uuid, output: GenerationOutput) {
        let mut sets = self.sets.lock().expect("artifact store lock poisoned");
        sets.insert(job_id, output);
    }

    pub fn get(&self, job_id: Uuid) -> Option<GenerationOutput> {
        let sets = self.sets.lock().expect("artifact store lock poisoned");
        sets.get(&job_id).cloned()
    }

    pub fn find_artifact(&self, job_id: Uuid, artifact_id: Uuid) -> Option<Artifact> {
        let sets = self.sets.lock().expect("artifact store lock poisoned");
        sets.get(&job_id)
            .and_then(|o| o.artifacts.iter().find(|a| a.id == artifact_id).cloned())
    }
}
