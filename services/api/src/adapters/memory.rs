//! services/api/src/adapters/memory.rs
//!
//! A process-local implementation of the storage ports, selected with
//! `DATABASE_URL=memory://`. Used for local demos and the HTTP tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use livestock_core::domain::{AnalysisRecord, NewAnalysis, User, UserCredentials};
use livestock_core::ports::{AccountStore, AnalysisStore, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    // Insertion sequence breaks ties between equal timestamps.
    analyses: Vec<(u64, AnalysisRecord)>,
    next_seq: u64,
    users: HashMap<String, UserCredentials>,
    sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: RwLock<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryDb {
    async fn create_analysis(&self, analysis: NewAnalysis) -> PortResult<AnalysisRecord> {
        let now = Utc::now();
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            owner_id: analysis.owner_id,
            image: analysis.image,
            location: analysis.location,
            report_data: analysis.report_data,
            yolo_data: analysis.yolo_data,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.analyses.push((seq, record.clone()));
        Ok(record)
    }

    async fn list_analyses_by_owner(&self, owner_id: Uuid) -> PortResult<Vec<AnalysisRecord>> {
        let tables = self.tables.read().await;
        let mut owned: Vec<&(u64, AnalysisRecord)> = tables
            .analyses
            .iter()
            .filter(|(_, r)| r.owner_id == owner_id)
            .collect();
        owned.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(owned.into_iter().map(|(_, r)| r.clone()).collect())
    }

    async fn fetch_analysis(&self, analysis_id: Uuid) -> PortResult<AnalysisRecord> {
        self.tables
            .read()
            .await
            .analyses
            .iter()
            .find(|(_, r)| r.id == analysis_id)
            .map(|(_, r)| r.clone())
            .ok_or_else(|| PortError::NotFound(format!("Analysis {} not found", analysis_id)))
    }
}

#[async_trait]
impl AccountStore for InMemoryDb {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(email) {
            return Err(PortError::Conflict(format!("User {} already exists", email)));
        }
        let user = User {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
        };
        tables.users.insert(
            email.to_string(),
            UserCredentials {
                user: user.clone(),
                hashed_password: hashed_password.to_string(),
            },
        );
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .read()
            .await
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn create_auth_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables
            .write()
            .await
            .sessions
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, token: &str) -> PortResult<Uuid> {
        let mut tables = self.tables.write().await;
        match tables.sessions.get(token).copied() {
            Some((user_id, expires_at)) if expires_at > Utc::now() => Ok(user_id),
            Some(_) => {
                // Expired sessions are dropped on first sight.
                tables.sessions.remove(token);
                Err(PortError::Unauthorized)
            }
            None => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, token: &str) -> PortResult<()> {
        self.tables.write().await.sessions.remove(token);
        Ok(())
    }
}
