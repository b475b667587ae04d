//! Duplicate cleanup run from the maintenance binary.

use std::collections::HashMap;
use std::hash::Hash;

use mongodb::bson::{doc, oid::ObjectId};

use crate::database::{Entity, FindQuery, Record, Repository, SortBy, StoreResult};
use crate::models::{Attendance, Lead};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DedupeSummary {
    pub scanned: usize,
    /// Keys that had more than one document
    pub duplicate_groups: usize,
    pub removed: Vec<ObjectId>,
    pub dry_run: bool,
}

/// Last ten digits of a phone number, so "+91 98450-12345" and "9845012345" match.
pub fn phone_key(phone: &str) -> Option<String> {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let start = digits.len().saturating_sub(10);
    Some(digits[start..].iter().collect())
}

/// Keeps the earliest lead per normalized phone number.
pub async fn dedupe_leads(repo: &Repository<Lead>, dry_run: bool) -> StoreResult<DedupeSummary> {
    dedupe_by(repo, |lead| phone_key(&lead.phone), dry_run).await
}

/// Keeps the earliest attendance mark per worker and day.
pub async fn dedupe_attendance(repo: &Repository<Attendance>, dry_run: bool) -> StoreResult<DedupeSummary> {
    dedupe_by(repo, |a| Some((a.worker_id.clone(), a.date)), dry_run).await
}

async fn dedupe_by<T, K, F>(repo: &Repository<T>, key: F, dry_run: bool) -> StoreResult<DedupeSummary>
where
    T: Entity,
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let records: Vec<Record<T>> = repo
        .find(FindQuery::new(doc! {}).sort(SortBy::asc("created_at")))
        .await?;
    log::info!("🔍 Scanning {} {} documents for duplicates", records.len(), T::COLLECTION);

    let mut groups: HashMap<K, Vec<ObjectId>> = HashMap::new();
    for record in &records {
        if let Some(k) = key(&record.data) {
            groups.entry(k).or_default().push(record.id);
        }
    }

    let mut summary = DedupeSummary { scanned: records.len(), dry_run, ..Default::default() };
    for ids in groups.values().filter(|ids| ids.len() > 1) {
        summary.duplicate_groups += 1;
        // records are sorted oldest first, so the first id is the keeper
        summary.removed.extend_from_slice(&ids[1..]);
    }

    if summary.removed.is_empty() {
        log::info!("✅ No duplicates in {}", T::COLLECTION);
        return Ok(summary);
    }

    if dry_run {
        log::info!(
            "📝 Dry run: {} duplicates in {} groups would be removed from {}",
            summary.removed.len(),
            summary.duplicate_groups,
            T::COLLECTION
        );
        return Ok(summary);
    }

    let deleted = repo.delete_by_ids(&summary.removed).await?;
    log::info!("🗑️ Removed {} duplicates from {}", deleted, T::COLLECTION);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::{AttendanceStatus, LeadSource, LeadStatus};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn lead(name: &str, phone: &str, created_at: i64) -> Lead {
        Lead {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            source: LeadSource::Website,
            status: LeadStatus::New,
            project_id: None,
            assigned_to: None,
            budget: None,
            notes: None,
            follow_up_date: None,
            created_by: "seed".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    fn mark(worker: &str, day: u32, created_at: i64) -> Attendance {
        Attendance {
            worker_id: worker.to_string(),
            project_id: None,
            date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            status: AttendanceStatus::Present,
            overtime_hours: 0.0,
            wage: 900.0,
            marked_by: "seed".to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn phone_key_uses_last_ten_digits() {
        assert_eq!(phone_key("+91 98450-12345").as_deref(), Some("9845012345"));
        assert_eq!(phone_key("98450 12345").as_deref(), Some("9845012345"));
        assert_eq!(phone_key("ext. 42").as_deref(), Some("42"));
        assert_eq!(phone_key("n/a"), None);
    }

    #[tokio::test]
    async fn keeps_the_earliest_lead() {
        let repo = Repository::<Lead>::new(Arc::new(MemoryStore::new()));
        let later = repo.insert(lead("Asha (again)", "98450 12345", 200)).await.unwrap();
        let first = repo.insert(lead("Asha", "+91-9845012345", 100)).await.unwrap();
        repo.insert(lead("Vikram", "9900011122", 150)).await.unwrap();

        let summary = dedupe_leads(&repo, false).await.unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.duplicate_groups, 1);
        assert_eq!(summary.removed, vec![later.id]);

        assert!(repo.find_by_id(first.id).await.unwrap().is_some());
        assert!(repo.find_by_id(later.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dry_run_deletes_nothing() {
        let repo = Repository::<Attendance>::new(Arc::new(MemoryStore::new()));
        repo.insert(mark("w1", 3, 10)).await.unwrap();
        repo.insert(mark("w1", 3, 20)).await.unwrap();
        repo.insert(mark("w1", 4, 30)).await.unwrap();

        let summary = dedupe_attendance(&repo, true).await.unwrap();
        assert!(summary.dry_run);
        assert_eq!(summary.removed.len(), 1);
        assert_eq!(repo.count(doc! {}).await.unwrap(), 3);

        dedupe_attendance(&repo, false).await.unwrap();
        assert_eq!(repo.count(doc! {}).await.unwrap(), 2);
    }
}
