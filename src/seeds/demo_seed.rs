use std::sync::Arc;

use chrono::NaiveDate;
use mongodb::bson::doc;

use crate::database::{DocumentStore, Repository};
use crate::models::{Project, ProjectStatus, ProjectType, User, UserRole, Worker, WorkerSkill};
use crate::services::auth_service::hash_password;
use crate::services::now;
use crate::utils::AppResult;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub projects: usize,
    pub workers: usize,
}

/// Demo projects and workers. Only inserts when the projects collection is empty.
pub async fn seed_demo_data(store: Arc<dyn DocumentStore>) -> AppResult<SeedSummary> {
    let projects = Repository::<Project>::new(store.clone());
    let workers = Repository::<Worker>::new(store);

    let count = projects.count(doc! {}).await?;
    if count > 0 {
        log::info!("🌱 Demo data: {} projects already in DB, skipping seed", count);
        return Ok(SeedSummary::default());
    }

    log::info!("🌱 Demo data: seeding projects and workers...");
    let ts = now();
    let mut summary = SeedSummary::default();

    for project in demo_projects(ts) {
        let record = projects.insert(project).await?;
        summary.projects += 1;

        for worker in demo_workers(&record.id.to_hex(), ts) {
            workers.insert(worker).await?;
            summary.workers += 1;
        }
        log::info!("   ✅ {}", record.data.name);
    }

    log::info!("✅ Demo data seeded: {} projects, {} workers", summary.projects, summary.workers);
    Ok(summary)
}

/// Creates an active admin account unless one already exists with this email.
pub async fn seed_admin(store: Arc<dyn DocumentStore>, email: &str, password: &str) -> AppResult<bool> {
    let users = Repository::<User>::new(store);
    let email = email.trim().to_lowercase();

    if users.find_one(doc! { "email": &email }).await?.is_some() {
        log::info!("👤 Admin {} already exists, skipping", email);
        return Ok(false);
    }

    let ts = now();
    users
        .insert(User {
            email: email.clone(),
            password_hash: hash_password(password)?,
            name: "Administrator".to_string(),
            phone: None,
            role: UserRole::Admin,
            is_active: true,
            last_login: None,
            created_at: ts,
            updated_at: ts,
        })
        .await?;

    log::info!("👤 Admin account created: {}", email);
    Ok(true)
}

fn demo_projects(now: i64) -> Vec<Project> {
    vec![
        Project {
            name: "Green Valley Residency".into(),
            location: "Sarjapur Road, Bengaluru".into(),
            project_type: ProjectType::Residential,
            status: ProjectStatus::InProgress,
            total_units: 120,
            sold_units: 46,
            budget: 480_000_000.0,
            spent: 192_500_000.0,
            start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            expected_completion: NaiveDate::from_ymd_opt(2026, 12, 31),
            manager_id: None,
            description: Some("Two towers of 2 and 3 BHK apartments with clubhouse".into()),
            created_by: "seed".into(),
            created_at: now,
            updated_at: now,
        },
        Project {
            name: "Harbor Point Commercial".into(),
            location: "Whitefield, Bengaluru".into(),
            project_type: ProjectType::Commercial,
            status: ProjectStatus::Planning,
            total_units: 40,
            sold_units: 0,
            budget: 310_000_000.0,
            spent: 0.0,
            start_date: NaiveDate::from_ymd_opt(2025, 9, 1),
            expected_completion: None,
            manager_id: None,
            description: Some("Office floors with ground-level retail".into()),
            created_by: "seed".into(),
            created_at: now,
            updated_at: now,
        },
    ]
}

fn demo_workers(project_id: &str, now: i64) -> Vec<Worker> {
    [
        ("Ramesh Kumar", WorkerSkill::Supervisor, 1500.0),
        ("Suresh Gowda", WorkerSkill::Mason, 950.0),
        ("Imran Sheikh", WorkerSkill::Electrician, 1100.0),
        ("Lakshmi Devi", WorkerSkill::Helper, 650.0),
    ]
    .into_iter()
    .map(|(name, skill, daily_wage)| Worker {
        name: name.to_string(),
        phone: None,
        skill,
        daily_wage,
        project_id: Some(project_id.to_string()),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
    .collect()
}
