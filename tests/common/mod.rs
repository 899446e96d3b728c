#![allow(dead_code)]

use chrono::NaiveDate;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pushkind_pool::db::{DbPool, establish_connection_pool};
use pushkind_pool::domain::client::{Client, ClientProperty, NewClient};
use pushkind_pool::domain::organization::{NewOrganization, Registration};
use pushkind_pool::domain::types::{
    Cents, ClientId, EmailAddress, OrganizationId, OrganizationName, PersonName, Recurrence,
    TechnicianId, WorkOrderKind, WorkOrderTitle,
};
use pushkind_pool::domain::user::User;
use pushkind_pool::domain::work_order::{NewWorkOrder, WorkOrder};
use pushkind_pool::repository::{
    ClientWriter, DieselRepository, OrganizationWriter, WorkOrderWriter,
};
use tempfile::TempDir;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Migrated SQLite database in a temporary directory, removed on drop.
pub struct TestDb {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    pub fn new(name: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("connection pool");
        let mut conn = pool.get().expect("connection");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("migrations");
        Self { pool, _dir: dir }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Registers an organization with an admin whose email is `email`.
pub fn organization(repo: &DieselRepository, name: &str, email: &str) -> (OrganizationId, User) {
    let registration = Registration {
        organization: NewOrganization::new(OrganizationName::new(name).unwrap()),
        email: EmailAddress::new(email).unwrap(),
        name: PersonName::new("Owner").unwrap(),
        password_hash: "$argon2id$test".to_string(),
    };
    let (organization, user) = repo.register_organization(&registration).unwrap();
    (organization.id, user)
}

pub fn client(
    repo: &DieselRepository,
    organization_id: OrganizationId,
    name: &str,
    email: Option<&str>,
) -> Client {
    let new_client = NewClient::new(
        organization_id,
        PersonName::new(name).unwrap(),
        email.map(|e| EmailAddress::new(e).unwrap()),
        None,
        ClientProperty::new(Some("1 Pool Lane".to_string()), Some("gunite".to_string()), Some(15000)),
        None,
    );
    repo.create_client(&new_client).unwrap()
}

pub fn work_order(
    repo: &DieselRepository,
    organization_id: OrganizationId,
    client_id: ClientId,
    technician_id: Option<TechnicianId>,
    scheduled_on: NaiveDate,
) -> WorkOrder {
    let new_work_order = NewWorkOrder {
        organization_id,
        client_id,
        technician_id,
        project_id: None,
        kind: WorkOrderKind::Maintenance,
        recurrence: Recurrence::Weekly,
        title: WorkOrderTitle::new("Weekly service").unwrap(),
        description: None,
        scheduled_on,
        price: Cents::new(8500).unwrap(),
    };
    repo.create_work_order(&new_work_order).unwrap()
}
