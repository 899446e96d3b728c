use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ClientId, Description, EmailAddress, OrganizationId, PersonName, PhoneNumber};

/// Customer together with the property that is serviced.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub organization_id: OrganizationId,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    /// Service address of the property.
    pub address: String,
    /// Pool construction, e.g. `gunite`, `vinyl`, `fiberglass`.
    pub pool_type: Option<String>,
    pub pool_volume_gallons: Option<i32>,
    pub notes: Option<Description>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Property details shared by create and update payloads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClientProperty {
    pub address: String,
    pub pool_type: Option<String>,
    pub pool_volume_gallons: Option<i32>,
}

impl ClientProperty {
    #[must_use]
    pub fn new(
        address: Option<String>,
        pool_type: Option<String>,
        pool_volume_gallons: Option<i32>,
    ) -> Self {
        Self {
            address: address
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            pool_type: pool_type
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            pool_volume_gallons: pool_volume_gallons.filter(|v| *v > 0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewClient {
    pub organization_id: OrganizationId,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub property: ClientProperty,
    pub notes: Option<Description>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        organization_id: OrganizationId,
        name: PersonName,
        email: Option<EmailAddress>,
        phone: Option<PhoneNumber>,
        property: ClientProperty,
        notes: Option<Description>,
    ) -> Self {
        Self {
            organization_id,
            name,
            email,
            phone,
            property,
            notes,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UpdateClient {
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub property: ClientProperty,
    pub notes: Option<Description>,
}

/// Clients sharing one normalized email; `keep` survives the merge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientMerge {
    pub organization_id: OrganizationId,
    pub email: EmailAddress,
    pub keep: ClientId,
    pub duplicates: Vec<ClientId>,
}

/// Raw stored email of a client, before any normalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientEmailRecord {
    pub id: ClientId,
    pub organization_id: OrganizationId,
    pub email: Option<String>,
}

/// Work needed to bring stored client emails into canonical form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EmailCleanupPlan {
    /// Surviving clients whose stored email differs from its normalized form.
    pub normalize: Vec<(ClientId, EmailAddress)>,
    pub merges: Vec<ClientMerge>,
    /// Clients whose email cannot be parsed; left untouched.
    pub invalid: Vec<ClientId>,
}

impl EmailCleanupPlan {
    pub fn is_empty(&self) -> bool {
        self.normalize.is_empty() && self.merges.is_empty()
    }
}

/// Groups clients by normalized email within each organization.
///
/// The client with the lowest id in every group is kept; the others are
/// listed as duplicates to be merged into it.
pub fn plan_email_merges(records: &[ClientEmailRecord]) -> EmailCleanupPlan {
    let mut plan = EmailCleanupPlan::default();
    let mut groups: BTreeMap<(OrganizationId, EmailAddress), Vec<ClientId>> = BTreeMap::new();
    let mut stored: Vec<(ClientId, &str, EmailAddress)> = Vec::new();

    for record in records {
        let Some(raw) = record.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            continue;
        };
        match EmailAddress::new(raw) {
            Ok(email) => {
                groups
                    .entry((record.organization_id, email.clone()))
                    .or_default()
                    .push(record.id);
                stored.push((record.id, raw, email));
            }
            Err(_) => plan.invalid.push(record.id),
        }
    }

    let mut merged_away = HashSet::new();
    for ((organization_id, email), mut ids) in groups {
        if ids.len() < 2 {
            continue;
        }
        ids.sort();
        let keep = ids.remove(0);
        merged_away.extend(ids.iter().copied());
        plan.merges.push(ClientMerge {
            organization_id,
            email,
            keep,
            duplicates: ids,
        });
    }

    plan.normalize = stored
        .into_iter()
        .filter(|(id, raw, email)| !merged_away.contains(id) && *raw != email.as_str())
        .map(|(id, _, email)| (id, email))
        .collect();
    plan.normalize.sort_by_key(|(id, _)| *id);
    plan.invalid.sort();

    plan
}
