use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Cents, EmailAddress, OrganizationId, PersonName, PhoneNumber, TechnicianId, UserId,
};

/// Field technician; may be linked to a user account for self-service.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Technician {
    pub id: TechnicianId,
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub hourly_rate: Cents,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTechnician {
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub hourly_rate: Cents,
}

#[derive(Clone, Debug)]
pub struct UpdateTechnician {
    pub user_id: Option<UserId>,
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub hourly_rate: Cents,
    pub is_active: bool,
}
