use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{ClientId, OrganizationId, PersonName, TypeConstraintError};
use crate::models::{optional_description, optional_email, optional_phone};

#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: String,
    pub pool_type: Option<String>,
    pub pool_volume_gallons: Option<i32>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub organization_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: &'a str,
    pub pool_type: Option<&'a str>,
    pub pool_volume_gallons: Option<i32>,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: &'a str,
    pub pool_type: Option<&'a str>,
    pub pool_volume_gallons: Option<i32>,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::new(client.id)?,
            organization_id: OrganizationId::new(client.organization_id)?,
            name: PersonName::new(client.name)?,
            email: optional_email(client.email)?,
            phone: optional_phone(client.phone)?,
            address: client.address,
            pool_type: client.pool_type,
            pool_volume_gallons: client.pool_volume_gallons,
            notes: optional_description(client.notes),
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            organization_id: client.organization_id.get(),
            name: client.name.as_str(),
            email: client.email.as_ref().map(|e| e.as_str()),
            phone: client.phone.as_ref().map(|p| p.as_str()),
            address: client.property.address.as_str(),
            pool_type: client.property.pool_type.as_deref(),
            pool_volume_gallons: client.property.pool_volume_gallons,
            notes: client.notes.as_ref().map(|n| n.as_str()),
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(client: &'a DomainUpdateClient, updated_at: NaiveDateTime) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_ref().map(|e| e.as_str()),
            phone: client.phone.as_ref().map(|p| p.as_str()),
            address: client.property.address.as_str(),
            pool_type: client.property.pool_type.as_deref(),
            pool_volume_gallons: client.property.pool_volume_gallons,
            notes: client.notes.as_ref().map(|n| n.as_str()),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::client::ClientProperty;
    use crate::domain::types::EmailAddress;

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = DomainNewClient::new(
            OrganizationId::new(1).unwrap(),
            PersonName::new("John").unwrap(),
            Some(EmailAddress::new("john@example.com").unwrap()),
            None,
            ClientProperty::new(Some("1 Main St".to_string()), Some("vinyl".to_string()), Some(15_000)),
            None,
        );
        let new: NewClient = (&domain).into();
        assert_eq!(new.organization_id, 1);
        assert_eq!(new.name, "John");
        assert_eq!(new.email, Some("john@example.com"));
        assert_eq!(new.phone, None);
        assert_eq!(new.address, "1 Main St");
        assert_eq!(new.pool_volume_gallons, Some(15_000));
    }

    #[test]
    fn client_into_domain_drops_blank_contacts() {
        let now = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            organization_id: 2,
            name: "n".to_string(),
            email: Some("  ".to_string()),
            phone: None,
            address: "a".to_string(),
            pool_type: None,
            pool_volume_gallons: None,
            notes: Some("gate code 1234".to_string()),
            created_at: now,
            updated_at: now,
        };
        let domain = DomainClient::try_from(db_client).unwrap();
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.organization_id.get(), 2);
        assert_eq!(domain.email, None);
        assert_eq!(domain.notes.unwrap().as_str(), "gate code 1234");
    }
}
