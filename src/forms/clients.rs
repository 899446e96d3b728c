use std::fs::File;
use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{ClientProperty, NewClient, UpdateClient};
use crate::domain::types::{Description, EmailAddress, OrganizationId, PersonName, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Validate)]
/// Client and property record as posted by the browser.
pub struct ClientForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[serde(default)]
    pub pool_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub pool_volume_gallons: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct ClientPayload {
    pub name: PersonName,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
    pub property: ClientProperty,
    pub notes: Option<Description>,
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            name: PersonName::new(form.name)?,
            email: non_blank(form.email).map(EmailAddress::new).transpose()?,
            phone: non_blank(form.phone).map(PhoneNumber::new).transpose()?,
            property: ClientProperty::new(form.address, form.pool_type, form.pool_volume_gallons),
            notes: Description::optional(form.notes),
        })
    }
}

impl ClientPayload {
    pub fn into_new_client(self, organization_id: OrganizationId) -> NewClient {
        NewClient::new(
            organization_id,
            self.name,
            self.email,
            self.phone,
            self.property,
            self.notes,
        )
    }

    pub fn into_update(self) -> UpdateClient {
        UpdateClient {
            name: self.name,
            email: self.email,
            phone: self.phone,
            property: self.property,
            notes: self.notes,
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadClientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadClientsForm {
    /// Reads the uploaded file as client CSV.
    pub fn parse(&self, organization_id: OrganizationId) -> Result<Vec<NewClient>, FormError> {
        let file = File::open(self.csv.file.path()).map_err(|err| FormError::Csv(err.to_string()))?;
        parse_clients_csv(file, organization_id)
    }
}

/// One CSV row; columns may come in any order, unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct ClientCsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    pool_type: Option<String>,
    #[serde(default)]
    pool_volume_gallons: Option<i32>,
    #[serde(default)]
    notes: Option<String>,
}

/// Parses `name,email,phone,address,pool_type,pool_volume_gallons,notes`
/// CSV with a header row.
pub fn parse_clients_csv<R: Read>(
    reader: R,
    organization_id: OrganizationId,
) -> Result<Vec<NewClient>, FormError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut clients = Vec::new();
    for (index, record) in reader.deserialize::<ClientCsvRow>().enumerate() {
        // Header is line 1.
        let row = index + 2;
        let record = record.map_err(|err| FormError::CsvRow {
            row,
            message: err.to_string(),
        })?;
        let form = ClientForm {
            name: record.name,
            email: record.email,
            phone: record.phone,
            address: record.address,
            pool_type: record.pool_type,
            pool_volume_gallons: record.pool_volume_gallons,
            notes: record.notes,
        };
        let payload = ClientPayload::try_from(form).map_err(|err| FormError::CsvRow {
            row,
            message: err.to_string(),
        })?;
        clients.push(payload.into_new_client(organization_id));
    }

    Ok(clients)
}
