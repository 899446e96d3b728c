use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool};
use crate::domain::chemical_price::{ChemicalPrice, NewChemicalPrice};
use crate::domain::client::{Client, ClientEmailRecord, ClientMerge, NewClient, UpdateClient};
use crate::domain::communication_provider::{
    CommunicationProvider, NewCommunicationProvider, UpdateCommunicationProvider,
};
use crate::domain::dashboard::DashboardStats;
use crate::domain::invoice::{Invoice, NewInvoice, NewInvoiceItem};
use crate::domain::organization::{Organization, Registration};
use crate::domain::project::{NewProject, Project, UpdateProject};
use crate::domain::technician::{NewTechnician, Technician, UpdateTechnician};
use crate::domain::types::{
    ChemicalPriceId, ClientId, EmailAddress, InvoiceId, InvoiceStatus, OrganizationId, ProjectId,
    ProviderId, TechnicianId, UserId, VendorId, WorkOrderId, WorkOrderKind, WorkOrderStatus,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::domain::vendor::{NewVendor, UpdateVendor, Vendor};
use crate::domain::work_order::{NewWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderTransition};
use crate::repository::errors::RepositoryResult;

pub mod chemical_price;
pub mod client;
pub mod communication_provider;
pub mod dashboard;
pub mod errors;
pub mod invoice;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod organization;
pub mod project;
pub mod technician;
pub mod user;
pub mod vendor;
pub mod work_order;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }

    /// Saturates instead of overflowing for absurd page numbers.
    pub fn offset(&self) -> i64 {
        i64::try_from(self.page.max(1) - 1)
            .unwrap_or(i64::MAX)
            .saturating_mul(self.limit())
    }
}

/// `%term%` with the LIKE wildcards in `term` escaped by `\`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientListQuery {
    pub organization_id: OrganizationId,
    pub search: Option<String>,
    /// Restricts the list to clients with work orders of this technician.
    pub technician_id: Option<TechnicianId>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            search: None,
            technician_id: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn technician(mut self, technician_id: TechnicianId) -> Self {
        self.technician_id = Some(technician_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderListQuery {
    pub organization_id: OrganizationId,
    pub status: Option<WorkOrderStatus>,
    pub kind: Option<WorkOrderKind>,
    pub technician_id: Option<TechnicianId>,
    pub client_id: Option<ClientId>,
    pub project_id: Option<ProjectId>,
    pub scheduled_from: Option<NaiveDate>,
    pub scheduled_to: Option<NaiveDate>,
    pub exclude_cancelled: bool,
    pub pagination: Option<Pagination>,
}

impl WorkOrderListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            status: None,
            kind: None,
            technician_id: None,
            client_id: None,
            project_id: None,
            scheduled_from: None,
            scheduled_to: None,
            exclude_cancelled: false,
            pagination: None,
        }
    }

    pub fn status(mut self, status: WorkOrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(mut self, kind: WorkOrderKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn technician(mut self, technician_id: TechnicianId) -> Self {
        self.technician_id = Some(technician_id);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Inclusive range of scheduled dates.
    pub fn scheduled_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.scheduled_from = from;
        self.scheduled_to = to;
        self
    }

    pub fn without_cancelled(mut self) -> Self {
        self.exclude_cancelled = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceListQuery {
    pub organization_id: OrganizationId,
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<ClientId>,
    /// Only sent invoices due before this date.
    pub overdue_on: Option<NaiveDate>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            status: None,
            client_id: None,
            overdue_on: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn overdue_on(mut self, today: NaiveDate) -> Self {
        self.overdue_on = Some(today);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChemicalPriceListQuery {
    pub organization_id: OrganizationId,
    pub vendor_id: Option<VendorId>,
    /// Case-insensitive substring of the chemical name.
    pub chemical: Option<String>,
}

impl ChemicalPriceListQuery {
    pub fn new(organization_id: OrganizationId) -> Self {
        Self {
            organization_id,
            vendor_id: None,
            chemical: None,
        }
    }

    pub fn vendor(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }

    pub fn chemical(mut self, chemical: impl Into<String>) -> Self {
        self.chemical = Some(chemical.into());
        self
    }
}

pub trait OrganizationReader {
    fn get_organization_by_id(&self, id: OrganizationId)
    -> RepositoryResult<Option<Organization>>;
}

pub trait OrganizationWriter {
    /// Creates the organization and its first admin atomically.
    fn register_organization(
        &self,
        registration: &Registration,
    ) -> RepositoryResult<(Organization, User)>;
}

pub trait UserReader {
    fn get_user_by_id(
        &self,
        id: UserId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
    fn get_user_by_google_sub(&self, google_sub: &str) -> RepositoryResult<Option<User>>;
    fn list_users(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    fn update_user(
        &self,
        id: UserId,
        organization_id: OrganizationId,
        updates: &UpdateUser,
    ) -> RepositoryResult<User>;
    fn update_user_password(&self, id: UserId, password_hash: &str) -> RepositoryResult<()>;
    fn activate_user(&self, id: UserId) -> RepositoryResult<()>;
    fn link_google_account(&self, id: UserId, google_sub: &str) -> RepositoryResult<User>;
}

pub trait ClientReader {
    fn get_client_by_id(
        &self,
        id: ClientId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    /// Stored emails of the organization's clients, as written.
    fn list_client_emails(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<String>>;
    /// Raw email column of every client, optionally limited to one organization.
    fn list_client_email_records(
        &self,
        organization_id: Option<OrganizationId>,
    ) -> RepositoryResult<Vec<ClientEmailRecord>>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(
        &self,
        id: ClientId,
        organization_id: OrganizationId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client>;
    /// Fails with a constraint violation while the client has invoices.
    fn delete_client(&self, id: ClientId, organization_id: OrganizationId) -> RepositoryResult<()>;
    fn update_client_email(&self, id: ClientId, email: &EmailAddress) -> RepositoryResult<()>;
    /// Re-points dependants of the duplicates to `keep` and deletes the
    /// duplicates. Returns the number of deleted clients.
    fn merge_clients(&self, merge: &ClientMerge) -> RepositoryResult<usize>;
}

pub trait TechnicianReader {
    fn get_technician_by_id(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Technician>>;
    fn get_technician_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Technician>>;
    fn list_technicians(&self, organization_id: OrganizationId)
    -> RepositoryResult<Vec<Technician>>;
}

pub trait TechnicianWriter {
    fn create_technician(&self, new_technician: &NewTechnician) -> RepositoryResult<Technician>;
    fn update_technician(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
        updates: &UpdateTechnician,
    ) -> RepositoryResult<Technician>;
    fn delete_technician(
        &self,
        id: TechnicianId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()>;
}

pub trait ProjectReader {
    fn get_project_by_id(
        &self,
        id: ProjectId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Project>>;
    fn list_projects(
        &self,
        organization_id: OrganizationId,
        client_id: Option<ClientId>,
    ) -> RepositoryResult<Vec<Project>>;
}

pub trait ProjectWriter {
    fn create_project(&self, new_project: &NewProject) -> RepositoryResult<Project>;
    fn update_project(
        &self,
        id: ProjectId,
        organization_id: OrganizationId,
        updates: &UpdateProject,
    ) -> RepositoryResult<Project>;
    fn delete_project(&self, id: ProjectId, organization_id: OrganizationId)
    -> RepositoryResult<()>;
}

pub trait WorkOrderReader {
    fn get_work_order_by_id(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<WorkOrder>>;
    fn get_work_orders_by_ids(
        &self,
        ids: &[WorkOrderId],
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<WorkOrder>>;
    fn list_work_orders(
        &self,
        query: WorkOrderListQuery,
    ) -> RepositoryResult<(usize, Vec<WorkOrder>)>;
}

pub trait WorkOrderWriter {
    fn create_work_order(&self, new_work_order: &NewWorkOrder) -> RepositoryResult<WorkOrder>;
    fn update_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
        updates: &UpdateWorkOrder,
    ) -> RepositoryResult<WorkOrder>;
    /// Applies a status change and creates the follow-up visit, if any, in
    /// one transaction. Fails with a constraint violation when the work order
    /// no longer has the status the transition was planned from.
    fn transition_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
        transition: &WorkOrderTransition,
    ) -> RepositoryResult<(WorkOrder, Option<WorkOrder>)>;
    fn delete_work_order(
        &self,
        id: WorkOrderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
}

pub trait InvoiceWriter {
    /// Numbers the invoice, stores it with its items and links the work
    /// orders referenced by the items.
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn replace_invoice_items(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
        items: &[NewInvoiceItem],
    ) -> RepositoryResult<Invoice>;
    /// Applies `status` only from a status allowed to move to it. A void
    /// invoice releases its work orders.
    fn update_invoice_status(
        &self,
        id: InvoiceId,
        organization_id: OrganizationId,
        status: InvoiceStatus,
        paid_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Invoice>;
    /// Deletes the invoice and releases its work orders.
    fn delete_invoice(&self, id: InvoiceId, organization_id: OrganizationId)
    -> RepositoryResult<()>;
}

pub trait VendorReader {
    fn get_vendor_by_id(
        &self,
        id: VendorId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<Vendor>>;
    fn list_vendors(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Vendor>>;
}

pub trait VendorWriter {
    fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor>;
    fn update_vendor(
        &self,
        id: VendorId,
        organization_id: OrganizationId,
        updates: &UpdateVendor,
    ) -> RepositoryResult<Vendor>;
    fn delete_vendor(&self, id: VendorId, organization_id: OrganizationId) -> RepositoryResult<()>;
}

pub trait ChemicalPriceReader {
    fn list_chemical_prices(
        &self,
        query: ChemicalPriceListQuery,
    ) -> RepositoryResult<Vec<ChemicalPrice>>;
}

pub trait ChemicalPriceWriter {
    fn create_chemical_price(&self, new_price: &NewChemicalPrice)
    -> RepositoryResult<ChemicalPrice>;
    fn delete_chemical_price(
        &self,
        id: ChemicalPriceId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<()>;
}

pub trait CommunicationProviderReader {
    fn get_provider_by_id(
        &self,
        id: ProviderId,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Option<CommunicationProvider>>;
    fn list_providers(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<CommunicationProvider>>;
}

pub trait CommunicationProviderWriter {
    /// A new default clears the previous default of the same channel.
    fn create_provider(
        &self,
        new_provider: &NewCommunicationProvider,
    ) -> RepositoryResult<CommunicationProvider>;
    fn update_provider(
        &self,
        id: ProviderId,
        organization_id: OrganizationId,
        updates: &UpdateCommunicationProvider,
    ) -> RepositoryResult<CommunicationProvider>;
    fn delete_provider(&self, id: ProviderId, organization_id: OrganizationId)
    -> RepositoryResult<()>;
}

pub trait DashboardReader {
    fn dashboard_stats(
        &self,
        organization_id: OrganizationId,
        today: NaiveDate,
    ) -> RepositoryResult<DashboardStats>;
}
