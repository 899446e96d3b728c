//! Mock repository implementations for isolating services in tests.

use chrono::{NaiveDate, NaiveDateTime};
use mockall::mock;

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
    ProviderId, TechnicianId, UserId, VendorId, WorkOrderId,
};
use crate::domain::user::{NewUser, UpdateUser, User};
use crate::domain::vendor::{NewVendor, UpdateVendor, Vendor};
use crate::domain::work_order::{NewWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderTransition};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ChemicalPriceListQuery, ChemicalPriceReader, ChemicalPriceWriter, ClientListQuery,
    ClientReader, ClientWriter, CommunicationProviderReader, CommunicationProviderWriter,
    DashboardReader, InvoiceListQuery, InvoiceReader, InvoiceWriter, OrganizationReader,
    OrganizationWriter, ProjectReader, ProjectWriter, TechnicianReader, TechnicianWriter,
    UserReader, UserWriter, VendorReader, VendorWriter, WorkOrderListQuery, WorkOrderReader,
    WorkOrderWriter,
};

mock! {
    pub Repository {}

    impl OrganizationReader for Repository {
        fn get_organization_by_id(&self, id: OrganizationId) -> RepositoryResult<Option<Organization>>;
    }

    impl OrganizationWriter for Repository {
        fn register_organization(
            &self,
            registration: &Registration,
        ) -> RepositoryResult<(Organization, User)>;
    }

    impl UserReader for Repository {
        fn get_user_by_id(
            &self,
            id: UserId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &EmailAddress) -> RepositoryResult<Option<User>>;
        fn get_user_by_google_sub(&self, google_sub: &str) -> RepositoryResult<Option<User>>;
        fn list_users(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
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

    impl ClientReader for Repository {
        fn get_client_by_id(
            &self,
            id: ClientId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Client>>;
        fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
        fn list_client_emails(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<String>>;
        fn list_client_email_records(
            &self,
            organization_id: Option<OrganizationId>,
        ) -> RepositoryResult<Vec<ClientEmailRecord>>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(
            &self,
            id: ClientId,
            organization_id: OrganizationId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId, organization_id: OrganizationId) -> RepositoryResult<()>;
        fn update_client_email(&self, id: ClientId, email: &EmailAddress) -> RepositoryResult<()>;
        fn merge_clients(&self, merge: &ClientMerge) -> RepositoryResult<usize>;
    }

    impl TechnicianReader for Repository {
        fn get_technician_by_id(
            &self,
            id: TechnicianId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Technician>>;
        fn get_technician_by_user(&self, user_id: UserId) -> RepositoryResult<Option<Technician>>;
        fn list_technicians(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Technician>>;
    }

    impl TechnicianWriter for Repository {
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

    impl ProjectReader for Repository {
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

    impl ProjectWriter for Repository {
        fn create_project(&self, new_project: &NewProject) -> RepositoryResult<Project>;
        fn update_project(
            &self,
            id: ProjectId,
            organization_id: OrganizationId,
            updates: &UpdateProject,
        ) -> RepositoryResult<Project>;
        fn delete_project(&self, id: ProjectId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl WorkOrderReader for Repository {
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

    impl WorkOrderWriter for Repository {
        fn create_work_order(&self, new_work_order: &NewWorkOrder) -> RepositoryResult<WorkOrder>;
        fn update_work_order(
            &self,
            id: WorkOrderId,
            organization_id: OrganizationId,
            updates: &UpdateWorkOrder,
        ) -> RepositoryResult<WorkOrder>;
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

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(
            &self,
            id: InvoiceId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn replace_invoice_items(
            &self,
            id: InvoiceId,
            organization_id: OrganizationId,
            items: &[NewInvoiceItem],
        ) -> RepositoryResult<Invoice>;
        fn update_invoice_status(
            &self,
            id: InvoiceId,
            organization_id: OrganizationId,
            status: InvoiceStatus,
            paid_at: Option<NaiveDateTime>,
        ) -> RepositoryResult<Invoice>;
        fn delete_invoice(&self, id: InvoiceId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl VendorReader for Repository {
        fn get_vendor_by_id(
            &self,
            id: VendorId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<Option<Vendor>>;
        fn list_vendors(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Vendor>>;
    }

    impl VendorWriter for Repository {
        fn create_vendor(&self, new_vendor: &NewVendor) -> RepositoryResult<Vendor>;
        fn update_vendor(
            &self,
            id: VendorId,
            organization_id: OrganizationId,
            updates: &UpdateVendor,
        ) -> RepositoryResult<Vendor>;
        fn delete_vendor(&self, id: VendorId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl ChemicalPriceReader for Repository {
        fn list_chemical_prices(
            &self,
            query: ChemicalPriceListQuery,
        ) -> RepositoryResult<Vec<ChemicalPrice>>;
    }

    impl ChemicalPriceWriter for Repository {
        fn create_chemical_price(&self, new_price: &NewChemicalPrice) -> RepositoryResult<ChemicalPrice>;
        fn delete_chemical_price(
            &self,
            id: ChemicalPriceId,
            organization_id: OrganizationId,
        ) -> RepositoryResult<()>;
    }

    impl CommunicationProviderReader for Repository {
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

    impl CommunicationProviderWriter for Repository {
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
        fn delete_provider(&self, id: ProviderId, organization_id: OrganizationId) -> RepositoryResult<()>;
    }

    impl DashboardReader for Repository {
        fn dashboard_stats(
            &self,
            organization_id: OrganizationId,
            today: NaiveDate,
        ) -> RepositoryResult<DashboardStats>;
    }
}
