use chrono::Utc;
use pushkind_pool::domain::communication_provider::NewCommunicationProvider;
use pushkind_pool::domain::invoice::{InvoiceDates, NewInvoice, NewInvoiceItem};
use pushkind_pool::domain::types::{
    Cents, ClientId, Description, EmailAddress, InvoiceStatus, NonEmptyString, PersonName,
    ProviderKind, ProviderName, Quantity, TaxRate, UserRole, WorkOrderStatus,
};
use pushkind_pool::domain::technician::NewTechnician;
use pushkind_pool::domain::user::NewUser;
use pushkind_pool::domain::work_order::WorkOrderTransition;
use pushkind_pool::repository::errors::RepositoryError;
use pushkind_pool::repository::{
    ClientListQuery, ClientReader, ClientWriter, CommunicationProviderReader,
    CommunicationProviderWriter, DashboardReader, InvoiceListQuery, InvoiceReader, InvoiceWriter,
    TechnicianWriter, UserReader, UserWriter, WorkOrderListQuery, WorkOrderReader,
    WorkOrderWriter,
};
use serde_json::json;

mod common;

use common::{date, organization};

fn invoice_for(
    organization_id: pushkind_pool::domain::types::OrganizationId,
    client_id: ClientId,
    items: Vec<NewInvoiceItem>,
) -> NewInvoice {
    NewInvoice {
        organization_id,
        client_id,
        dates: InvoiceDates::new(date(2026, 5, 1), date(2026, 5, 31)).unwrap(),
        tax_rate: TaxRate::new(825).unwrap(),
        notes: None,
        items,
    }
}

fn item(description: &str, unit_price: i64) -> NewInvoiceItem {
    NewInvoiceItem {
        work_order_id: None,
        description: Description::new(description).unwrap(),
        quantity: Quantity::new(1).unwrap(),
        unit_price: Cents::new(unit_price).unwrap(),
    }
}

fn complete(
    repo: &pushkind_pool::repository::DieselRepository,
    organization_id: pushkind_pool::domain::types::OrganizationId,
    visit: &pushkind_pool::domain::work_order::WorkOrder,
) -> pushkind_pool::domain::work_order::WorkOrder {
    let transition =
        WorkOrderTransition::plan(visit, WorkOrderStatus::Completed, Utc::now().naive_utc())
            .unwrap();
    repo.transition_work_order(visit.id, organization_id, &transition)
        .unwrap()
        .0
}

fn billing(visit: &pushkind_pool::domain::work_order::WorkOrder) -> NewInvoiceItem {
    NewInvoiceItem {
        work_order_id: Some(visit.id),
        ..item("Weekly service", 8500)
    }
}

#[test]
fn test_registration_creates_admin() {
    let test_db = common::TestDb::new("test_registration_creates_admin.db");
    let repo = test_db.repo();

    let (org_id, admin) = organization(&repo, "Blue Water", "owner@bluewater.test");

    assert_eq!(admin.organization_id, org_id);
    assert_eq!(admin.role, UserRole::Admin);
    assert!(admin.is_active);

    let found = repo
        .get_user_by_email(&EmailAddress::new("OWNER@bluewater.test").unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(found.id, admin.id);
}

#[test]
fn test_user_emails_are_unique() {
    let test_db = common::TestDb::new("test_user_emails_are_unique.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");

    let duplicate = NewUser::new(
        org_id,
        EmailAddress::new("owner@bluewater.test").unwrap(),
        PersonName::new("Copy").unwrap(),
        None,
        UserRole::Office,
    );
    assert!(matches!(
        repo.create_user(&duplicate),
        Err(RepositoryError::ConstraintViolation(_))
    ));
}

#[test]
fn test_clients_are_scoped_to_organization() {
    let test_db = common::TestDb::new("test_clients_are_scoped.db");
    let repo = test_db.repo();
    let (first, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let (second, _) = organization(&repo, "Crystal Pools", "owner@crystal.test");

    let alice = common::client(&repo, first, "Alice", Some("alice@example.com"));
    common::client(&repo, second, "Bob", Some("bob@example.com"));

    assert!(repo.get_client_by_id(alice.id, second).unwrap().is_none());
    assert!(repo.get_client_by_id(alice.id, first).unwrap().is_some());

    let (total, items) = repo.list_clients(ClientListQuery::new(second)).unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].name.as_str(), "Bob");

    assert!(matches!(
        repo.delete_client(alice.id, second),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_client_search_and_pagination() {
    let test_db = common::TestDb::new("test_client_search.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");

    for (name, email) in [
        ("Alice Smith", "alice@example.com"),
        ("Bob Jones", "bob@example.com"),
        ("Carol Smith", "carol@example.com"),
    ] {
        common::client(&repo, org_id, name, Some(email));
    }

    let (total, items) = repo
        .list_clients(ClientListQuery::new(org_id).search("smith"))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let (total, page) = repo
        .list_clients(ClientListQuery::new(org_id).paginate(2, 2))
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].name.as_str(), "Carol Smith");
}

#[test]
fn test_work_orders_filter_by_technician() {
    let test_db = common::TestDb::new("test_work_orders_filter.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);

    let technician = repo
        .create_technician(&NewTechnician {
            organization_id: org_id,
            user_id: None,
            name: PersonName::new("Tom").unwrap(),
            email: None,
            phone: None,
            hourly_rate: Cents::new(4500).unwrap(),
        })
        .unwrap();

    common::work_order(&repo, org_id, client.id, Some(technician.id), date(2026, 5, 4));
    common::work_order(&repo, org_id, client.id, None, date(2026, 5, 5));

    let (total, mine) = repo
        .list_work_orders(WorkOrderListQuery::new(org_id).technician(technician.id))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(mine[0].technician_id, Some(technician.id));

    let (total, _) = repo
        .list_work_orders(
            WorkOrderListQuery::new(org_id)
                .scheduled_between(Some(date(2026, 5, 5)), Some(date(2026, 5, 31))),
        )
        .unwrap();
    assert_eq!(total, 1);

    let (assigned, _) = repo
        .list_clients(ClientListQuery::new(org_id).technician(technician.id))
        .unwrap();
    assert_eq!(assigned, 1);
}

#[test]
fn test_completing_recurring_work_order_schedules_next() {
    let test_db = common::TestDb::new("test_recurring_work_order.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let visit = common::work_order(&repo, org_id, client.id, None, date(2026, 5, 4));

    let transition =
        WorkOrderTransition::plan(&visit, WorkOrderStatus::Completed, Utc::now().naive_utc())
            .unwrap();
    let (done, next) = repo
        .transition_work_order(visit.id, org_id, &transition)
        .unwrap();

    assert_eq!(done.status, WorkOrderStatus::Completed);
    assert!(done.completed_at.is_some());
    let next = next.expect("follow-up visit");
    assert_eq!(next.scheduled_on, date(2026, 5, 11));
    assert_eq!(next.status, WorkOrderStatus::Scheduled);

    let (open, _) = repo
        .list_work_orders(WorkOrderListQuery::new(org_id).status(WorkOrderStatus::Scheduled))
        .unwrap();
    assert_eq!(open, 1);
}

#[test]
fn test_invoice_numbers_are_sequential_per_organization() {
    let test_db = common::TestDb::new("test_invoice_numbers.db");
    let repo = test_db.repo();
    let (first, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let (second, _) = organization(&repo, "Crystal Pools", "owner@crystal.test");
    let alice = common::client(&repo, first, "Alice", None);
    let bob = common::client(&repo, second, "Bob", None);

    let one = repo
        .create_invoice(&invoice_for(first, alice.id, vec![item("Filter clean", 12000)]))
        .unwrap();
    let two = repo
        .create_invoice(&invoice_for(first, alice.id, vec![item("Acid wash", 30000)]))
        .unwrap();
    let other = repo
        .create_invoice(&invoice_for(second, bob.id, vec![item("Opening", 20000)]))
        .unwrap();

    assert_eq!(one.number.as_str(), "INV-00001");
    assert_eq!(two.number.as_str(), "INV-00002");
    assert_eq!(other.number.as_str(), "INV-00001");
    assert_eq!(one.status, InvoiceStatus::Draft);
    assert_eq!(one.items.len(), 1);
}

#[test]
fn test_invoice_links_and_releases_work_orders() {
    let test_db = common::TestDb::new("test_invoice_links.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let visit = common::work_order(&repo, org_id, client.id, None, date(2026, 5, 4));
    let visit = complete(&repo, org_id, &visit);

    let invoice = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)]))
        .unwrap();

    let linked = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(linked.invoice_id, Some(invoice.id));

    assert!(matches!(
        repo.delete_client(client.id, org_id),
        Err(RepositoryError::ConstraintViolation(_))
    ));

    repo.delete_invoice(invoice.id, org_id).unwrap();
    let released = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(released.invoice_id, None);
    assert!(repo.get_invoice_by_id(invoice.id, org_id).unwrap().is_none());
}

#[test]
fn test_overdue_invoices_and_dashboard() {
    let test_db = common::TestDb::new("test_overdue_invoices.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);

    let invoice = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![item("Repair", 10000)]))
        .unwrap();
    repo.update_invoice_status(invoice.id, org_id, InvoiceStatus::Sent, None)
        .unwrap();

    let (overdue, _) = repo
        .list_invoices(InvoiceListQuery::new(org_id).overdue_on(date(2026, 6, 15)))
        .unwrap();
    assert_eq!(overdue, 1);
    let (not_yet, _) = repo
        .list_invoices(InvoiceListQuery::new(org_id).overdue_on(date(2026, 5, 15)))
        .unwrap();
    assert_eq!(not_yet, 0);

    let stats = repo.dashboard_stats(org_id, date(2026, 6, 15)).unwrap();
    assert_eq!(stats.clients, 1);
    assert_eq!(stats.overdue_invoices, 1);
    // 100.00 plus 8.25% tax
    assert_eq!(stats.outstanding.get(), 10825);
}

#[test]
fn test_single_default_provider_per_channel() {
    let test_db = common::TestDb::new("test_default_provider.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");

    let provider = |kind: ProviderKind, name: &str| NewCommunicationProvider {
        organization_id: org_id,
        kind,
        name: ProviderName::new(name).unwrap(),
        sender: NonEmptyString::new("office@bluewater.test").unwrap(),
        api_key: Some("SG.secret-key-1234".to_string()),
        settings: json!({}),
        is_default: true,
    };

    let smtp = repo.create_provider(&provider(ProviderKind::Smtp, "Mail")).unwrap();
    let twilio = repo
        .create_provider(&provider(ProviderKind::Twilio, "Texts"))
        .unwrap();
    let sendgrid = repo
        .create_provider(&provider(ProviderKind::Sendgrid, "Bulk mail"))
        .unwrap();

    let smtp = repo.get_provider_by_id(smtp.id, org_id).unwrap().unwrap();
    let twilio = repo.get_provider_by_id(twilio.id, org_id).unwrap().unwrap();
    assert!(!smtp.is_default);
    assert!(twilio.is_default);
    assert!(sendgrid.is_default);
    assert_eq!(sendgrid.api_key.as_deref(), Some("SG.secret-key-1234"));

    assert_eq!(repo.list_providers(org_id).unwrap().len(), 3);
}

#[test]
fn test_merge_clients_repoints_work_orders() {
    let test_db = common::TestDb::new("test_merge_clients.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");

    let keep = common::client(&repo, org_id, "Alice", Some("alice@example.com"));
    let duplicate = common::client(&repo, org_id, "Alice S.", Some("alice@example.com"));
    let visit = common::work_order(&repo, org_id, duplicate.id, None, date(2026, 5, 4));

    let merge = pushkind_pool::domain::client::ClientMerge {
        organization_id: org_id,
        email: EmailAddress::new("alice@example.com").unwrap(),
        keep: keep.id,
        duplicates: vec![duplicate.id],
    };
    assert_eq!(repo.merge_clients(&merge).unwrap(), 1);

    assert!(repo.get_client_by_id(duplicate.id, org_id).unwrap().is_none());
    let moved = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(moved.client_id, keep.id);
}

#[test]
fn test_stale_transition_is_rejected() {
    let test_db = common::TestDb::new("test_stale_transition.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let visit = common::work_order(&repo, org_id, client.id, None, date(2026, 5, 4));

    let transition =
        WorkOrderTransition::plan(&visit, WorkOrderStatus::Completed, Utc::now().naive_utc())
            .unwrap();
    repo.transition_work_order(visit.id, org_id, &transition)
        .unwrap();

    // A second request planned from the same scheduled snapshot.
    assert!(matches!(
        repo.transition_work_order(visit.id, org_id, &transition),
        Err(RepositoryError::ConstraintViolation(_))
    ));

    let (total, _) = repo
        .list_work_orders(WorkOrderListQuery::new(org_id))
        .unwrap();
    assert_eq!(total, 2);

    let (other_org, _) = organization(&repo, "Crystal Pools", "owner@crystal.test");
    assert!(matches!(
        repo.transition_work_order(visit.id, other_org, &transition),
        Err(RepositoryError::NotFound)
    ));
}

#[test]
fn test_cross_tenant_delete_of_invoiced_client_is_not_found() {
    let test_db = common::TestDb::new("test_cross_tenant_delete.db");
    let repo = test_db.repo();
    let (first, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let (second, _) = organization(&repo, "Crystal Pools", "owner@crystal.test");
    let alice = common::client(&repo, first, "Alice", None);
    repo.create_invoice(&invoice_for(first, alice.id, vec![item("Opening", 20000)]))
        .unwrap();

    assert!(matches!(
        repo.delete_client(alice.id, second),
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        repo.delete_client(alice.id, first),
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(repo.get_client_by_id(alice.id, first).unwrap().is_some());
}

#[test]
fn test_huge_page_number_returns_empty_page() {
    let test_db = common::TestDb::new("test_huge_page.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    common::client(&repo, org_id, "Alice", None);

    let (total, items) = repo
        .list_clients(ClientListQuery::new(org_id).paginate(usize::MAX, 20))
        .unwrap();
    assert_eq!(total, 1);
    assert!(items.is_empty());
}

#[test]
fn test_client_search_treats_wildcards_literally() {
    let test_db = common::TestDb::new("test_search_wildcards.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    common::client(&repo, org_id, "50% Off Pools", None);
    common::client(&repo, org_id, "5000 Gallon Club", None);
    common::client(&repo, org_id, "Spa_Works", None);
    common::client(&repo, org_id, "Spa Works", None);

    let (total, items) = repo
        .list_clients(ClientListQuery::new(org_id).search("50%"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].name.as_str(), "50% Off Pools");

    let (total, items) = repo
        .list_clients(ClientListQuery::new(org_id).search("spa_"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].name.as_str(), "Spa_Works");
}

#[test]
fn test_void_invoice_releases_work_orders() {
    let test_db = common::TestDb::new("test_void_releases.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let visit = common::work_order(&repo, org_id, client.id, None, date(2026, 5, 4));
    let visit = complete(&repo, org_id, &visit);

    let invoice = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)]))
        .unwrap();
    repo.update_invoice_status(invoice.id, org_id, InvoiceStatus::Sent, None)
        .unwrap();
    let voided = repo
        .update_invoice_status(invoice.id, org_id, InvoiceStatus::Void, None)
        .unwrap();
    assert_eq!(voided.status, InvoiceStatus::Void);

    let released = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(released.invoice_id, None);

    let rebilled = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)]))
        .unwrap();
    let linked = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(linked.invoice_id, Some(rebilled.id));
}

#[test]
fn test_work_order_is_billed_at_most_once() {
    let test_db = common::TestDb::new("test_billed_once.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let visit = common::work_order(&repo, org_id, client.id, None, date(2026, 5, 4));

    // Not completed yet.
    assert!(matches!(
        repo.create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)])),
        Err(RepositoryError::ConstraintViolation(_))
    ));

    let visit = complete(&repo, org_id, &visit);
    let first = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)]))
        .unwrap();
    assert!(matches!(
        repo.create_invoice(&invoice_for(org_id, client.id, vec![billing(&visit)])),
        Err(RepositoryError::ConstraintViolation(_))
    ));

    let (invoices, _) = repo.list_invoices(InvoiceListQuery::new(org_id)).unwrap();
    assert_eq!(invoices, 1);
    let linked = repo.get_work_order_by_id(visit.id, org_id).unwrap().unwrap();
    assert_eq!(linked.invoice_id, Some(first.id));
}

#[test]
fn test_invoice_writes_require_the_expected_status() {
    let test_db = common::TestDb::new("test_invoice_status_guard.db");
    let repo = test_db.repo();
    let (org_id, _) = organization(&repo, "Blue Water", "owner@bluewater.test");
    let (other_org, _) = organization(&repo, "Crystal Pools", "owner@crystal.test");
    let client = common::client(&repo, org_id, "Alice", None);
    let invoice = repo
        .create_invoice(&invoice_for(org_id, client.id, vec![item("Repair", 10000)]))
        .unwrap();

    assert!(matches!(
        repo.update_invoice_status(invoice.id, org_id, InvoiceStatus::Paid, None),
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(matches!(
        repo.update_invoice_status(invoice.id, other_org, InvoiceStatus::Sent, None),
        Err(RepositoryError::NotFound)
    ));

    repo.update_invoice_status(invoice.id, org_id, InvoiceStatus::Sent, None)
        .unwrap();
    assert!(matches!(
        repo.update_invoice_status(invoice.id, org_id, InvoiceStatus::Sent, None),
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(matches!(
        repo.replace_invoice_items(invoice.id, org_id, &[item("Other", 500)]),
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(matches!(
        repo.delete_invoice(invoice.id, org_id),
        Err(RepositoryError::ConstraintViolation(_))
    ));

    let stored = repo.get_invoice_by_id(invoice.id, org_id).unwrap().unwrap();
    assert_eq!(stored.status, InvoiceStatus::Sent);
    assert_eq!(stored.items.len(), 1);
}
