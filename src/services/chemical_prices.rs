use crate::domain::auth::{AuthenticatedUser, SERVICE_OFFICE_ROLE};
use crate::domain::chemical_price::{BestPrice, ChemicalPrice, best_prices};
use crate::domain::types::{ChemicalPriceId, VendorId};
use crate::dto::chemical_prices::ChemicalPricesQuery;
use crate::forms::chemical_prices::ChemicalPriceForm;
use crate::repository::{
    ChemicalPriceListQuery, ChemicalPriceReader, ChemicalPriceWriter, VendorReader,
};
use crate::services::{ServiceError, ServiceResult, ensure_role, organization_of, today};

fn list_query(
    user: &AuthenticatedUser,
    params: ChemicalPricesQuery,
) -> ServiceResult<ChemicalPriceListQuery> {
    let mut query = ChemicalPriceListQuery::new(organization_of(user)?);
    if let Some(vendor_id) = params.vendor_id {
        query = query.vendor(VendorId::new(vendor_id)?);
    }
    if let Some(chemical) = params
        .chemical
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
    {
        query = query.chemical(chemical);
    }
    Ok(query)
}

pub fn list_chemical_prices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ChemicalPricesQuery,
) -> ServiceResult<Vec<ChemicalPrice>>
where
    R: ChemicalPriceReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    repo.list_chemical_prices(list_query(user, params)?)
        .map_err(|err| {
            log::error!("Failed to list chemical prices: {err}");
            err.into()
        })
}

/// Cheapest current quote per chemical and unit, honoring the same filters
/// as the list.
pub fn best_chemical_prices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ChemicalPricesQuery,
) -> ServiceResult<Vec<BestPrice>>
where
    R: ChemicalPriceReader + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let prices = repo.list_chemical_prices(list_query(user, params)?)?;
    Ok(best_prices(&prices, today()))
}

pub fn create_chemical_price<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ChemicalPriceForm,
) -> ServiceResult<ChemicalPrice>
where
    R: VendorReader + ChemicalPriceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let organization_id = organization_of(user)?;
    let new_price = form.into_new_price(organization_id)?;
    if repo
        .get_vendor_by_id(new_price.vendor_id, organization_id)?
        .is_none()
    {
        return Err(ServiceError::Form(format!(
            "unknown vendor {}",
            new_price.vendor_id
        )));
    }

    repo.create_chemical_price(&new_price).map_err(|err| {
        log::error!("Failed to record chemical price: {err}");
        err.into()
    })
}

pub fn delete_chemical_price<R>(
    repo: &R,
    user: &AuthenticatedUser,
    price_id: i32,
) -> ServiceResult<()>
where
    R: ChemicalPriceWriter + ?Sized,
{
    ensure_role(user, SERVICE_OFFICE_ROLE)?;

    let price_id = ChemicalPriceId::new(price_id)?;
    repo.delete_chemical_price(price_id, organization_of(user)?)
        .map_err(|err| {
            log::error!("Failed to delete chemical price {price_id}: {err}");
            err.into()
        })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::domain::types::{Cents, ChemicalName, ChemicalUnit};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::*;

    fn quote(id: i32, vendor: i32, price: i64, effective_on: NaiveDate) -> ChemicalPrice {
        ChemicalPrice {
            id: ChemicalPriceId::new(id).unwrap(),
            organization_id: org(),
            vendor_id: VendorId::new(vendor).unwrap(),
            chemical: ChemicalName::new("Liquid chlorine").unwrap(),
            unit: ChemicalUnit::new("gallon").unwrap(),
            price: Cents::new(price).unwrap(),
            effective_on,
            created_at: stamp(),
        }
    }

    #[test]
    fn chemical_filter_is_trimmed() {
        let mut repo = MockRepository::new();
        repo.expect_list_chemical_prices()
            .withf(|query| {
                query.chemical.as_deref() == Some("chlorine")
                    && query.vendor_id.map(|v| v.get()) == Some(2)
            })
            .times(1)
            .returning(|_| Ok(vec![]));

        let params = ChemicalPricesQuery {
            vendor_id: Some(2),
            chemical: Some(" chlorine ".to_string()),
        };
        list_chemical_prices(&repo, &office(), params).expect("listed");
    }

    #[test]
    fn best_prices_skip_future_quotes() {
        let today = today();
        let mut repo = MockRepository::new();
        repo.expect_list_chemical_prices().returning(move |_| {
            Ok(vec![
                quote(1, 1, 650, today - Duration::days(3)),
                quote(2, 2, 520, today - Duration::days(10)),
                quote(3, 3, 100, today + Duration::days(2)),
            ])
        });

        let best = best_chemical_prices(&repo, &office(), ChemicalPricesQuery::default())
            .expect("best prices");

        assert_eq!(best.len(), 1);
        assert_eq!(best[0].vendor_id.get(), 2);
        assert_eq!(best[0].vendors_compared, 2);
    }

    #[test]
    fn price_requires_known_vendor() {
        let mut repo = MockRepository::new();
        repo.expect_get_vendor_by_id().returning(|_, _| Ok(None));
        repo.expect_create_chemical_price().times(0);

        let form = ChemicalPriceForm {
            vendor_id: 9,
            chemical: "Shock".to_string(),
            unit: "bag".to_string(),
            price: 1_299,
            effective_on: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
        };

        assert!(matches!(
            create_chemical_price(&repo, &office(), form),
            Err(ServiceError::Form(_))
        ));
    }
}
