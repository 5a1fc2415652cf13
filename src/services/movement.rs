use crate::{
    error::{AppError, Result},
    models::movement::{HistoryBody, HistoryQuery, Movement, MovementQuery, PageCursor, Pagination},
    state::AppState,
    validation::dates::{DateBound, parse_datetime},
};

/// Largest page a caller may request.
pub const MAX_LIMIT: i64 = 100;
/// Largest number of `|`-separated aliases in a `COLLECTION_ALIAS` filter.
pub const MAX_ALIASES: usize = 25;

/// Role every movement of this merchant has.
const MERCHANT_ROLE: &str = "CREDIT";

/// Checks the page size and filters of a history request.
///
/// Returns whether the `ROLE` filter, if any, can match this merchant's
/// movements.
fn check_filters(query: &HistoryQuery, pagination: &Pagination) -> Result<bool> {
    if !(1..=MAX_LIMIT).contains(&pagination.limit) {
        return Err(AppError::LimitOutOfRange(pagination.limit));
    }

    let mut role_matches = true;
    for filter in &query.filter {
        match filter.id.as_str() {
            "ROLE" => {
                role_matches &= filter.value.eq_ignore_ascii_case(MERCHANT_ROLE);
            }
            "COLLECTION_ALIAS" => {
                let aliases = filter.value.split('|').count();
                if aliases > MAX_ALIASES {
                    return Err(AppError::TooManyAliases(aliases));
                }
            }
            other => tracing::debug!("Ignoring unknown history filter: {}", other),
        }
    }

    Ok(role_matches)
}

/// Lists movements for a history request.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `query` - The `body` of the history request.
///
/// # Returns
///
/// A `Result` containing the page, or `None` when nothing matched.
pub async fn history(state: &AppState, query: HistoryQuery) -> Result<Option<HistoryBody>> {
    let pagination = query
        .pagination
        .clone()
        .ok_or_else(|| AppError::InvalidBody("body.pagination is required".to_string()))?;

    if !check_filters(&query, &pagination)? {
        return Ok(None);
    }

    let from = parse_datetime(&pagination.start_date, DateBound::Start)
        .ok_or_else(|| AppError::InvalidBody("pagination.start_date is not a date".to_string()))?;
    let to = parse_datetime(&pagination.end_date, DateBound::End)
        .ok_or_else(|| AppError::InvalidBody("pagination.end_date is not a date".to_string()))?;
    let after = pagination
        .token
        .as_deref()
        .map(PageCursor::decode)
        .transpose()?;

    let payments = state
        .payments
        .list_movements(&MovementQuery {
            from,
            to,
            after,
            limit: pagination.limit,
        })
        .await?;

    let Some(last) = payments.last() else {
        return Ok(None);
    };

    let has_next_page = payments.len() as i64 == pagination.limit;
    let token = if has_next_page {
        Some(PageCursor::after(last).encode()?)
    } else {
        None
    };

    tracing::debug!(
        "📄 History page: {} movements (next page: {})",
        payments.len(),
        has_next_page
    );

    Ok(Some(HistoryBody {
        pagination: Pagination {
            has_next_page: Some(has_next_page),
            token,
            ..pagination
        },
        transactions: payments.iter().map(Movement::from).collect(),
    }))
}

/// The movement view of a single transaction.
pub async fn detail(state: &AppState, transaction_id: &str) -> Result<Option<Movement>> {
    let payment = state.payments.find_by_reference(transaction_id).await?;
    Ok(payment.as_ref().map(Movement::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::movement::Filter;

    fn query(limit: i64, filter: Vec<Filter>) -> (HistoryQuery, Pagination) {
        let pagination = Pagination {
            start_date: "2025-01-01".to_string(),
            end_date: "2025-01-31".to_string(),
            payment_date: None,
            merchant_date: None,
            has_next_page: None,
            limit,
            token: None,
        };
        (
            HistoryQuery {
                pagination: Some(pagination.clone()),
                filter,
            },
            pagination,
        )
    }

    fn filter(id: &str, value: &str) -> Filter {
        Filter {
            id: id.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn limit_bounds_are_inclusive() {
        for limit in [1, 50, 100] {
            let (q, p) = query(limit, vec![]);
            assert!(check_filters(&q, &p).unwrap());
        }
        for limit in [0, -1, 101] {
            let (q, p) = query(limit, vec![]);
            assert!(matches!(check_filters(&q, &p), Err(AppError::LimitOutOfRange(_))));
        }
    }

    #[test]
    fn twenty_five_aliases_are_allowed() {
        let aliases = vec!["a"; 25].join("|");
        let (q, p) = query(10, vec![filter("COLLECTION_ALIAS", &aliases)]);
        assert!(check_filters(&q, &p).is_ok());

        let aliases = vec!["a"; 26].join("|");
        let (q, p) = query(10, vec![filter("COLLECTION_ALIAS", &aliases)]);
        assert!(matches!(check_filters(&q, &p), Err(AppError::TooManyAliases(26))));
    }

    #[test]
    fn debit_role_filter_matches_nothing() {
        let (q, p) = query(10, vec![filter("ROLE", "DEBIT")]);
        assert!(!check_filters(&q, &p).unwrap());

        let (q, p) = query(10, vec![filter("ROLE", "credit")]);
        assert!(check_filters(&q, &p).unwrap());
    }
}
