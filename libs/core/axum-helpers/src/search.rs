//! Dynamic list-endpoint scopes: per-entity field filters, sort allow-listing
//! and pagination clamping.
//!
//! Each entity declares its filterable fields as `(column, comparison)` pairs
//! instead of deriving them from struct reflection, so the generated SQL only
//! ever references declared columns.

use sea_orm::sea_query::{Alias, Condition, Expr, ExprTrait, Order};
use sea_orm::{EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select};
use serde::Deserialize;

/// Sort request: `{"field": "name", "order": "asc"}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SortColumn {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub order: String,
}

/// How one filter field compares against its column.
///
/// The legacy sentinel rules are preserved: integer ids only apply when
/// positive, string values only when non-empty and not the literal `"0"`.
#[derive(Clone, Debug)]
pub enum Comparison {
    /// `column = value`, skipped unless value > 0.
    Id(i32),
    /// `LOWER(CAST(column AS TEXT)) LIKE '%value%'`, case-insensitive.
    Text(String),
    /// `column >= value`, for range-start date filters.
    Date(String),
    /// `column = (value == "true")`, for boolean flags sent as strings.
    Flag(String),
}

/// One declared filter field of an entity.
pub struct FieldFilter {
    pub column: &'static str,
    pub cmp: Comparison,
}

/// Implemented by each entity's filter DTO.
pub trait TableSearch {
    /// The filters to apply for this request.
    fn filters(&self) -> Vec<FieldFilter>;

    /// Columns a client may sort by. Anything else falls back to the default
    /// `created_at DESC` ordering.
    fn sortable_columns() -> &'static [&'static str];
}

/// Apply the declared filters and the requested sort to a select.
pub fn table_search<E, F>(query: Select<E>, filter: &F, sort: &SortColumn) -> Select<E>
where
    E: EntityTrait,
    F: TableSearch,
{
    let mut condition = Condition::all();

    for field in filter.filters() {
        match field.cmp {
            Comparison::Id(value) => {
                if value > 0 {
                    condition = condition.add(Expr::col(Alias::new(field.column)).eq(value));
                }
            }
            Comparison::Text(ref value) => {
                if !value.is_empty() && value != "0" {
                    let pattern = format!("%{}%", value.to_lowercase());
                    condition = condition.add(Expr::cust_with_values(
                        format!("LOWER(CAST({} AS TEXT)) LIKE $1", field.column),
                        [pattern],
                    ));
                }
            }
            Comparison::Date(ref value) => {
                if !value.is_empty() && value != "0" {
                    condition =
                        condition.add(Expr::col(Alias::new(field.column)).gte(value.clone()));
                }
            }
            Comparison::Flag(ref value) => {
                if !value.is_empty() && value != "0" {
                    condition =
                        condition.add(Expr::col(Alias::new(field.column)).eq(value == "true"));
                }
            }
        }
    }

    // An empty Condition renders as `WHERE TRUE`; skip it to keep the
    // no-filter SQL free of a WHERE clause.
    let query = if condition.is_empty() {
        query
    } else {
        query.filter(condition)
    };

    let order = if sort.order.eq_ignore_ascii_case("asc") {
        Order::Asc
    } else {
        Order::Desc
    };

    if !sort.field.is_empty() && F::sortable_columns().contains(&sort.field.as_str()) {
        query.order_by(Expr::cust(sort.field.clone()), order)
    } else {
        query.order_by(Expr::cust("created_at"), Order::Desc)
    }
}

/// Normalize page/size into an (offset, limit) window.
///
/// Page defaults to 1, size to 10, and size is capped at 100.
pub fn page_window(page: i64, size: i64) -> (u64, u64) {
    let page = if page <= 0 { 1 } else { page };
    let size = match size {
        s if s <= 0 => 10,
        s if s > 100 => 100,
        s => s,
    };
    (((page - 1) * size) as u64, size as u64)
}

/// Apply pagination to a select.
pub fn paginate<E: EntityTrait>(query: Select<E>, page: i64, size: i64) -> Select<E> {
    let (offset, limit) = page_window(page, size);
    query.offset(offset).limit(limit)
}

/// Request body of every `POST /<entity>/list` endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams<F> {
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub sort: SortColumn,
    #[serde(default)]
    pub filter: F,
}

/// Request body of bulk delete endpoints.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    mod country {
        use sea_orm::entity::prelude::*;

        #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
        #[sea_orm(table_name = "ref_country")]
        pub struct Model {
            #[sea_orm(primary_key)]
            pub id: i32,
            pub name: String,
            pub code: String,
            pub is_active: bool,
            pub created_at: DateTimeWithTimeZone,
        }

        #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
        pub enum Relation {}

        impl ActiveModelBehavior for ActiveModel {}
    }

    #[derive(Default)]
    struct CountryFilter {
        id: i32,
        name: String,
        is_active: String,
        created_at: String,
    }

    impl TableSearch for CountryFilter {
        fn filters(&self) -> Vec<FieldFilter> {
            vec![
                FieldFilter {
                    column: "id",
                    cmp: Comparison::Id(self.id),
                },
                FieldFilter {
                    column: "name",
                    cmp: Comparison::Text(self.name.clone()),
                },
                FieldFilter {
                    column: "is_active",
                    cmp: Comparison::Flag(self.is_active.clone()),
                },
                FieldFilter {
                    column: "created_at",
                    cmp: Comparison::Date(self.created_at.clone()),
                },
            ]
        }

        fn sortable_columns() -> &'static [&'static str] {
            &["id", "name", "code", "created_at"]
        }
    }

    fn build(filter: &CountryFilter, sort: &SortColumn) -> String {
        table_search(country::Entity::find(), filter, sort)
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn empty_filter_only_orders_by_created_at() {
        let sql = build(&CountryFilter::default(), &SortColumn::default());
        assert!(!sql.contains("WHERE"), "unexpected WHERE in: {sql}");
        assert!(sql.contains("ORDER BY created_at DESC"));
    }

    #[test]
    fn text_filter_lowercases_and_wraps_in_wildcards() {
        let filter = CountryFilter {
            name: "MONGO".to_string(),
            ..Default::default()
        };
        let sql = build(&filter, &SortColumn::default());
        assert!(sql.contains("LOWER(CAST(name AS TEXT)) LIKE '%mongo%'"));
    }

    #[test]
    fn zero_string_is_a_no_filter_sentinel() {
        let filter = CountryFilter {
            name: "0".to_string(),
            ..Default::default()
        };
        let sql = build(&filter, &SortColumn::default());
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn id_filter_skipped_unless_positive() {
        let zero = CountryFilter::default();
        assert!(!build(&zero, &SortColumn::default()).contains("\"id\" ="));

        let set = CountryFilter {
            id: 5,
            ..Default::default()
        };
        assert!(build(&set, &SortColumn::default()).contains("\"id\" = 5"));
    }

    #[test]
    fn date_filter_is_range_start() {
        let filter = CountryFilter {
            created_at: "2024-01-01".to_string(),
            ..Default::default()
        };
        let sql = build(&filter, &SortColumn::default());
        assert!(sql.contains("\"created_at\" >= '2024-01-01'"));
    }

    #[test]
    fn flag_filter_compares_boolean() {
        let filter = CountryFilter {
            is_active: "true".to_string(),
            ..Default::default()
        };
        let sql = build(&filter, &SortColumn::default());
        assert!(sql.contains("\"is_active\" = TRUE"));

        let filter = CountryFilter {
            is_active: "false".to_string(),
            ..Default::default()
        };
        let sql = build(&filter, &SortColumn::default());
        assert!(sql.contains("\"is_active\" = FALSE"));
    }

    #[test]
    fn declared_sort_column_is_honored() {
        let sort = SortColumn {
            field: "name".to_string(),
            order: "asc".to_string(),
        };
        let sql = build(&CountryFilter::default(), &sort);
        assert!(sql.contains("ORDER BY name ASC"));
    }

    #[test]
    fn undeclared_sort_column_falls_back_to_default() {
        let sort = SortColumn {
            field: "name; DROP TABLE ref_country".to_string(),
            order: "asc".to_string(),
        };
        let sql = build(&CountryFilter::default(), &sort);
        assert!(sql.contains("ORDER BY created_at DESC"));
        assert!(!sql.contains("DROP TABLE"));
    }

    #[test]
    fn page_window_defaults_and_caps() {
        assert_eq!(page_window(0, 0), (0, 10));
        assert_eq!(page_window(1, 10), (0, 10));
        assert_eq!(page_window(3, 20), (40, 20));
        assert_eq!(page_window(2, 500), (100, 100));
        assert_eq!(page_window(-4, -1), (0, 10));
    }

    #[test]
    fn paginate_applies_offset_and_limit() {
        let sql = paginate(country::Entity::find(), 2, 25)
            .build(DbBackend::Postgres)
            .to_string();
        assert!(sql.contains("LIMIT 25"));
        assert!(sql.contains("OFFSET 25"));
    }
}
