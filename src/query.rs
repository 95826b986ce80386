//! Search, filter, and sort as pure LazyFrame transforms.
//!
//! A [`ViewSpec`] describes the logical view: free-text search across all
//! columns, structured per-column filters (AND-composed), and an optional
//! sort. Application order is fixed: search, then filters, then sort.

use polars::prelude::*;

use crate::error::{ParqError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Contains,
    Gt,
    Lt,
    GtEq,
    LtEq,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Contains => "contains",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::GtEq => ">=",
            FilterOperator::LtEq => "<=",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" | "==" | "equals" => Some(FilterOperator::Eq),
            "contains" => Some(FilterOperator::Contains),
            ">" | "gt" | "greater_than" => Some(FilterOperator::Gt),
            "<" | "lt" | "less_than" => Some(FilterOperator::Lt),
            ">=" | "gte" | "greater_or_equal" => Some(FilterOperator::GtEq),
            "<=" | "lte" | "less_or_equal" => Some(FilterOperator::LtEq),
            _ => None,
        }
    }

    fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Gt | FilterOperator::Lt | FilterOperator::GtEq | FilterOperator::LtEq
        )
    }
}

/// One structured filter condition. Values arrive as strings and are coerced
/// to the column dtype when the expression is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterStatement {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Sort by a single column; `column: None` keeps file order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }
}

/// The logical view over a dataset before pagination.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewSpec {
    pub search: Option<String>,
    pub filters: Vec<FilterStatement>,
    pub sort: SortSpec,
}

impl ViewSpec {
    /// True when the view leaves the dataset untouched (plain pagination).
    pub fn is_identity(&self) -> bool {
        self.search.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.filters.is_empty()
            && self.sort.column.is_none()
    }

    /// Apply search, filters, and sort to a lazy frame. Pure: the input frame
    /// and the view itself are untouched.
    pub fn apply(&self, mut lf: LazyFrame, schema: &Schema) -> Result<LazyFrame> {
        if let Some(term) = self.search.as_deref() {
            if let Some(expr) = search_expr(schema, term) {
                lf = lf.filter(expr);
            }
        }
        if let Some(expr) = filter_expr(schema, &self.filters)? {
            lf = lf.filter(expr);
        }
        Ok(sort_view(lf, schema, &self.sort)?)
    }
}

/// Case-insensitive substring match over the string form of every column,
/// OR-reduced. Whitespace-only terms produce no expression (identity).
/// Binary and nested columns have no sensible string form and are left out
/// of the reduction; a row still matches through its other columns.
pub fn search_expr(schema: &Schema, term: &str) -> Option<Expr> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return None;
    }
    schema
        .iter()
        .filter(|(_, dtype)| has_string_form(dtype))
        .map(|(name, _)| {
            col(name.as_str())
                .cast(DataType::String)
                .str()
                .to_lowercase()
                .str()
                .contains_literal(lit(term.as_str()))
        })
        .reduce(|a, b| a.or(b))
}

/// Dtypes whose values cast cleanly to a string.
fn has_string_form(dtype: &DataType) -> bool {
    !matches!(
        dtype,
        DataType::Binary | DataType::BinaryOffset | DataType::Null
    ) && !dtype.is_nested()
}

/// AND-composed filter expression; `None` when the list is empty.
pub fn filter_expr(schema: &Schema, filters: &[FilterStatement]) -> Result<Option<Expr>> {
    let mut combined: Option<Expr> = None;
    for filter in filters {
        let expr = statement_expr(schema, filter)?;
        combined = Some(match combined {
            Some(current) => current.and(expr),
            None => expr,
        });
    }
    Ok(combined)
}

fn statement_expr(schema: &Schema, filter: &FilterStatement) -> Result<Expr> {
    let dtype = schema
        .get(filter.column.as_str())
        .ok_or_else(|| ParqError::ColumnNotFound {
            column: filter.column.clone(),
        })?;

    if filter.operator.is_ordering() && !is_orderable(dtype) {
        return Err(ParqError::IncompatibleFilter {
            column: filter.column.clone(),
            operator: filter.operator.as_str().to_string(),
            dtype: format!("{}", dtype),
        });
    }

    if filter.operator == FilterOperator::Contains && !has_string_form(dtype) {
        return Err(ParqError::IncompatibleFilter {
            column: filter.column.clone(),
            operator: filter.operator.as_str().to_string(),
            dtype: format!("{}", dtype),
        });
    }

    let col_expr = col(filter.column.as_str());
    if filter.operator == FilterOperator::Contains {
        // Substring match on the string form of any stringifiable dtype.
        return Ok(col_expr
            .cast(DataType::String)
            .str()
            .contains_literal(lit(filter.value.as_str())));
    }

    let (col_expr, val_lit) = coerce_operands(col_expr, dtype, &filter.value);
    Ok(match filter.operator {
        FilterOperator::Eq => col_expr.eq(val_lit),
        FilterOperator::Gt => col_expr.gt(val_lit),
        FilterOperator::Lt => col_expr.lt(val_lit),
        FilterOperator::GtEq => col_expr.gt_eq(val_lit),
        FilterOperator::LtEq => col_expr.lt_eq(val_lit),
        FilterOperator::Contains => unreachable!("handled above"),
    })
}

/// Coerce the string value to the column dtype where a parse succeeds;
/// otherwise both sides compare as strings. Temporal and other non-primitive
/// orderable columns compare through their string form, which is consistent
/// for the default ISO rendering.
fn coerce_operands(col_expr: Expr, dtype: &DataType, value: &str) -> (Expr, Expr) {
    match dtype {
        DataType::Float32 | DataType::Float64 => match value.parse::<f64>() {
            Ok(v) => (col_expr, lit(v)),
            Err(_) => (col_expr.cast(DataType::String), lit(value)),
        },
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            match value.parse::<i64>() {
                Ok(v) => (col_expr, lit(v)),
                Err(_) => (col_expr.cast(DataType::String), lit(value)),
            }
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            match value.parse::<u64>() {
                Ok(v) => (col_expr, lit(v)),
                Err(_) => (col_expr.cast(DataType::String), lit(value)),
            }
        }
        DataType::Boolean => match value.parse::<bool>() {
            Ok(v) => (col_expr, lit(v)),
            Err(_) => (col_expr.cast(DataType::String), lit(value)),
        },
        DataType::String => (col_expr, lit(value)),
        _ => (col_expr.cast(DataType::String), lit(value)),
    }
}

/// Dtypes that support ordering comparisons.
fn is_orderable(dtype: &DataType) -> bool {
    dtype.is_numeric()
        || dtype.is_temporal()
        || matches!(dtype, DataType::String | DataType::Categorical(..))
}

/// Stable sort with nulls last in both directions. `column: None` is identity.
pub fn sort_view(lf: LazyFrame, schema: &Schema, sort: &SortSpec) -> Result<LazyFrame> {
    let Some(name) = sort.column.as_deref() else {
        return Ok(lf);
    };
    if schema.get(name).is_none() {
        return Err(ParqError::ColumnNotFound {
            column: name.to_string(),
        });
    }
    let options = SortMultipleOptions {
        descending: vec![sort.direction == SortDirection::Descending],
        nulls_last: vec![true],
        maintain_order: true,
        ..Default::default()
    };
    Ok(lf.sort_by_exprs(vec![col(name)], options))
}
