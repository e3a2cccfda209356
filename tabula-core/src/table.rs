//! Table bindings and their configuration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default row limit for `list` and `page`
pub const DEFAULT_LIST_LIMIT: u64 = 999;
/// Default row limit for `search`
pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// One logical table: its name, key, default projection and sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    primary_key: String,
    fields: Vec<String>,
    order: Option<String>,
    asc: bool,
}

impl Table {
    /// A table keyed on `id`, selecting every column
    pub fn new(name: &str) -> Result<Self> {
        Self::builder(name).build()
    }

    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder {
            config: TableConfig {
                table: name.to_string(),
                ..TableConfig::default()
            },
        }
    }

    pub fn from_config(config: TableConfig) -> Result<Self> {
        let name = format!("{}{}", config.prefix, config.table);
        if config.table.trim().is_empty() {
            return Err(Error::invalid_argument("table name must not be empty"));
        }
        if config.primary.trim().is_empty() {
            return Err(Error::invalid_argument(format!(
                "primary key of table '{name}' must not be empty"
            )));
        }
        Ok(Self {
            name,
            primary_key: config.primary,
            fields: config.fields,
            order: config.order.filter(|o| !o.is_empty()),
            asc: config.asc,
        })
    }

    /// Table name, prefix applied
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Default projection; empty selects every column
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn default_order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    pub fn default_asc(&self) -> bool {
        self.asc
    }
}

/// Serializable table description, suitable for loading from a config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub table: String,
    pub prefix: String,
    pub primary: String,
    pub fields: Vec<String>,
    pub order: Option<String>,
    pub asc: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            prefix: String::new(),
            primary: "id".to_string(),
            fields: Vec::new(),
            order: None,
            asc: true,
        }
    }
}

/// Fluent construction of a [`Table`]
///
/// # Examples
/// ```
/// use tabula_core::Table;
///
/// let table = Table::builder("users")
///     .prefix("app_")
///     .primary_key("uid")
///     .fields(["uid", "name"])
///     .order_by("uid", false)
///     .build()
///     .unwrap();
/// assert_eq!(table.name(), "app_users");
/// ```
#[derive(Debug, Clone)]
pub struct TableBuilder {
    config: TableConfig,
}

impl TableBuilder {
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.config.prefix = prefix.to_string();
        self
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.config.primary = column.to_string();
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn order_by(mut self, column: &str, asc: bool) -> Self {
        self.config.order = Some(column.to_string());
        self.config.asc = asc;
        self
    }

    pub fn build(self) -> Result<Table> {
        Table::from_config(self.config)
    }
}

/// Paging options given as a record; unset fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Option<String>,
    pub asc: Option<bool>,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order(mut self, column: &str, asc: bool) -> Self {
        self.order = Some(column.to_string());
        self.asc = Some(asc);
        self
    }
}

/// Paging for `list`, `search` and `page`, given either positionally or as
/// a [`PageOptions`] record. Resolved once into [`ResolvedPaging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paging {
    Positional {
        limit: u64,
        offset: u64,
        order: Option<String>,
        asc: Option<bool>,
    },
    Options(PageOptions),
}

impl Default for Paging {
    fn default() -> Self {
        Paging::Options(PageOptions::default())
    }
}

/// Paging with every default filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaging {
    pub limit: u64,
    pub offset: u64,
    pub order: Option<String>,
    pub asc: bool,
}

impl Paging {
    pub fn resolve(self, table: &Table, default_limit: u64) -> ResolvedPaging {
        let (limit, offset, order, asc) = match self {
            Paging::Positional {
                limit,
                offset,
                order,
                asc,
            } => (Some(limit), Some(offset), order, asc),
            Paging::Options(options) => (options.limit, options.offset, options.order, options.asc),
        };
        ResolvedPaging {
            limit: limit.unwrap_or(default_limit),
            offset: offset.unwrap_or(0),
            order: order.or_else(|| table.default_order().map(str::to_string)),
            asc: asc.unwrap_or(table.default_asc()),
        }
    }
}

impl From<PageOptions> for Paging {
    fn from(options: PageOptions) -> Self {
        Paging::Options(options)
    }
}

impl From<()> for Paging {
    fn from(_: ()) -> Self {
        Paging::default()
    }
}

/// `(limit, offset)`
impl From<(u64, u64)> for Paging {
    fn from((limit, offset): (u64, u64)) -> Self {
        Paging::Positional {
            limit,
            offset,
            order: None,
            asc: None,
        }
    }
}

/// `(limit, offset, order)`
impl From<(u64, u64, &str)> for Paging {
    fn from((limit, offset, order): (u64, u64, &str)) -> Self {
        Paging::Positional {
            limit,
            offset,
            order: Some(order.to_string()),
            asc: None,
        }
    }
}

/// `(limit, offset, order, asc)`
impl From<(u64, u64, &str, bool)> for Paging {
    fn from((limit, offset, order, asc): (u64, u64, &str, bool)) -> Self {
        Paging::Positional {
            limit,
            offset,
            order: Some(order.to_string()),
            asc: Some(asc),
        }
    }
}
