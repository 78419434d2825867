//! Cursor pagination

use crate::error::{Result, TxAsmError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        })
    }
}

impl FromStr for Order {
    type Err = TxAsmError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(TxAsmError::Config(format!("unknown order {:?}", other))),
        }
    }
}

/// Where a page starts, how many records it holds and in which order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: u32,
    pub order: Order,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            cursor: None,
            limit: DEFAULT_PAGE_LIMIT,
            order: Order::Asc,
        }
    }
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Query parameters selecting this page
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(cursor) = &self.cursor {
            params.push(("cursor".to_string(), cursor.clone()));
        }
        params.push(("limit".to_string(), self.limit.to_string()));
        params.push(("order".to_string(), self.order.to_string()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct Embedded<T> {
    records: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

#[derive(Debug, Default, Deserialize)]
struct Links {
    next: Option<Link>,
    prev: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct RawPage<T> {
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
    #[serde(rename = "_links", default)]
    links: Links,
}

/// One page of records plus links to its neighbours
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    next_href: Option<String>,
    prev_href: Option<String>,
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let raw: RawPage<T> = serde_json::from_value(value)?;
        Ok(Self {
            records: raw.embedded.records,
            next_href: raw.links.next.map(|link| link.href),
            prev_href: raw.links.prev.map(|link| link.href),
        })
    }
}

impl<T> Page<T> {
    pub fn next_href(&self) -> Option<&str> {
        self.next_href.as_deref()
    }

    pub fn prev_href(&self) -> Option<&str> {
        self.prev_href.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
