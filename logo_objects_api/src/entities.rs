//! Descriptors for a few Logo Objects resources.
//!
//! Records stay untyped JSON; the field enums give filters, field selection
//! and sorting compile-time checked column names.

use serde_json::Value;

use crate::entity::Entity;
use crate::query::Column;

/// Materials and services (`/api/v1/items`).
pub struct Items;

impl Entity for Items {
    const ENDPOINT: &'static str = "/api/v1/items";
    type Field = ItemField;
    type Record = Value;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemField {
    LogicalRef,
    Code,
    Name,
    CardType,
    GroupCode,
    Active,
}

impl Column for ItemField {
    fn column_name(&self) -> &str {
        match self {
            ItemField::LogicalRef => "INTERNAL_REFERENCE",
            ItemField::Code => "CODE",
            ItemField::Name => "NAME",
            ItemField::CardType => "CARD_TYPE",
            ItemField::GroupCode => "GROUP_CODE",
            ItemField::Active => "RECORD_STATUS",
        }
    }
}

/// Customer and supplier accounts (`/api/v1/Arps`).
pub struct Arps;

impl Entity for Arps {
    const ENDPOINT: &'static str = "/api/v1/Arps";
    type Field = ArpField;
    type Record = Value;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArpField {
    LogicalRef,
    Code,
    Title,
    AccountType,
    City,
    TaxNumber,
    Active,
}

impl Column for ArpField {
    fn column_name(&self) -> &str {
        match self {
            ArpField::LogicalRef => "INTERNAL_REFERENCE",
            ArpField::Code => "CODE",
            ArpField::Title => "TITLE",
            ArpField::AccountType => "ACCOUNT_TYPE",
            ArpField::City => "CITY",
            ArpField::TaxNumber => "TAX_ID",
            ArpField::Active => "RECORD_STATUS",
        }
    }
}
