//! Company record (tenant boundary).
//!
//! Companies are a foreign key for accounts; the session lifecycle never
//! inspects them beyond scoping queries by company id.

use chrono::{DateTime, Utc};

use crate::id::CompanyId;
use crate::status::CompanyStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    /// Legal form of the organization (e.g. `PRIVATE`, `PUBLIC`).
    pub kind: String,
    /// Kind of tax identifier carried in `tax_id`.
    pub tax_id_kind: String,
    /// Unique tax identifier.
    pub tax_id: String,
    pub full_name: String,
    pub short_name: String,
    pub status: CompanyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompany {
    pub kind: String,
    pub tax_id_kind: String,
    pub tax_id: String,
    pub full_name: String,
    pub short_name: String,
    /// Explicit initial status; defaults to `ActivationPending` when absent.
    pub status: Option<CompanyStatus>,
}

impl Company {
    pub fn new(fields: NewCompany, now: DateTime<Utc>) -> Self {
        Self {
            id: CompanyId::new(),
            kind: fields.kind,
            tax_id_kind: fields.tax_id_kind,
            tax_id: fields.tax_id,
            full_name: fields.full_name,
            short_name: fields.short_name,
            status: fields.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_activation_pending() {
        let company = Company::new(
            NewCompany {
                kind: "PRIVATE".to_string(),
                tax_id_kind: "VAT".to_string(),
                tax_id: "20-27189130-0".to_string(),
                full_name: "Acme Diagnostics Ltd".to_string(),
                short_name: "Acme".to_string(),
                status: None,
            },
            Utc::now(),
        );
        assert_eq!(company.status, CompanyStatus::ActivationPending);
    }
}
