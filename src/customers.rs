//! Customer resources and operations.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::PartnerCenterClient;
use crate::error::PartnerResult;
use crate::paging::ResourceCollection;

/// Postal address on a customer profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Company profile of a customer tenant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Billing profile subset carried on customer documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub culture: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub default_address: Option<Address>,
}

/// A Partner Center customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub company_profile: Option<CompanyProfile>,
    #[serde(default)]
    pub billing_profile: Option<BillingProfile>,
    #[serde(default)]
    pub relationship_to_partner: Option<String>,
    #[serde(default)]
    pub commerce_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Request body for creating a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub company_profile: CompanyProfile,
    pub billing_profile: BillingProfile,
}

impl PartnerCenterClient {
    /// Lists customers of the partner, optionally limiting the page size.
    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        size: Option<u32>,
    ) -> PartnerResult<ResourceCollection<Customer>> {
        let mut url = self.build_url(&["customers"])?;
        if let Some(size) = size {
            url.push_str(&format!("?size={size}"));
        }
        self.get(&url).await
    }

    /// Fetches a customer by tenant id.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, customer_id: &str) -> PartnerResult<Customer> {
        let url = self.build_url(&["customers", customer_id])?;
        self.get(&url).await
    }

    /// Creates a customer in the partner's reseller channel.
    #[instrument(skip(self, request))]
    pub async fn create_customer(
        &self,
        request: &CreateCustomerRequest,
    ) -> PartnerResult<Customer> {
        let url = self.build_url(&["customers"])?;
        self.post(&url, request).await
    }

    /// Deletes a customer (integration sandbox tenants only).
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: &str) -> PartnerResult<()> {
        let url = self.build_url(&["customers", customer_id])?;
        self.delete(&url).await
    }
}
