//! Order resources and operations.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::PartnerCenterClient;
use crate::error::PartnerResult;
use crate::paging::ResourceCollection;

/// Billing frequency of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Annual,
    Monthly,
    None,
    OneTime,
    Unknown,
}

/// A single line item on an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub line_item_number: i32,
    pub offer_id: String,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub parent_subscription_id: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub partner_id_on_record: Option<String>,
}

/// A Partner Center order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub reference_customer_id: Option<String>,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default = "Vec::new")]
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub creation_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

/// Request body for creating or amending an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub reference_customer_id: Option<String>,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    pub line_items: Vec<OrderLineItem>,
}

impl PartnerCenterClient {
    /// Lists a customer's orders.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        customer_id: &str,
    ) -> PartnerResult<ResourceCollection<Order>> {
        let url = self.build_url(&["customers", customer_id, "orders"])?;
        self.get(&url).await
    }

    /// Fetches an order by id.
    #[instrument(skip(self))]
    pub async fn get_order(&self, customer_id: &str, order_id: &str) -> PartnerResult<Order> {
        let url = self.build_url(&["customers", customer_id, "orders", order_id])?;
        self.get(&url).await
    }

    /// Places a new order for a customer.
    #[instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        customer_id: &str,
        request: &CreateOrderRequest,
    ) -> PartnerResult<Order> {
        let url = self.build_url(&["customers", customer_id, "orders"])?;
        self.post(&url, request).await
    }

    /// Amends an existing order, e.g. to attach add-on line items.
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        customer_id: &str,
        order_id: &str,
        request: &CreateOrderRequest,
    ) -> PartnerResult<Order> {
        let url = self.build_url(&["customers", customer_id, "orders", order_id])?;
        self.patch(&url, request).await
    }
}
