//! Subscription resources and operations.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::client::PartnerCenterClient;
use crate::error::PartnerResult;
use crate::orders::BillingCycle;
use crate::paging::ResourceCollection;

/// Provisioning state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    None,
    Active,
    Suspended,
    Deleted,
}

/// A customer subscription provisioned from an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub offer_name: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub creation_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub effective_start_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub commitment_end_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub auto_renew_enabled: Option<bool>,
    #[serde(default)]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub attributes: Option<serde_json::Value>,
}

impl PartnerCenterClient {
    /// Lists a customer's subscriptions.
    #[instrument(skip(self))]
    pub async fn list_subscriptions(
        &self,
        customer_id: &str,
    ) -> PartnerResult<ResourceCollection<Subscription>> {
        let url = self.build_url(&["customers", customer_id, "subscriptions"])?;
        self.get(&url).await
    }

    /// Fetches a subscription by id.
    #[instrument(skip(self))]
    pub async fn get_subscription(
        &self,
        customer_id: &str,
        subscription_id: &str,
    ) -> PartnerResult<Subscription> {
        let url = self.build_url(&[
            "customers",
            customer_id,
            "subscriptions",
            subscription_id,
        ])?;
        self.get(&url).await
    }

    /// Updates a subscription (quantity changes, suspension, renewal flags).
    ///
    /// The subscription must carry its own id.
    #[instrument(skip(self, subscription))]
    pub async fn update_subscription(
        &self,
        customer_id: &str,
        subscription: &Subscription,
    ) -> PartnerResult<Subscription> {
        let id = subscription
            .id
            .as_deref()
            .ok_or_else(|| {
                crate::error::PartnerError::InvalidArgument(
                    "subscription id must be set for updates".into(),
                )
            })?;
        let url = self.build_url(&["customers", customer_id, "subscriptions", id])?;
        self.patch(&url, subscription).await
    }
}
