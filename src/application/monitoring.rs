use crate::application::health::HealthEvaluator;
use crate::application::selector::GatewaySelector;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Read-only snapshot for external health endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub healthy_gateways: Vec<String>,
    pub success_rates: BTreeMap<String, f64>,
    pub total_healthy_gateways: usize,
}

impl HealthReport {
    pub async fn collect(selector: &GatewaySelector, evaluator: &HealthEvaluator) -> Result<Self> {
        let healthy_gateways = selector.healthy_gateway_names().await?;
        let success_rates = evaluator.aggregate_success_rates().await?;
        Ok(Self {
            total_healthy_gateways: healthy_gateways.len(),
            healthy_gateways,
            success_rates,
        })
    }
}

/// Per-gateway status row, one per configured gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayStatus {
    pub gateway: String,
    pub enabled: bool,
    pub healthy: bool,
    pub success_rate: f64,
}

impl GatewayStatus {
    pub async fn collect_all(selector: &GatewaySelector) -> Result<Vec<Self>> {
        let evaluator = selector.evaluator();
        let mut statuses = Vec::with_capacity(selector.gateways().len());
        for gateway in selector.gateways() {
            let healthy = evaluator.is_healthy(&gateway.name).await?;
            let window = evaluator.current_window(&gateway.name).await?;
            statuses.push(Self {
                gateway: gateway.name.clone(),
                enabled: gateway.enabled,
                healthy,
                success_rate: window.success_rate,
            });
        }
        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GatewayDescriptor, HealthConfig};
    use crate::domain::clock::ManualClock;
    use crate::infrastructure::in_memory::InMemoryHealthStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_report_reflects_health() {
        let evaluator = Arc::new(HealthEvaluator::new(
            Box::new(InMemoryHealthStore::new()),
            HealthConfig::default(),
            Arc::new(ManualClock::default()),
        ));
        let selector = GatewaySelector::new(
            vec![
                GatewayDescriptor::new("razorpay", 40, true),
                GatewayDescriptor::new("payu", 35, true),
                GatewayDescriptor::new("cashfree", 25, false),
            ],
            evaluator.clone(),
        );

        for _ in 0..5 {
            evaluator.record_outcome("razorpay", false).await.unwrap();
        }
        evaluator.record_outcome("payu", true).await.unwrap();

        let report = HealthReport::collect(&selector, &evaluator).await.unwrap();
        assert_eq!(report.healthy_gateways, ["payu"]);
        assert_eq!(report.total_healthy_gateways, 1);
        assert_eq!(report.success_rates.get("razorpay"), Some(&0.0));
        assert_eq!(report.success_rates.get("payu"), Some(&100.0));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_healthy_gateways"], 1);

        let statuses = GatewayStatus::collect_all(&selector).await.unwrap();
        assert_eq!(statuses.len(), 3);
        assert!(!statuses[0].healthy);
        assert!(statuses[1].healthy);
        assert!(!statuses[2].enabled);
        assert_eq!(statuses[2].success_rate, 100.0);
    }
}
