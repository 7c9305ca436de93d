use serde::{Deserialize, Serialize};

/// One day of business figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub revenue: f64,
    pub cost: f64,
    pub customers: u32,
    #[serde(default)]
    pub marketing_cost: f64,
}

impl DailyRecord {
    pub fn new(revenue: f64, cost: f64, customers: u32) -> Self {
        Self {
            revenue,
            cost,
            customers,
            marketing_cost: 0.0,
        }
    }

    pub fn with_marketing_cost(mut self, marketing_cost: f64) -> Self {
        self.marketing_cost = marketing_cost;
        self
    }

    pub fn profit(&self) -> f64 {
        self.revenue - self.cost
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.revenue.is_finite() && self.revenue >= 0.0,
            "revenue must be a non-negative number (got {})",
            self.revenue
        );
        anyhow::ensure!(
            self.cost.is_finite() && self.cost >= 0.0,
            "cost must be a non-negative number (got {})",
            self.cost
        );
        anyhow::ensure!(
            self.marketing_cost.is_finite() && self.marketing_cost >= 0.0,
            "marketing_cost must be a non-negative number (got {})",
            self.marketing_cost
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn marketing_cost_defaults_to_zero() {
        let record: DailyRecord =
            serde_json::from_value(json!({"revenue": 8000, "cost": 5000, "customers": 80})).unwrap();
        assert_eq!(record.marketing_cost, 0.0);
        assert_eq!(record.profit(), 3000.0);
    }

    #[test]
    fn rejects_negative_amounts() {
        assert!(DailyRecord::new(-1.0, 10.0, 1).validate().is_err());
        assert!(DailyRecord::new(1.0, 10.0, 1)
            .with_marketing_cost(-5.0)
            .validate()
            .is_err());
        assert!(DailyRecord::new(0.0, 0.0, 0).validate().is_ok());
    }

    #[test]
    fn rejects_negative_customer_count_via_deserialize() {
        let res = serde_json::from_value::<DailyRecord>(
            json!({"revenue": 1, "cost": 1, "customers": -3}),
        );
        assert!(res.is_err());
    }
}
