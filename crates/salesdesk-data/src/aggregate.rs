//! Group-by aggregation over categorical dimensions

use crate::record::Record;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Categorical axis a record can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Customer,
    ProductLine,
    Country,
    Territory,
    City,
    State,
    Status,
    DealSize,
    Year,
    Quarter,
    /// Calendar month as `YYYY-MM`
    Month,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Customer => "customer",
            Dimension::ProductLine => "product line",
            Dimension::Country => "country",
            Dimension::Territory => "territory",
            Dimension::City => "city",
            Dimension::State => "state",
            Dimension::Status => "status",
            Dimension::DealSize => "deal size",
            Dimension::Year => "year",
            Dimension::Quarter => "quarter",
            Dimension::Month => "month",
        }
    }

    pub fn key_of(&self, record: &Record) -> String {
        match self {
            Dimension::Customer => record.customer.clone(),
            Dimension::ProductLine => record.product_line.clone(),
            Dimension::Country => record.country.clone(),
            Dimension::Territory => record.territory.clone(),
            Dimension::City => record.city.clone(),
            Dimension::State => record.state.clone(),
            Dimension::Status => record.status.clone(),
            Dimension::DealSize => record.deal_size.clone(),
            Dimension::Year => record.year().to_string(),
            Dimension::Quarter => format!("{}-Q{}", record.year(), record.quarter()),
            Dimension::Month => record.order_date.format("%Y-%m").to_string(),
        }
    }
}

/// Numeric quantity being aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Sales,
    Quantity,
    UnitPrice,
    /// One per order line; only meaningful with [`AggOp::Count`] or `Sum`
    Lines,
}

impl Metric {
    fn value_of(&self, record: &Record) -> f64 {
        match self {
            Metric::Sales => record.sales,
            Metric::Quantity => record.quantity as f64,
            Metric::UnitPrice => record.unit_price,
            Metric::Lines => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggOp {
    Sum,
    Count,
    Mean,
}

/// Composite group key, one component per grouped dimension
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey(pub Vec<String>);

impl GroupKey {
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

/// Aggregated groups in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub dimensions: Vec<Dimension>,
    pub groups: Vec<(GroupKey, f64)>,
}

impl Aggregation {
    pub(crate) fn compute(
        records: &[Record],
        group_by: &[Dimension],
        metric: Metric,
        op: AggOp,
    ) -> Self {
        let mut order: Vec<GroupKey> = Vec::new();
        let mut acc: HashMap<GroupKey, (f64, usize)> = HashMap::new();

        for record in records {
            let key = GroupKey(group_by.iter().map(|d| d.key_of(record)).collect());
            let slot = acc.entry(key.clone()).or_insert_with(|| {
                order.push(key);
                (0.0, 0)
            });
            slot.0 += metric.value_of(record);
            slot.1 += 1;
        }

        let groups = order
            .into_iter()
            .map(|key| {
                let (sum, count) = acc[&key];
                let value = match op {
                    AggOp::Sum => sum,
                    AggOp::Count => count as f64,
                    AggOp::Mean => sum / count as f64,
                };
                (key, value)
            })
            .collect();

        Self {
            dimensions: group_by.to_vec(),
            groups,
        }
    }

    pub(crate) fn distinct(records: &[Record], group_by: &[Dimension], of: Dimension) -> Self {
        let mut order: Vec<GroupKey> = Vec::new();
        let mut seen: HashMap<GroupKey, HashSet<String>> = HashMap::new();

        for record in records {
            let key = GroupKey(group_by.iter().map(|d| d.key_of(record)).collect());
            seen.entry(key.clone())
                .or_insert_with(|| {
                    order.push(key);
                    HashSet::new()
                })
                .insert(of.key_of(record));
        }

        let groups = order
            .into_iter()
            .map(|key| {
                let n = seen[&key].len() as f64;
                (key, n)
            })
            .collect();

        Self {
            dimensions: group_by.to_vec(),
            groups,
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Value for a single-dimension group
    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups
            .iter()
            .find(|(k, _)| k.0.len() == 1 && k.0[0] == key)
            .map(|(_, v)| *v)
    }

    /// Value for a composite group
    pub fn get_parts(&self, parts: &[&str]) -> Option<f64> {
        self.groups
            .iter()
            .find(|(k, _)| k.0.iter().map(String::as_str).eq(parts.iter().copied()))
            .map(|(_, v)| *v)
    }

    /// Highest `k` groups by value; equal values keep first-seen order
    pub fn top_k(&self, k: usize) -> Vec<(GroupKey, f64)> {
        let mut ranked = self.groups.clone();
        // sort_by is stable, so ties stay in first-seen order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// Groups ordered by key, for calendar dimensions
    pub fn sorted_by_key(&self) -> Vec<(GroupKey, f64)> {
        let mut sorted = self.groups.clone();
        sorted.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));
        sorted
    }
}
