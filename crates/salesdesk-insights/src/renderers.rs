//! Declarative insight table: key, trigger phrases and renderer

use crate::format::{format_count, format_money};
use chrono::NaiveDate;
use salesdesk_data::{AggOp, Aggregation, Dimension, Metric, Store};

/// Output of a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Full answer returned when the insight is matched
    pub answer: String,
    /// One sentence per group, used as retrieval snippets
    pub facts: Vec<String>,
}

/// One row of the insight table
pub struct InsightSpec {
    pub key: &'static str,
    pub title: &'static str,
    pub triggers: &'static [&'static str],
    pub render: fn(&Store) -> Rendered,
}

const TOP_CUSTOMER_LIMIT: usize = 10;
const NO_DATA: &str = "No sales records are available.";

/// Catalog declaration order; earlier entries win score ties
pub const INSIGHTS: &[InsightSpec] = &[
    InsightSpec {
        key: "top_customer",
        title: "Top customer by sales",
        triggers: &[
            "top customer",
            "best customer",
            "highest sales customer",
            "biggest customer",
            "largest customer",
        ],
        render: render_top_customer,
    },
    InsightSpec {
        key: "top_customers",
        title: "Top 10 customers by sales",
        triggers: &[
            "top customers",
            "best customers",
            "biggest customers",
            "customer ranking",
            "top 10 customers",
        ],
        render: render_top_customers,
    },
    InsightSpec {
        key: "sales_by_product_line",
        title: "Sales by product line",
        triggers: &[
            "sales by product line",
            "product line performance",
            "best product line",
            "top product line",
            "product lines",
        ],
        render: render_product_lines,
    },
    InsightSpec {
        key: "sales_by_year",
        title: "Sales by year",
        triggers: &["sales by year", "yearly sales", "annual sales", "sales per year"],
        render: render_years,
    },
    InsightSpec {
        key: "sales_by_month",
        title: "Sales by month",
        triggers: &["sales by month", "monthly sales", "sales per month", "best month"],
        render: render_months,
    },
    InsightSpec {
        key: "sales_by_country",
        title: "Sales by country",
        triggers: &[
            "sales by country",
            "country sales",
            "sales per country",
            "top countries",
            "geographical sales",
        ],
        render: render_countries,
    },
    InsightSpec {
        key: "sales_by_territory",
        title: "Sales by territory",
        triggers: &[
            "sales by territory",
            "territory sales",
            "sales per territory",
            "territories",
        ],
        render: render_territories,
    },
    InsightSpec {
        key: "order_status_distribution",
        title: "Order status distribution",
        triggers: &[
            "distribution of order statuses",
            "order status distribution",
            "order statuses",
            "order status breakdown",
            "status of orders",
        ],
        render: render_statuses,
    },
    InsightSpec {
        key: "sales_by_deal_size",
        title: "Sales by deal size",
        triggers: &["sales by deal size", "deal size breakdown", "deal sizes", "deal size"],
        render: render_deal_sizes,
    },
];

fn empty() -> Rendered {
    Rendered {
        answer: NO_DATA.to_string(),
        facts: Vec::new(),
    }
}

fn sales_and_lines(store: &Store, dim: Dimension) -> (Aggregation, Aggregation) {
    (
        store.aggregate(&[dim], Metric::Sales, AggOp::Sum),
        store.aggregate(&[dim], Metric::Lines, AggOp::Count),
    )
}

fn lines_of(lines: &Aggregation, key: &str) -> String {
    format_count(lines.get(key).unwrap_or(0.0))
}

fn render_top_customer(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Customer);
    let Some((name, amount)) = sales.top_k(1).into_iter().next() else {
        return empty();
    };
    let name = name.to_string();
    let answer = format!(
        "The top customer by sales is {} with {} across {} order lines.",
        name,
        format_money(amount),
        lines_of(&lines, &name)
    );
    Rendered {
        facts: vec![answer.clone()],
        answer,
    }
}

fn render_top_customers(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Customer);
    let top = sales.top_k(TOP_CUSTOMER_LIMIT);
    if top.is_empty() {
        return empty();
    }

    let mut answer = format!("Top {} customers by sales:", top.len());
    let mut facts = Vec::with_capacity(top.len());
    for (rank, (name, amount)) in top.iter().enumerate() {
        let name = name.to_string();
        answer.push_str(&format!(
            "\n{}. {}: {} ({} order lines)",
            rank + 1,
            name,
            format_money(*amount),
            lines_of(&lines, &name)
        ));
        facts.push(format!(
            "Top customer {} generated {} in total sales",
            name,
            format_money(*amount)
        ));
    }
    Rendered { answer, facts }
}

fn render_product_lines(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::ProductLine);
    let units = store.aggregate(&[Dimension::ProductLine], Metric::Quantity, AggOp::Sum);
    let ranked = sales.top_k(sales.len());
    let Some((best, best_amount)) = ranked.first() else {
        return empty();
    };

    let mut answer = format!(
        "{} is the best performing product line with {} in sales. Sales by product line:",
        best,
        format_money(*best_amount)
    );
    let mut facts = Vec::new();
    for (line, amount) in &ranked {
        let line = line.to_string();
        answer.push_str(&format!(
            "\n- {}: {} ({} order lines, {} units)",
            line,
            format_money(*amount),
            lines_of(&lines, &line),
            format_count(units.get(&line).unwrap_or(0.0))
        ));
        facts.push(format!(
            "Product line {} generated {} in sales from {} order lines",
            line,
            format_money(*amount),
            lines_of(&lines, &line)
        ));
    }
    Rendered { answer, facts }
}

fn render_years(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Year);
    if sales.is_empty() {
        return empty();
    }

    let mut answer = String::from("Sales by year:");
    let mut facts = Vec::new();
    for (year, amount) in sales.sorted_by_key() {
        let year = year.to_string();
        answer.push_str(&format!(
            "\n- {}: {} ({} order lines)",
            year,
            format_money(amount),
            lines_of(&lines, &year)
        ));
        facts.push(format!(
            "In {}, total sales were {}",
            year,
            format_money(amount)
        ));
    }
    Rendered { answer, facts }
}

fn month_label(key: &str) -> String {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d")
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|_| key.to_string())
}

fn render_months(store: &Store) -> Rendered {
    let sales = store.aggregate(&[Dimension::Month], Metric::Sales, AggOp::Sum);
    let Some((best, best_amount)) = sales.top_k(1).into_iter().next() else {
        return empty();
    };

    let mut answer = format!(
        "The best month was {} with {} in sales. Sales by month:",
        month_label(&best.to_string()),
        format_money(best_amount)
    );
    let mut facts = Vec::new();
    for (month, amount) in sales.sorted_by_key() {
        let label = month_label(&month.to_string());
        answer.push_str(&format!("\n- {}: {}", label, format_money(amount)));
        facts.push(format!(
            "In {}, total sales were {}",
            label,
            format_money(amount)
        ));
    }
    Rendered { answer, facts }
}

fn render_countries(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Country);
    let customers = store.distinct_count(&[Dimension::Country], Dimension::Customer);
    let ranked = sales.top_k(sales.len());
    if ranked.is_empty() {
        return empty();
    }

    let mut answer = String::from("Sales by country:");
    let mut facts = Vec::new();
    for (country, amount) in &ranked {
        let country = country.to_string();
        let unique = format_count(customers.get(&country).unwrap_or(0.0));
        answer.push_str(&format!(
            "\n- {}: {} ({} order lines, {} customers)",
            country,
            format_money(*amount),
            lines_of(&lines, &country),
            unique
        ));
        facts.push(format!(
            "Sales in {}: {} from {} customers",
            country,
            format_money(*amount),
            unique
        ));
    }
    Rendered { answer, facts }
}

fn render_territories(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Territory);
    let ranked = sales.top_k(sales.len());
    if ranked.is_empty() {
        return empty();
    }

    let mut answer = String::from("Sales by territory:");
    let mut facts = Vec::new();
    for (territory, amount) in &ranked {
        let territory = territory.to_string();
        answer.push_str(&format!(
            "\n- {}: {} ({} order lines)",
            territory,
            format_money(*amount),
            lines_of(&lines, &territory)
        ));
        facts.push(format!(
            "Sales in the {} territory: {} from {} order lines",
            territory,
            format_money(*amount),
            lines_of(&lines, &territory)
        ));
    }
    Rendered { answer, facts }
}

fn render_statuses(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::Status);
    let ranked = lines.top_k(lines.len());
    if ranked.is_empty() {
        return empty();
    }

    let mut answer = String::from("Order status distribution:");
    let mut facts = Vec::new();
    for (status, count) in &ranked {
        let status = status.to_string();
        let amount = format_money(sales.get(&status).unwrap_or(0.0));
        answer.push_str(&format!(
            "\n- {}: {} order lines ({})",
            status,
            format_count(*count),
            amount
        ));
        facts.push(format!(
            "{} order lines have status {}, worth {}",
            format_count(*count),
            status,
            amount
        ));
    }
    Rendered { answer, facts }
}

fn render_deal_sizes(store: &Store) -> Rendered {
    let (sales, lines) = sales_and_lines(store, Dimension::DealSize);
    let ranked = sales.top_k(sales.len());
    if ranked.is_empty() {
        return empty();
    }

    let mut answer = String::from("Sales by deal size:");
    let mut facts = Vec::new();
    for (size, amount) in &ranked {
        let size = size.to_string();
        answer.push_str(&format!(
            "\n- {}: {} ({} order lines)",
            size,
            format_money(*amount),
            lines_of(&lines, &size)
        ));
        facts.push(format!(
            "{} deals generated {} in sales from {} order lines",
            size,
            format_money(*amount),
            lines_of(&lines, &size)
        ));
    }
    Rendered { answer, facts }
}
