#![allow(dead_code)]

use salesdesk_core::{Config, Pipeline};
use salesdesk_data::{LoadOptions, Store};
use salesdesk_index::HashEmbedder;
use salesdesk_llm::{LanguageModel, LlmError, Prompt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// TERRITORY distribution; the empty cell is a missing value
pub const TERRITORIES: &[(&str, usize)] = &[("EMEA", 1407), ("", 1074), ("APAC", 221), ("Japan", 121)];

pub const STATUSES: &[(&str, usize)] = &[
    ("Shipped", 2617),
    ("Cancelled", 60),
    ("Resolved", 47),
    ("On Hold", 44),
    ("In Process", 41),
    ("Disputed", 14),
];

const CUSTOMERS: &[&str] = &[
    "Euro Shopping Channel",
    "Mini Gifts Distributors Ltd.",
    "Australian Collectors, Co.",
    "Muscle Machine Inc",
    "La Rochelle Gifts",
];

const PRODUCT_LINES: &[&str] = &["Classic Cars", "Vintage Cars", "Motorcycles", "Planes", "Ships"];

fn expand(groups: &[(&'static str, usize)]) -> Vec<&'static str> {
    groups
        .iter()
        .flat_map(|(value, n)| std::iter::repeat(*value).take(*n))
        .collect()
}

fn country_for(territory: &str, i: usize) -> &'static str {
    match territory {
        "EMEA" => ["France", "Spain", "UK"][i % 3],
        "APAC" => "Australia",
        "Japan" => "Japan",
        _ => "USA",
    }
}

/// 2823 order lines carrying both distributions above
pub fn sample_csv() -> String {
    let territories = expand(TERRITORIES);
    let mut statuses = expand(STATUSES);
    // Decouple status from territory
    statuses.reverse();
    assert_eq!(territories.len(), statuses.len());

    let mut csv = String::from(
        "ORDERNUMBER,QUANTITYORDERED,PRICEEACH,ORDERLINENUMBER,SALES,ORDERDATE,STATUS,PRODUCTLINE,CUSTOMERNAME,COUNTRY,TERRITORY,DEALSIZE\n",
    );
    for (i, (territory, status)) in territories.iter().zip(&statuses).enumerate() {
        let quantity = 20 + i % 30;
        let price = 50.0 + (i % 50) as f64;
        let sales = quantity as f64 * price;
        let deal = if sales < 3000.0 {
            "Small"
        } else if sales < 7000.0 {
            "Medium"
        } else {
            "Large"
        };
        let year = 2003 + i % 3;
        let month = 1 + i % 12;
        let day = 1 + i % 28;
        csv.push_str(&format!(
            "{},{},{:.2},{},{:.2},{}/{}/{} 0:00,{},{},\"{}\",{},{},{}\n",
            10100 + i / 4,
            quantity,
            price,
            1 + i % 4,
            sales,
            month,
            day,
            year,
            status,
            PRODUCT_LINES[i % PRODUCT_LINES.len()],
            CUSTOMERS[i % CUSTOMERS.len()],
            country_for(territory, i),
            territory,
            deal,
        ));
    }
    csv
}

pub fn sample_store() -> Store {
    Store::from_bytes(sample_csv().as_bytes(), &LoadOptions::default()).unwrap()
}

pub fn small_config() -> Config {
    Config {
        include_record_snippets: false,
        ..Config::new()
    }
}

pub fn pipeline_with(model: Option<Box<dyn LanguageModel>>) -> Pipeline {
    Pipeline::build(
        small_config(),
        sample_store(),
        Arc::new(HashEmbedder::default()),
        model,
    )
    .unwrap()
}

/// Answers every prompt with fixed text and keeps the prompts it saw
pub struct CannedModel {
    pub answer: String,
    pub prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl CannedModel {
    pub fn new(answer: &str) -> (Self, Arc<Mutex<Vec<Prompt>>>) {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                answer: answer.to_string(),
                prompts: prompts.clone(),
            },
            prompts,
        )
    }
}

impl LanguageModel for CannedModel {
    fn complete(&self, prompt: &Prompt) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Always times out
pub struct TimeoutModel {
    pub calls: Arc<AtomicUsize>,
}

impl TimeoutModel {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl LanguageModel for TimeoutModel {
    fn complete(&self, _: &Prompt) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Timeout(Duration::from_secs(30)))
    }
}
