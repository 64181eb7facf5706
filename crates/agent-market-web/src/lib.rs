use serde::Serialize;
use wasm_bindgen::prelude::*;

use agent_market_core::catalog::{all_capabilities, AgentRecord};
use agent_market_core::compare::{compare, Attribute};
use agent_market_core::estimate::estimate;
use agent_market_core::filter::{filter, FilterCriteria};
use agent_market_core::money::Money;
use agent_market_core::pricing::PricingDescriptor;
use agent_market_core::seed::load_bundled_catalog;
use agent_market_core::selection::SelectionSet;
use agent_market_core::templates::TEMPLATES;

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The catalog shipped with the crate, for pages that run without a server.
#[wasm_bindgen]
pub fn bundled_agents() -> JsValue {
    match load_bundled_catalog() {
        Ok(agents) => to_js(&agents),
        Err(_) => JsValue::NULL,
    }
}

/// Distinct capability tags across `agents`, for building filter checkboxes.
#[wasm_bindgen]
pub fn capability_options(agents: JsValue) -> JsValue {
    let agents: Vec<AgentRecord> = match serde_wasm_bindgen::from_value(agents) {
        Ok(a) => a,
        Err(_) => return JsValue::NULL,
    };
    to_js(&all_capabilities(&agents))
}

/// Filter an array of agent records. `criteria` may be null/undefined for
/// no structured filters. Returns the matching records in input order.
#[wasm_bindgen]
pub fn filter_agents(agents: JsValue, query: &str, criteria: JsValue) -> JsValue {
    let agents: Vec<AgentRecord> = match serde_wasm_bindgen::from_value(agents) {
        Ok(a) => a,
        Err(_) => return JsValue::NULL,
    };
    let criteria: FilterCriteria = if criteria.is_null() || criteria.is_undefined() {
        FilterCriteria::default()
    } else {
        match serde_wasm_bindgen::from_value(criteria) {
            Ok(c) => c,
            Err(_) => return JsValue::NULL,
        }
    };
    to_js(&filter(&agents, query, &criteria))
}

// ---------------------------------------------------------------------------
// Cost
// ---------------------------------------------------------------------------

/// Estimate cost for `quantity` units of a pricing descriptor.
/// quantity is f64 so plain JS numbers work; NaN and negatives count as 0.
#[wasm_bindgen]
pub fn estimate_cost(pricing: JsValue, quantity: f64) -> JsValue {
    let pricing: PricingDescriptor = match serde_wasm_bindgen::from_value(pricing) {
        Ok(p) => p,
        Err(_) => return JsValue::NULL,
    };
    to_js(&estimate(&pricing, quantity as i64))
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

/// Comparison table over every attribute. Null for fewer than two records.
#[wasm_bindgen]
pub fn compare_agents(agents: JsValue) -> JsValue {
    let agents: Vec<AgentRecord> = match serde_wasm_bindgen::from_value(agents) {
        Ok(a) => a,
        Err(_) => return JsValue::NULL,
    };
    if agents.len() < 2 {
        return JsValue::NULL;
    }
    to_js(&compare(&agents, &Attribute::ALL))
}

/// Add `id` to the selection, or remove it if present. Returns the new id list.
#[wasm_bindgen]
pub fn toggle_selection(ids: JsValue, id: u32) -> JsValue {
    let mut selection: SelectionSet = if ids.is_null() || ids.is_undefined() {
        SelectionSet::new()
    } else {
        match serde_wasm_bindgen::from_value(ids) {
            Ok(s) => s,
            Err(_) => return JsValue::NULL,
        }
    };
    selection.toggle(id);
    to_js(&selection)
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TemplateJs {
    key: &'static str,
    name: &'static str,
    query: &'static str,
    criteria: FilterCriteria,
}

#[wasm_bindgen]
pub fn get_templates() -> JsValue {
    let templates: Vec<TemplateJs> = TEMPLATES
        .iter()
        .map(|t| TemplateJs {
            key: t.key,
            name: t.name,
            query: t.query,
            criteria: t.criteria(),
        })
        .collect();
    to_js(&templates)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Format an amount as "$X.YY". Non-finite input formats as "$0.00".
#[wasm_bindgen]
pub fn fmt_money(amount: f64) -> String {
    Money::from_f64(amount).unwrap_or(Money::ZERO).to_string()
}
