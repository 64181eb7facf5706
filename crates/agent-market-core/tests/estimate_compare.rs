use agent_market_core::catalog::find;
use agent_market_core::compare::{compare, Attribute};
use agent_market_core::estimate::estimate;
use agent_market_core::money::Money;
use agent_market_core::pricing::PricingDescriptor;
use agent_market_core::seed::load_bundled_catalog;
use agent_market_core::SelectionSet;
use pretty_assertions::assert_eq;

fn money(s: &str) -> Money {
    Money::parse(s).unwrap()
}

#[test]
fn free_is_always_zero() {
    for q in [0, 1, 50, 1_000_000] {
        let e = estimate(&PricingDescriptor::Free, q);
        assert_eq!(e.total, Money::ZERO);
        assert_eq!(e.explanation, "This agent is completely free.");
    }
}

#[test]
fn pay_as_you_go_two_hundred_units() {
    let p = PricingDescriptor::PayAsYouGo {
        price: money("0.10"),
        unit: "call".into(),
    };
    let e = estimate(&p, 200);
    assert_eq!(e.total, money("20.00"));
    assert_eq!(e.total.to_string(), "$20.00");
}

#[test]
fn freemium_under_and_over_the_allowance() {
    let p = PricingDescriptor::Freemium {
        price: money("0.10"),
        unit: "image".into(),
        free_tier_limit: 50,
    };
    assert_eq!(estimate(&p, 30).total, Money::ZERO);
    assert_eq!(
        estimate(&p, 30).explanation,
        "Your usage is within the free tier of 50 images."
    );

    let over = estimate(&p, 200);
    assert_eq!(over.total, money("15.00"));
    assert_eq!(over.billable, 150);
}

#[test]
fn negative_quantity_is_treated_as_zero() {
    let pricings = [
        PricingDescriptor::Free,
        PricingDescriptor::Subscription {
            price: money("49"),
            unit: "month".into(),
        },
        PricingDescriptor::PayAsYouGo {
            price: money("0.25"),
            unit: "minute".into(),
        },
        PricingDescriptor::Freemium {
            price: money("0.10"),
            unit: "query".into(),
            free_tier_limit: 0,
        },
        PricingDescriptor::Freemium {
            price: money("0.10"),
            unit: "query".into(),
            free_tier_limit: 50,
        },
    ];
    for p in &pricings {
        let negative = estimate(p, -10);
        assert_eq!(negative, estimate(p, 0), "{p:?}");
        assert_eq!(negative.billable, 0, "{p:?}");
    }
    assert_eq!(estimate(&pricings[2], -10).total, Money::ZERO);
    assert_eq!(estimate(&pricings[3], -10).total, Money::ZERO);
    assert_eq!(estimate(&pricings[4], -10).total, Money::ZERO);
}

#[test]
fn estimates_for_bundled_catalog() {
    let agents = load_bundled_catalog().unwrap();
    let transcribe = find(&agents, 5).unwrap();
    // 0.006 * 1000 minutes
    assert_eq!(estimate(&transcribe.pricing_details, 1_000).total, money("6"));
    assert_eq!(
        estimate(&transcribe.pricing_details, 1_000).explanation,
        "$0.006 per minute."
    );

    let ecom = find(&agents, 4).unwrap();
    assert_eq!(estimate(&ecom.pricing_details, 7).total, Money::from_units(299));
}

#[test]
fn comparison_has_one_column_per_record_in_order() {
    let agents = load_bundled_catalog().unwrap();
    let picked = vec![find(&agents, 2).unwrap().clone(), find(&agents, 1).unwrap().clone()];
    let table = compare(&picked, &Attribute::ALL);

    assert_eq!(table.columns, vec!["ContentGenius AI", "BackgroundRemover Pro"]);
    assert_eq!(table.rows.len(), Attribute::ALL.len());
    for row in &table.rows {
        assert_eq!(row.cells.len(), 2);
    }

    let price = &table.rows[0];
    assert_eq!(price.label, "Price Model");
    assert_eq!(price.cells, vec!["Subscription", "Freemium"]);

    let caps = table
        .rows
        .iter()
        .find(|r| r.attribute == Attribute::Capabilities)
        .unwrap();
    assert_eq!(
        caps.cells[1],
        "Batch Processing, API Access, High Resolution"
    );
}

#[test]
fn comparison_projects_only_requested_attributes() {
    let agents = load_bundled_catalog().unwrap();
    let refs: Vec<_> = agents.iter().take(3).collect();
    let table = compare(&refs, &[Attribute::Uptime, Attribute::Privacy]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells, vec!["99.9%", "99.8%", "99.5%"]);
    assert_eq!(table.rows[1].label, "Privacy Policy");
}

#[test]
fn selection_drives_comparison() {
    let agents = load_bundled_catalog().unwrap();
    let mut sel = SelectionSet::new();
    sel.toggle(3);
    assert!(!sel.can_compare());
    sel.toggle(6);
    sel.toggle(1);
    sel.toggle(6);
    assert!(sel.can_compare());

    let picked: Vec<_> = sel.ids().iter().filter_map(|&id| find(&agents, id)).collect();
    let table = compare(&picked, &[Attribute::PriceModel]);
    assert_eq!(table.columns, vec!["ResearchAssist", "BackgroundRemover Pro"]);
}
