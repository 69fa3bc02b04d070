//! Read-only query tests over a sample snapshot.

mod common;

use inventory_flow::query::StockCounts;

#[test]
fn search_ignores_case_and_keeps_order() {
    let data = common::sample_inventory();
    let q = data.query();

    let hits = q.search("SHI");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p1");

    assert_eq!(q.search("").len(), 2);
    assert!(q.search("trousers").is_empty());
}

#[test]
fn get_and_by_category() {
    let data = common::sample_inventory();
    let q = data.query();
    assert_eq!(q.get("p2").unwrap().name, "Cap");
    assert!(q.get("p9").is_none());

    let tops = q.by_category("tops");
    assert_eq!(tops.len(), 1);
    assert_eq!(tops[0].id, "p1");
}

#[test]
fn stock_summary_counts_per_variant() {
    let data = common::sample_inventory();
    let summary = data.query().stock_summary();

    assert_eq!(summary.len(), 2);
    assert_eq!(summary[0].name, "Shirt");
    assert_eq!(summary[0].variants[0].color, "Blue");
    assert_eq!(
        summary[0].variants[0].counts,
        StockCounts {
            total_slots: 3,
            stocked: 1,
            sold: 1,
            empty: 1,
        }
    );
    assert_eq!(summary[0].variants[1].counts.total_slots, 0);
}

#[test]
fn stock_summary_json_shape() {
    let data = common::sample_inventory();
    let value = serde_json::to_value(data.query().stock_summary()).unwrap();
    assert_eq!(
        value[1],
        serde_json::json!({
            "name": "Cap",
            "variants": [
                { "color": "Black", "totalSlots": 1, "stocked": 0, "sold": 1, "empty": 0 }
            ]
        })
    );
}

#[test]
fn totals_and_out_of_stock() {
    let data = common::sample_inventory();
    let q = data.query();

    let totals = q.totals();
    assert_eq!(totals.total_slots, 4);
    assert_eq!(totals.sold, 2);

    let names: Vec<(&str, &str)> = q
        .out_of_stock()
        .into_iter()
        .map(|(p, v)| (p.name.as_str(), v.name.as_str()))
        .collect();
    assert_eq!(names, vec![("Shirt", "Red"), ("Cap", "Black")]);
}
