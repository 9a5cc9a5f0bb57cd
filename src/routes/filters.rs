use rocket::serde::json::Json;
use rocket::Route;
use serde_json::{json, Value};

// Static option lists the search sidebar renders. Values are what the UI
// sends back as price/area range selections.

// GET /filters/price-ranges
#[get("/price-ranges")]
pub fn price_ranges() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            { "label": "Any price",        "value": "" },
            { "label": "Under 1M",         "value": "under-1m" },
            { "label": "1M - 3M",          "value": "1m-3m" },
            { "label": "3M - 5M",          "value": "3m-5m" },
            { "label": "5M - 7M",          "value": "5m-7m" },
            { "label": "Over 7M",          "value": "over-7m" },
        ],
    }))
}

// GET /filters/area-ranges
#[get("/area-ranges")]
pub fn area_ranges() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            { "label": "Any area",         "value": "" },
            { "label": "Under 20m²",       "value": "under-20" },
            { "label": "20 - 30m²",        "value": "20-30" },
            { "label": "30 - 40m²",        "value": "30-40" },
            { "label": "40 - 50m²",        "value": "40-50" },
            { "label": "Over 50m²",        "value": "over-50" },
        ],
    }))
}

pub fn routes() -> Vec<Route> {
    routes![price_ranges, area_ranges]
}
