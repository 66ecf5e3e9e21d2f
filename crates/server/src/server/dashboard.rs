use axum::{
    extract::{Query, State},
    response::Html,
};
use bet_etf_core::models::order::{OrderPlan, OrderRequest};
use bet_etf_core::models::symbol::SymbolRecord;
use bet_etf_core::EtfCalculator;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::str::FromStr;

use super::AppState;

const STYLE: &str = "body{font-family:sans-serif;margin:20px}\
table{border-collapse:collapse}td,th{padding:4px 10px;text-align:right;min-width:110px}\
th{background:#eee}td.sym{text-align:left;font-weight:bold}\
.up{color:green;font-weight:bold}.down{color:red;font-weight:bold}\
.err{color:red}input{width:100px}";

/// The form state of one dashboard request.
struct DashboardInputs {
    size: usize,
    request: OrderRequest,
    errors: Vec<String>,
}

/// GET / - the calculator page.
///
/// Every input change resubmits the form, so the order table is recomputed
/// on each edit. Query parameters: `size`, `amount`, `fee`, and per symbol
/// `qty_<SYMBOL>` (current holding) and `price_<SYMBOL>` (buy price).
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let calculator = state.calculator.read().await;
    let mut inputs = read_inputs(&calculator, &params);

    let plan = match calculator.plan_orders(&inputs.request, Some(inputs.size)) {
        Ok(plan) => Some(plan),
        Err(e) => {
            inputs.errors.push(e.to_string());
            None
        }
    };

    Html(render_page(&calculator, &inputs, plan.as_ref()))
}

fn read_inputs(calculator: &EtfCalculator, params: &HashMap<String, String>) -> DashboardInputs {
    let settings = calculator.settings();
    let mut errors = Vec::new();

    let size = param(params, "size", settings.symbols_list_size, &mut errors).max(1);
    let mut request = calculator.default_order_request();
    request.invest_amount = param(params, "amount", settings.invest_amount, &mut errors);
    request.fees.percent = param(params, "fee", settings.transaction_fee, &mut errors);

    for (key, raw) in params {
        if let Some(symbol) = key.strip_prefix("qty_") {
            if let Some(quantity) = parse_field::<f64>(key, raw, &mut errors) {
                request = request.with_holding(symbol, quantity);
            }
        } else if let Some(symbol) = key.strip_prefix("price_") {
            if let Some(price) = parse_field::<f64>(key, raw, &mut errors) {
                request = request.with_price(symbol, price);
            }
        }
    }

    DashboardInputs {
        size,
        request,
        errors,
    }
}

fn param<T: FromStr + Copy>(
    params: &HashMap<String, String>,
    key: &str,
    default: T,
    errors: &mut Vec<String>,
) -> T {
    params
        .get(key)
        .and_then(|raw| parse_field(key, raw, errors))
        .unwrap_or(default)
}

/// Empty fields count as absent; unparsable ones are reported.
fn parse_field<T: FromStr>(key: &str, raw: &str, errors: &mut Vec<String>) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(format!("Invalid value for {key}: {raw:?}"));
            None
        }
    }
}

fn render_page(calculator: &EtfCalculator, inputs: &DashboardInputs, plan: Option<&OrderPlan>) -> String {
    let mut page = String::with_capacity(16 * 1024);
    let _ = write!(
        page,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>BET ETF Calculator</title>\
         <style>{STYLE}</style></head><body><h1>BET ETF Calculator</h1>"
    );

    let label = calculator.updated_at_label();
    if !label.is_empty() {
        let _ = write!(page, "<p><i>{}</i></p>", escape(&label));
    }
    for error in &inputs.errors {
        let _ = write!(page, "<p class=\"err\">{}</p>", escape(error));
    }

    page.push_str("<form method=\"get\" action=\"/\"><table>");
    let _ = write!(
        page,
        "<tr><td class=\"sym\">Symbols List Size</td><td>{}</td></tr>\
         <tr><td class=\"sym\">Invest Sum (RON)</td><td>{}</td></tr>\
         <tr><td class=\"sym\">Transaction Fee (%)</td><td>{}</td></tr>",
        number_input("size", &inputs.size.to_string()),
        number_input("amount", &inputs.request.invest_amount.to_string()),
        number_input("fee", &inputs.request.fees.percent.to_string()),
    );
    page.push_str("</table><br>");

    page.push_str(
        "<table><tr><th>Symbol</th><th>Index Weight (%)</th><th>Current Quantity</th>\
         <th>Price Variation (%)</th><th>Medium Price (RON)</th><th>Buy Price (RON)</th>\
         <th>Buy Quantity</th><th>Order Value (RON)</th></tr>",
    );

    let mut symbols: Vec<&SymbolRecord> = calculator.symbols(Some(inputs.size)).iter().collect();
    symbols.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    for record in symbols {
        let order = plan.and_then(|p| p.get(&record.symbol));
        let held = inputs.request.holdings.get(&record.symbol).copied().unwrap_or(0.0);
        let price = inputs
            .request
            .prices
            .get(&record.symbol)
            .copied()
            .unwrap_or(record.buy_price);
        let class = if record.variation < 0.0 { "down" } else { "up" };

        let _ = write!(
            page,
            "<tr><td class=\"sym\">{sym}</td><td>{weight:.2}</td><td>{qty}</td>\
             <td class=\"{class}\">{var:.4}</td><td>{medium:.4}</td><td>{price}</td>\
             <td>{buy}</td><td>{value:.2}</td></tr>",
            sym = escape(&record.symbol),
            weight = record.weight,
            qty = number_input(&format!("qty_{}", record.symbol), &held.to_string()),
            var = record.variation,
            medium = record.medium_price,
            price = number_input(&format!("price_{}", record.symbol), &price.to_string()),
            buy = order.map(|o| o.buy_quantity).unwrap_or(0),
            value = order.map(|o| o.order_value).unwrap_or(0.0),
        );
    }
    page.push_str("</table>");

    if let Some(plan) = plan {
        let _ = write!(
            page,
            "<p>Invested <b>{:.2}</b> RON, cash left <b>{:.2}</b> RON.</p>",
            plan.invested(),
            plan.cash_left()
        );
        for skipped in &plan.skipped {
            let _ = write!(
                page,
                "<p class=\"err\">{} skipped: {}</p>",
                escape(&skipped.symbol),
                skipped.reason
            );
        }
    }

    page.push_str("<noscript><button type=\"submit\">Recalculate</button></noscript></form></body></html>");
    page
}

fn number_input(name: &str, value: &str) -> String {
    format!(
        "<input type=\"number\" step=\"any\" min=\"0\" name=\"{}\" value=\"{}\" onchange=\"this.form.submit()\">",
        escape(name),
        escape(value)
    )
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
