//! HTML rendering for the order form and result pages.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use spotdesk_core::{OrderForm, OrderRequest, OrderResult, OrderType};

/// What the exchange said about a submitted order.
#[derive(Debug, Clone)]
pub enum Outcome {
    Placed(OrderResult),
    /// User-facing error message.
    Failed(String),
}

/// Result page model: the normalized request plus its outcome.
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub trade_data: OrderRequest,
    pub outcome: Outcome,
}

impl ResultPage {
    pub fn success(&self) -> bool {
        matches!(self.outcome, Outcome::Placed(_))
    }
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<main class="container">
<h1>Spot Testnet Order Desk</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn select_options(options: &[&str], selected: &str) -> String {
    options
        .iter()
        .map(|option| {
            let marker = if option.eq_ignore_ascii_case(selected.trim()) {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{option}"{marker}>{option}</option>"#)
        })
        .collect::<Vec<_>>()
        .join("")
}

/// The order form, with violations listed above it when present.
///
/// A rejected submission is echoed back so the user can correct it.
pub fn order_form(errors: &[String], form: Option<&OrderForm>) -> String {
    let empty = OrderForm::default();
    let form = form.unwrap_or(&empty);

    let mut body = String::new();
    if !errors.is_empty() {
        body.push_str(r#"<div class="errors"><ul>"#);
        for error in errors {
            let _ = write!(body, "<li>{}</li>", escape_html(error));
        }
        body.push_str("</ul></div>\n");
    }

    let order_types = [
        OrderType::Market.as_str(),
        OrderType::Limit.as_str(),
        OrderType::StopLimit.as_str(),
    ];

    let _ = write!(
        body,
        r#"<form method="post" action="/place_order" class="order-form">
<label>Symbol <input type="text" name="symbol" placeholder="BTCUSDT" value="{symbol}" required></label>
<label>Side <select name="side">{sides}</select></label>
<label>Order type <select name="order_type">{types}</select></label>
<label>Quantity <input type="text" name="quantity" placeholder="0.001" value="{quantity}" required></label>
<label>Price <input type="text" name="price" placeholder="LIMIT and STOP_LIMIT" value="{price}"></label>
<label>Stop price <input type="text" name="stop_price" placeholder="STOP_LIMIT only" value="{stop_price}"></label>
<button type="submit">Place order</button>
</form>
"#,
        symbol = escape_html(&form.symbol),
        sides = select_options(&["BUY", "SELL"], &form.side),
        types = select_options(&order_types, &form.order_type),
        quantity = escape_html(&form.quantity),
        price = escape_html(form.price.as_deref().unwrap_or_default()),
        stop_price = escape_html(form.stop_price.as_deref().unwrap_or_default()),
    );

    layout("Place Order", &body)
}

fn decimal_cell(value: Option<Decimal>) -> String {
    value
        .map(|v| v.normalize().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn row(body: &mut String, label: &str, class: &str, value: &str) {
    let _ = write!(
        body,
        r#"<tr><th>{label}</th><td class="{class}">{}</td></tr>"#,
        escape_html(value)
    );
}

/// Outcome of a submitted order.
pub fn result_page(page: &ResultPage) -> String {
    let mut body = String::new();

    match &page.outcome {
        Outcome::Placed(result) => {
            body.push_str(r#"<section class="result success"><h2>Order placed</h2><table>"#);
            row(&mut body, "Order ID", "order-id", &result.order_id.to_string());
            row(&mut body, "Status", "status", &result.status);
            row(
                &mut body,
                "Executed quantity",
                "executed-qty",
                &result.executed_qty.normalize().to_string(),
            );
            row(&mut body, "Average price", "avg-price", &decimal_cell(result.avg_price));
            if let Some(client_order_id) = &result.client_order_id {
                row(&mut body, "Client order ID", "client-order-id", client_order_id);
            }
            body.push_str("</table></section>\n");
        }
        Outcome::Failed(message) => {
            let _ = write!(
                body,
                r#"<section class="result failure"><h2>Order failed</h2><p class="error-message">{}</p></section>
"#,
                escape_html(message)
            );
        }
    }

    let trade = &page.trade_data;
    body.push_str(r#"<section class="trade-data"><h2>Submitted order</h2><table>"#);
    row(&mut body, "Symbol", "symbol", &trade.symbol);
    row(&mut body, "Side", "side", trade.side.as_str());
    row(&mut body, "Order type", "order-type", trade.order_type().as_str());
    row(&mut body, "Quantity", "quantity", &trade.quantity.normalize().to_string());
    row(&mut body, "Price", "price", &decimal_cell(trade.price()));
    row(&mut body, "Stop price", "stop-price", &decimal_cell(trade.stop_price()));
    body.push_str("</table></section>\n");
    body.push_str(r#"<p><a href="/">Place another order</a></p>"#);

    let title = if page.success() {
        "Order Placed"
    } else {
        "Order Failed"
    };
    layout(title, &body)
}
