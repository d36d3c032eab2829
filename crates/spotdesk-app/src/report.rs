//! Plain-text reports for the order inspection CLI.

use std::fmt::Write as _;

use chrono::{TimeZone, Utc};
use spotdesk_exchange::{AccountInfo, OrderSnapshot};

fn format_time(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// Numbered listing of open orders.
pub fn open_orders_report(orders: &[OrderSnapshot]) -> String {
    let mut out = format!("=== Current Open Orders ({}) ===\n", orders.len());
    if orders.is_empty() {
        out.push_str("No open orders found!\n");
        return out;
    }

    for (i, order) in orders.iter().enumerate() {
        let _ = writeln!(out, "\n{}. Order ID: {}", i + 1, order.order_id);
        let _ = writeln!(out, "   Symbol: {}", order.symbol);
        let _ = writeln!(out, "   Side: {}", order.side);
        let _ = writeln!(out, "   Type: {}", order.order_type);
        let _ = writeln!(out, "   Quantity: {}", order.orig_qty.normalize());
        let _ = writeln!(out, "   Status: {}", order.status);
        if !order.price.is_zero() {
            let _ = writeln!(out, "   Price: ${}", order.price.normalize());
        }
        if let Some(stop_price) = order.stop_price.filter(|p| !p.is_zero()) {
            let _ = writeln!(out, "   Stop Price: ${}", stop_price.normalize());
        }
        if let Some(time) = order.time {
            let _ = writeln!(out, "   Time: {}", format_time(time));
        }
    }
    out
}

/// Account permissions and non-zero balances.
pub fn account_report(account: &AccountInfo) -> String {
    let mut out = String::from("=== Account Info ===\n");
    let _ = writeln!(out, "Account type: {}", account.account_type);
    let _ = writeln!(
        out,
        "Can trade: {} | Can withdraw: {} | Can deposit: {}",
        account.can_trade, account.can_withdraw, account.can_deposit
    );

    let held: Vec<_> = account
        .balances
        .iter()
        .filter(|b| !b.total().is_zero())
        .collect();
    let _ = writeln!(out, "Assets held: {}", held.len());
    for balance in held {
        let _ = writeln!(
            out,
            "   {}: free {} locked {}",
            balance.asset,
            balance.free.normalize(),
            balance.locked.normalize()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use spotdesk_exchange::Balance;

    use super::*;

    fn stop_limit_order() -> OrderSnapshot {
        OrderSnapshot {
            symbol: "BTCUSDT".to_string(),
            order_id: 12,
            client_order_id: None,
            price: dec!(29000.00),
            orig_qty: dec!(0.500),
            executed_qty: dec!(0),
            status: "NEW".to_string(),
            time_in_force: Some("GTC".to_string()),
            order_type: "STOP_LOSS_LIMIT".to_string(),
            side: "SELL".to_string(),
            stop_price: Some(dec!(29100)),
            time: Some(0),
        }
    }

    #[test]
    fn test_empty_open_orders() {
        let report = open_orders_report(&[]);
        assert!(report.contains("(0)"));
        assert!(report.contains("No open orders found!"));
    }

    #[test]
    fn test_open_order_lines() {
        let report = open_orders_report(&[stop_limit_order()]);
        assert!(report.contains("1. Order ID: 12"));
        assert!(report.contains("Quantity: 0.5"));
        assert!(report.contains("Price: $29000"));
        assert!(report.contains("Stop Price: $29100"));
        assert!(report.contains("Time: 1970-01-01 00:00:00 UTC"));
    }

    #[test]
    fn test_account_report_skips_empty_balances() {
        let account = AccountInfo {
            can_trade: true,
            can_withdraw: false,
            can_deposit: false,
            account_type: "SPOT".to_string(),
            balances: vec![
                Balance {
                    asset: "BTC".to_string(),
                    free: dec!(1.0),
                    locked: dec!(0),
                },
                Balance::empty("BNB"),
            ],
        };
        let report = account_report(&account);
        assert!(report.contains("Assets held: 1"));
        assert!(report.contains("BTC: free 1 locked 0"));
        assert!(!report.contains("BNB"));
    }
}
