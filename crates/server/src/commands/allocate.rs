use bet_etf_core::errors::CoreError;
use bet_etf_core::models::settings::Settings;
use bet_etf_core::EtfCalculator;

/// `bet-etf allocate`: print a plan for the stored symbols to stdout.
pub async fn run(settings: Settings, amount: f64, orders: bool) -> Result<(), CoreError> {
    let calculator = EtfCalculator::load(settings).await?;

    let label = calculator.updated_at_label();
    if !label.is_empty() {
        println!("{label}");
    }

    if orders {
        let mut request = calculator.default_order_request();
        request.invest_amount = amount;
        let plan = calculator.plan_orders(&request, None)?;

        println!("{:<8} {:>8} {:>12} {:>10} {:>14}", "Symbol", "Weight", "Buy Price", "Quantity", "Order Value");
        for order in &plan.orders {
            println!(
                "{:<8} {:>7.2}% {:>12.4} {:>10} {:>14.2}",
                order.symbol, order.target_weight, order.buy_price, order.buy_quantity, order.order_value
            );
        }
        for skipped in &plan.skipped {
            println!("{:<8} skipped: {}", skipped.symbol, skipped.reason);
        }
        println!("Invested {:.2} of {:.2} (cash left {:.2})", plan.invested(), plan.invest_amount, plan.cash_left());
    } else {
        let allocation = calculator.allocate(amount, None)?;

        println!("{:<8} {:>8} {:>12} {:>10} {:>14}", "Symbol", "Weight", "Price", "Quantity", "Amount");
        for line in &allocation.lines {
            println!(
                "{:<8} {:>7.2}% {:>12.4} {:>10} {:>14.2}",
                line.symbol, line.target_weight, line.price, line.quantity, line.amount
            );
        }
        for skipped in &allocation.skipped {
            println!("{:<8} skipped: {}", skipped.symbol, skipped.reason);
        }
        println!(
            "Invested {:.2} of {:.2} (cash left {:.2})",
            allocation.invested(),
            allocation.total_amount,
            allocation.cash_left()
        );
    }

    Ok(())
}
