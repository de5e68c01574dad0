/// Steam keeps 13% of every community market sale; the seller sees 0.87x.
pub const STEAM_FEE: f64 = 0.13;

pub fn net_sell_price(sell_price: f64) -> f64 {
    sell_price * (1.0 - STEAM_FEE)
}

pub fn percent_return(net_price: f64, buy_price: f64) -> f64 {
    (net_price - buy_price) / buy_price * 100.0
}

/// Derives (net price, % return) from a fetched sell price. An unavailable
/// sell price stays unavailable on both outputs instead of collapsing to 0.
pub fn evaluate(sell_price: Option<f64>, buy_price: f64) -> (Option<f64>, Option<f64>) {
    match sell_price {
        Some(price) => {
            let net = net_sell_price(price);
            (Some(net), Some(percent_return(net, buy_price)))
        }
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_price_takes_the_fee() {
        assert!((net_sell_price(2.5) - 2.175).abs() < 1e-9);
        assert!((net_sell_price(100.0) - 87.0).abs() < 1e-9);
    }

    #[test]
    fn percent_return_is_relative_to_buy_price() {
        // bought at 2.0, nets 2.5 -> +25%
        assert!((percent_return(2.5, 2.0) - 25.0).abs() < 1e-9);
        // bought at 4.0, nets 3.0 -> -25%
        assert!((percent_return(3.0, 4.0) - -25.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_combines_both() {
        let (net, ret) = evaluate(Some(2.5), 2.2);
        assert!((net.unwrap() - 2.175).abs() < 1e-9);
        assert!((ret.unwrap() - ((2.175 - 2.2) / 2.2 * 100.0)).abs() < 1e-9);
    }

    #[test]
    fn evaluate_keeps_missing_prices_missing() {
        let (net, ret) = evaluate(None, 2.2);
        assert!(net.is_none());
        assert!(ret.is_none());
    }
}
