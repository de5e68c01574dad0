/// One sampled item for one run. Built during the fetch loop, handed to the
/// report writer, never kept around afterwards.
#[derive(Debug, Clone)]
pub struct ItemQuote {
    pub item_link: String,
    pub item_name: String,
    pub buy_price: f64,
    pub current_sell_price: Option<f64>, // None when the market gave us nothing
    pub net_sell_price: Option<f64>,
    pub percent_return: Option<f64>,
}
