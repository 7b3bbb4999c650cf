mod stock_summary;

pub use stock_summary::{IngestRequest, NewStockSummary, StockSummaryRecord};
