pub mod aggregate;
pub mod stock_service;
