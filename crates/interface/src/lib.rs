mod error;
mod model;

pub use error::ExchangeError;
pub use model::{
    Balance, BalanceSnapshot, ExchangeId, MarketSnapshot, OrderAck, OrderIntent, OrderType, Side,
    TimeInForce,
};
