pub mod central_bank;
pub mod market;
pub mod util;

pub use central_bank::CentralBankProvider;
pub use market::MarketProvider;
