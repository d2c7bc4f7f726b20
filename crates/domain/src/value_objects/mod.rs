pub mod amount;
pub mod fees;
pub mod price;

pub use amount::Amount;
pub use fees::AccruedFees;
pub use price::UsdPrices;
