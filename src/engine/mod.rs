pub mod cancel;
pub mod error;
pub mod framework;
pub mod healer;
pub mod ledger;
pub mod locator;
pub mod tracker;
