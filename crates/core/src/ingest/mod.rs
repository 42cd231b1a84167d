pub mod fixture;
pub mod provider;

pub use fixture::FixtureDataProvider;
pub use provider::{DataProvider, HttpJsonDataProvider};
