pub mod cookbook;

pub use self::cookbook::CookbookConnector;
