pub mod catalog;
pub mod gateway;

pub use catalog::{ParamKind, QueryCatalog, QueryContract, ResultShape};
pub use gateway::{Cell, QueryGateway, Row};
