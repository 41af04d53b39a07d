//! The analytics warehouse: five relational tables and the store that
//! writes them.

mod models;
mod reset;
mod schema;
mod store;

pub use models::{Artist, Song, SongPlay, TimeRow, User};
pub use reset::reset_database;
pub use schema::WAREHOUSE_TABLES;
pub use store::{SqliteWarehouseStore, TableCounts, WarehouseStore};
