pub mod codec;
pub mod error;
pub mod row;
pub mod rowset;
pub mod schema;
pub mod value;

pub use codec::{decode, encode};
pub use error::DecodeError;
pub use row::{Row, RowIndex};
pub use rowset::{ResultSet, ResultSetMetadata, ResultSetStats, WireResultSet, decode_rows};
pub use schema::{ColumnSchema, Field, StructType, Type, TypeCode};
pub use value::Value;
