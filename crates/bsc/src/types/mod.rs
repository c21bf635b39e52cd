//! Symbol type model
//!
//! Types recorded in symbol tables during validation. Nothing here performs
//! inference beyond what the shape of a single node already tells us.

mod bsc_type;

pub use bsc_type::{BscType, FunctionType, InterfaceType};
