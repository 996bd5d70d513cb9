pub mod binary;
pub mod io;
pub mod reduce;

pub use self::binary::BinaryImage;
pub use self::reduce::{reduce_threshold, reduce_times};
