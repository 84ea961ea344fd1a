use derive_new::new;
use serde::{Deserialize, Serialize};

pub use moment::*;
pub use range::*;

mod moment;
mod range;
