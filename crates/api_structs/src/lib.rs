mod deadline;
mod notification;
mod scan;
mod status;

pub mod dtos {
    pub use crate::deadline::dtos::*;
    pub use crate::notification::dtos::*;
    pub use crate::scan::dtos::*;
}

pub use crate::notification::api::*;
pub use crate::scan::api::*;
pub use crate::status::api::*;
