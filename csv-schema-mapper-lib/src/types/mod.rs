mod mapping;
mod row;

pub use mapping::{
    AttributeKey, ServiceGroup, ServiceMapping, APPLICATION_SERVICE_NAME, SERVICE_MAPPINGS,
};
pub(crate) use mapping::null_as_empty;
pub use row::{HeaderIndex, Row};
