pub use self::coordinates::Coordinates;
pub use self::dataset::Dataset;
pub use self::features::{FeatureVector, Postcode};
pub use self::prediction::PredictionResult;
pub use self::property_type::PropertyType;
pub use self::record::{AggregationDataError, PropertyRecord, RawRecord, RecordField};

mod coordinates;
mod dataset;
mod features;
mod prediction;
mod property_type;
mod record;
