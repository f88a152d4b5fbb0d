pub mod catalog;
pub mod cell;
pub mod detail;

pub use catalog::{CatalogEvent, CatalogViewModel};
pub use cell::CellViewModel;
pub use detail::{DescriptionFormat, DetailLabels, DetailViewModel, FormattedDescription};

/// Symbol shown when favorites are selected or filtering is on.
pub const FAVORITE_ON_SYMBOL: &str = "heart.fill";
/// Symbol shown when favorites are not selected or filtering is off.
pub const FAVORITE_OFF_SYMBOL: &str = "heart";
