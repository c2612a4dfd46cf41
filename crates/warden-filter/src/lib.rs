//! Wealth Warden Filter Engine
//!
//! Filters are produced by UI input panels and sent to paginated list
//! endpoints. Re-submitting a panel must overwrite that panel's own prior
//! contribution without disturbing filters from other panels, which is
//! what the merge in [`MergePolicy`] implements. The registry maps column
//! descriptors to the panel that edits them and to the filter producers.

mod filter;
mod merge;
mod registry;
mod sort;

pub use filter::{Filter, FilterValue, Operator};
pub use merge::{merge_filters, MergePolicy};
pub use registry::{
    resolve_for, Column, ColumnType, DateModel, EnumModel, PanelContext, PanelKind, PanelModel,
    RangeModel, Rule, TextModel,
};
pub use sort::{init_sort, sort_icon, toggle_sort, SortSpec};
