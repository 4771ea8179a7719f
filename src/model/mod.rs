//! Types that represent the core data model: the contact `Ledger` and the `Source` categories.
mod ledger;
mod source;

pub(crate) use ledger::insert_cell;
pub use ledger::{
    DayData, DayKey, Increment, Ledger, MonthData, SalespersonData, SourceEntry, YearData,
};
pub use source::Source;
