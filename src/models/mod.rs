pub mod category;
pub mod sheet;

pub use category::{Category, CategorySummary};
pub use sheet::{DeletedSheet, DownloadTicket, NewSheet, Sheet, SheetFilter, SortKey};
