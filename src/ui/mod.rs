pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    error, header, photo_line, section, source_label, status, success, summary_row, timing,
    verdict_line, warn,
};
pub use progress::{Spinner, WarmProgress};
pub use table::{photo_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
