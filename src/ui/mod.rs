pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    dim, error, header, info, muted, object_line, section, status, success, timing, warn,
};
pub use progress::Spinner;
pub use table::{edges_table, objects_table, TableBuilder};
pub use theme::{theme, Theme};
