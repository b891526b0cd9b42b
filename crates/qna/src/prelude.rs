pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Context, Result};
pub use std::format as f;

/// Borderless two-column table used for question metadata
pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .column_separator(' ')
        .padding(0, 2)
        .build();

    table.set_format(format);

    table
}
