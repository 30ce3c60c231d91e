pub mod employee_table;

pub use employee_table::{draw_employee_table, ensure_valid_selection};
