mod confirm;
mod employee_form;
mod input;
mod key_result;

pub use confirm::{ConfirmDelete, ConfirmEvent};
pub use employee_form::{EmployeeFormView, FormEvent};
pub use input::TextInput;
pub use key_result::KeyResult;
