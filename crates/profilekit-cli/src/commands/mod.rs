pub mod check;
pub mod common;
pub mod list;
pub mod show;

pub use check::Check;
pub use common::LoadOptions;
pub use list::List;
pub use show::Show;
