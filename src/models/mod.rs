// Re-export all model types
pub use self::errors::*;
pub use self::menu::*;
pub use self::mess_type::*;

mod errors;
mod menu;
mod mess_type;
