pub mod detect;
pub mod extract;
