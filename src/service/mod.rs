pub mod clustering;
pub mod guard;
