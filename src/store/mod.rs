pub mod check_ins;
pub mod events;
pub mod ticket_types;
pub mod tickets;
