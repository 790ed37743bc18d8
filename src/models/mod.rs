pub mod check_in;
pub mod event;
pub mod ticket;
pub mod user;

pub use check_in::{CheckIn, CheckInRecord};
pub use event::{Event, EventPatch, EventStatus, EventSummary};
pub use ticket::{
    CustomTicketType, Ticket, TicketDetails, TicketPatch, TicketStatus, TicketType,
    TicketTypePatch, TicketWithCheckIn,
};
pub use user::{Role, User};
