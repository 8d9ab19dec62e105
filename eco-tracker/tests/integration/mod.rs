mod incidents;
mod system;
mod users;
