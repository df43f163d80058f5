pub mod data;
pub mod game_states;
pub mod incidents;
pub mod timeline;
