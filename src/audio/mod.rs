pub mod clock;
pub mod player;

pub use clock::{clamp_position, PlaybackClock, PositionSample, PositionStream};
pub use player::{MediaPlayer, MediaSource, PlayerFactory, SimulatedPlayer, SimulatedPlayerFactory};
