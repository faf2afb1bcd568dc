pub mod cards;
pub mod deck;
pub mod game_state;
pub mod player;
pub mod table;

pub use cards::{Card, CardColor, CardKind};
pub use game_state::{GameDirection, GameState, LastAction, PublicGameState};
pub use player::{Player, PlayerRole, PublicPlayer, UnoDeclaration};
pub use table::{GameStatus, Table};
