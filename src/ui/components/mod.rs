pub mod freighter_card;
pub mod stat_card;
pub mod toast;
