pub mod bullish;

pub use bullish::score_item;
