mod common;
mod intake;
mod matching;
mod routing;
