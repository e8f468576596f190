pub mod actions;
pub mod ai;
pub mod calculators;
pub mod engine;
pub mod menu;
pub mod messages;
pub mod participant;
pub mod rewards;
pub mod runner;
pub mod state;

#[cfg(test)]
mod tests;
