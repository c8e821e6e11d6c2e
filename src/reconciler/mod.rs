pub mod reconcile;
pub mod refresher;
