pub mod charts;
pub mod control;
pub mod dataset;
pub mod panels;
pub mod visualization;
