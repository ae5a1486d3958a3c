pub mod plot;

pub use plot::{LinePlot, PlotPoint};
