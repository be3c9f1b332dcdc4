// Analysis layer: load a collected dataset, clean it, and summarize it.
//
// The cleaner is the heart of the pipeline; everything downstream
// assumes its invariants (unique ids, positive prices, clipped
// distribution) hold.

pub mod charts;
pub mod clean;
pub mod load;
pub mod report;
pub mod stats;

pub use clean::{clean, CleanReport};
pub use load::{most_recent_csv, read_csv};
pub use report::{neighborhood_stats, summarize, NeighborhoodStats, Summary};
